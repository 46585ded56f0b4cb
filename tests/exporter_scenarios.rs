// ABOUTME: Exporter scenario test - S5 from the testable-properties list.
// ABOUTME: A stop event followed by a die for the same container publishes Stopped exactly once.

mod support;

use std::collections::HashMap;
use std::sync::Arc;

use compute_agent::api::ApiClient;
use compute_agent::exporter::Exporter;
use compute_agent::runtime::{EventAction, RuntimeEvent};
use compute_agent::types::ContainerId;

use support::fake_api::FakeApiServer;
use support::fake_runtime::FakeRuntime;

fn labeled_event(action: EventAction, container: &ContainerId, component_id: &str) -> RuntimeEvent {
    let mut labels = HashMap::new();
    labels.insert("AgentID".to_string(), "node-42".to_string());
    labels.insert("ComponentID".to_string(), component_id.to_string());
    RuntimeEvent {
        action,
        container_id: container.clone(),
        labels,
        exit_code: None,
    }
}

/// S5: `stop` then `die` for the same container publishes `Stopped` exactly
/// once; the `die` is suppressed because it was expected.
#[tokio::test]
async fn s5_stop_before_die_suppresses_the_second_publish() {
    let server = FakeApiServer::start().await;
    let api = ApiClient::new(server.base_url.clone(), "id", "key");
    let runtime = Arc::new(FakeRuntime::new());
    let mut exporter = Exporter::new(runtime, api, "node-42".to_string());

    let container = ContainerId::new("c-1".to_string());

    exporter
        .handle_event(labeled_event(EventAction::Stop, &container, "c1"))
        .await;
    exporter
        .handle_event(labeled_event(EventAction::Die, &container, "c1"))
        .await;

    let status_updates: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|(method, path, _)| method == "POST" && path.contains("update-status"))
        .collect();
    assert_eq!(status_updates.len(), 1, "die after stop must not publish a second time");
    assert!(status_updates[0].2.contains("stopped"));
}

/// An unexpected `die` (no prior `stop`) with a non-zero exit code is
/// published as `Failed` - the ordinary crash path, unaffected by the
/// suppression set.
#[tokio::test]
async fn die_without_a_prior_stop_publishes_failed() {
    let server = FakeApiServer::start().await;
    let api = ApiClient::new(server.base_url.clone(), "id", "key");
    let runtime = Arc::new(FakeRuntime::new());
    let mut exporter = Exporter::new(runtime, api, "node-42".to_string());

    let container = ContainerId::new("c-2".to_string());
    let mut event = labeled_event(EventAction::Die, &container, "c2");
    event.exit_code = Some("1".to_string());
    exporter.handle_event(event).await;

    let status_updates: Vec<_> = server
        .requests()
        .into_iter()
        .filter(|(method, path, _)| method == "POST" && path.contains("update-status"))
        .collect();
    assert_eq!(status_updates.len(), 1);
    assert!(status_updates[0].2.contains("failed"));
}

/// An event carrying neither `ComponentID` nor `ServerID` is malformed for
/// this agent's purposes and is dropped without publishing anything.
#[tokio::test]
async fn event_without_an_instance_label_is_dropped() {
    let server = FakeApiServer::start().await;
    let api = ApiClient::new(server.base_url.clone(), "id", "key");
    let runtime = Arc::new(FakeRuntime::new());
    let mut exporter = Exporter::new(runtime, api, "node-42".to_string());

    let container = ContainerId::new("c-3".to_string());
    let mut labels = HashMap::new();
    labels.insert("AgentID".to_string(), "node-42".to_string());
    exporter
        .handle_event(RuntimeEvent {
            action: EventAction::Start,
            container_id: container,
            labels,
            exit_code: None,
        })
        .await;

    assert!(server
        .requests()
        .iter()
        .all(|(_, path, _)| !path.contains("update-status")));
}
