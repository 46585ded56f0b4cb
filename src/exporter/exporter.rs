// ABOUTME: Runtime event stream consumer - the only activity driven by push events, not a timer.
// ABOUTME: Maintains a local expected-stop set to tell a user-initiated stop apart from a crash.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use crate::api::ApiClient;
use crate::engine::labels::{self, InstanceKind};
use crate::model::DeploymentStatus;
use crate::runtime::{ComputeRuntime, EventAction, EventFilter, EventsError, RuntimeEvent};
use crate::types::ContainerId;

const RESUBSCRIBE_BACKOFF: Duration = Duration::from_secs(1);

/// Consumes the runtime's event feed and turns lifecycle transitions into
/// status publications. Single consumer, so `expected_stops` needs no lock.
pub struct Exporter<R: ComputeRuntime> {
    runtime: Arc<R>,
    api: ApiClient,
    node_id: String,
    expected_stops: HashSet<ContainerId>,
}

impl<R: ComputeRuntime> Exporter<R> {
    pub fn new(runtime: Arc<R>, api: ApiClient, node_id: String) -> Self {
        Self {
            runtime,
            api,
            node_id,
            expected_stops: HashSet::new(),
        }
    }

    /// Run forever. A stream error or unexpected end resubscribes after a
    /// short backoff rather than propagating - this activity must never die.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Err(e) = self.consume().await {
                tracing::warn!(error = %e, "exporter event stream ended, resubscribing");
                tokio::time::sleep(RESUBSCRIBE_BACKOFF).await;
            }
        }
    }

    async fn consume(&mut self) -> Result<(), EventsError> {
        let mut filter_labels = HashMap::new();
        filter_labels.insert(labels::AGENT_ID.to_string(), self.node_id.clone());
        let filter = EventFilter {
            actions: vec![
                EventAction::Create,
                EventAction::Start,
                EventAction::Stop,
                EventAction::Die,
            ],
            labels: filter_labels,
        };

        let mut stream = self.runtime.events(&filter).await?;
        while let Some(event) = stream.next().await {
            match event {
                Ok(event) => self.handle_event(event).await,
                Err(e) => tracing::warn!(error = %e, "malformed runtime event dropped"),
            }
        }
        Ok(())
    }

    /// Turn one runtime event into (at most) one status publication. Public
    /// so the expected-stop de-duplication can be exercised directly against
    /// a hand-fed event rather than a live stream.
    pub async fn handle_event(&mut self, event: RuntimeEvent) {
        let Some(instance_ref) = labels::labeled_instance_ref(&event.labels) else {
            tracing::debug!(container = %event.container_id, "dropping event with no instance label");
            return;
        };

        let status = match event.action {
            EventAction::Create => Some(DeploymentStatus::Pending),
            EventAction::Start => Some(DeploymentStatus::Running),
            EventAction::Stop => {
                self.expected_stops.insert(event.container_id.clone());
                Some(DeploymentStatus::Stopped)
            }
            EventAction::Die => {
                if self.expected_stops.remove(&event.container_id) {
                    // Already published Stopped when the `stop` event landed.
                    None
                } else {
                    match event.exit_code.as_deref() {
                        Some("0") => Some(DeploymentStatus::Succeeded),
                        _ => Some(DeploymentStatus::Failed),
                    }
                }
            }
        };

        let Some(status) = status else { return };

        let publish = match instance_ref.kind {
            InstanceKind::Component => {
                self.api.update_component_status(&instance_ref.id, status).await
            }
            InstanceKind::Server => self.api.update_server_status(&instance_ref.id, status).await,
        };
        if let Err(e) = publish {
            tracing::warn!(
                instance = instance_ref.id,
                status = %status,
                error = %e,
                "failed to publish status from event"
            );
        }
    }
}
