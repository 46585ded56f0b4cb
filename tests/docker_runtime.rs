// ABOUTME: Integration test against a live local container runtime.
// ABOUTME: Gated behind #[ignore] - requires a Docker or Podman socket on the host running the suite.

use std::collections::HashMap;
use std::time::Duration;

use compute_agent::runtime::{
    detect_local, BollardRuntime, ContainerConfig, ContainerFilters, ContainerOps, ContainerState,
    ImageOps, NetworkConfig, NetworkOps, RestartPolicyConfig,
};
use compute_agent::types::ImageRef;

/// Exercises create/start/stop/remove against whatever runtime the host
/// exposes. Run explicitly with `cargo test --test docker_runtime -- --ignored`
/// on a machine with a Docker or Podman socket available.
#[tokio::test]
#[ignore = "requires a live Docker or Podman socket"]
async fn round_trips_a_container_through_the_real_runtime() {
    let info = detect_local().expect("a container runtime must be available on this host");
    let runtime = BollardRuntime::connect(&info).expect("connect to the detected runtime");

    let network_name = "compute-agent-test-net";
    if !runtime.network_exists(network_name).await.unwrap() {
        runtime
            .create_network(&NetworkConfig {
                name: network_name.to_string(),
                driver: Some("bridge".to_string()),
                labels: HashMap::new(),
            })
            .await
            .unwrap();
    }

    let image = ImageRef::parse("alpine:latest").unwrap();
    runtime.pull_image(&image, None).await.unwrap();

    let mut labels = HashMap::new();
    labels.insert("AgentID".to_string(), "integration-test".to_string());
    labels.insert("ComponentID".to_string(), "docker-runtime-test".to_string());

    let config = ContainerConfig {
        name: "compute-agent-docker-runtime-test".to_string(),
        image,
        env: HashMap::new(),
        labels,
        ports: Vec::new(),
        volumes: Vec::new(),
        command: Some(vec!["sleep".to_string(), "30".to_string()]),
        entrypoint: None,
        working_dir: None,
        user: None,
        restart_policy: RestartPolicyConfig::No,
        resources: None,
        healthcheck: None,
        log_config: None,
        stop_timeout: Some(Duration::from_secs(5)),
        network: Some(network_name.to_string()),
        network_aliases: Vec::new(),
    };

    let id = runtime.create_container(&config).await.unwrap();
    runtime.start_container(&id).await.unwrap();

    let info = runtime.inspect_container(&id).await.unwrap();
    assert_eq!(info.state, ContainerState::Running);

    runtime.stop_container(&id, Duration::from_secs(5)).await.unwrap();
    runtime.remove_container(&id, true).await.unwrap();

    let mut label_filter = HashMap::new();
    label_filter.insert("ComponentID".to_string(), "docker-runtime-test".to_string());
    let remaining = runtime
        .list_containers(&ContainerFilters {
            labels: label_filter,
            name: None,
            all: true,
        })
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
