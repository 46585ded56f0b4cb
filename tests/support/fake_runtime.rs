// ABOUTME: In-memory ComputeRuntime double - container/network maps instead of a live socket.
// ABOUTME: Lets Engine/Dispatcher scenarios run without a Docker or Podman daemon.

use std::collections::HashMap;
use std::path::Path;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use compute_agent::runtime::traits::{NetworkInfo, NetworkSettings, Sealed};
use compute_agent::runtime::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerInfo, ContainerOps,
    ContainerState, ContainerSummary, EventFilter, EventStream, EventsError, ImageError, ImageOps,
    NetworkConfig, NetworkError, NetworkOps, RegistryAuth, RuntimeInfoError, RuntimeInfoTrait,
    RuntimeEvent, RuntimeMetadata,
};
use compute_agent::types::{ContainerId, ImageRef, NetworkAlias, NetworkId};
use futures::Stream;
use parking_lot::Mutex;
use tokio::sync::mpsc;

struct FakeContainer {
    name: String,
    image: String,
    labels: HashMap<String, String>,
    state: ContainerState,
    networks: HashMap<String, NetworkInfo>,
}

/// An in-memory stand-in for [`compute_agent::runtime::ComputeRuntime`].
///
/// Every call is synchronous under a `parking_lot::Mutex`; there is no
/// simulated latency or failure injection beyond what each test arranges
/// directly (e.g. asking for a container that was never created).
pub struct FakeRuntime {
    containers: Mutex<HashMap<ContainerId, FakeContainer>>,
    networks: Mutex<HashMap<String, NetworkId>>,
    next_id: AtomicU64,
    events_rx: Mutex<Option<mpsc::UnboundedReceiver<Result<RuntimeEvent, EventsError>>>>,
    events_tx: mpsc::UnboundedSender<Result<RuntimeEvent, EventsError>>,
}

impl FakeRuntime {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            containers: Mutex::new(HashMap::new()),
            networks: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            events_rx: Mutex::new(Some(rx)),
            events_tx: tx,
        }
    }

    /// Push a synthetic event to whoever has subscribed via `events()`.
    pub fn push_event(&self, event: RuntimeEvent) {
        let _ = self.events_tx.send(Ok(event));
    }

    /// Number of containers currently tracked (any state).
    pub fn container_count(&self) -> usize {
        self.containers.lock().len()
    }

    pub fn labels_of(&self, id: &ContainerId) -> Option<HashMap<String, String>> {
        self.containers.lock().get(id).map(|c| c.labels.clone())
    }

    fn fresh_id(&self) -> ContainerId {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        ContainerId::new(format!("fake-{n}"))
    }
}

impl Default for FakeRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl Sealed for FakeRuntime {}

#[async_trait]
impl ImageOps for FakeRuntime {
    async fn pull_image(
        &self,
        _reference: &ImageRef,
        _auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError> {
        Ok(())
    }

    async fn load_image(&self, tarball_path: &Path) -> Result<ImageRef, ImageError> {
        let stem = tarball_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("fake-image");
        ImageRef::parse(stem).map_err(|e| ImageError::LoadFailed(e.to_string()))
    }

    async fn image_exists(&self, _reference: &ImageRef) -> Result<bool, ImageError> {
        Ok(true)
    }

    async fn remove_image(&self, _reference: &ImageRef, _force: bool) -> Result<(), ImageError> {
        Ok(())
    }
}

#[async_trait]
impl ContainerOps for FakeRuntime {
    async fn create_container(
        &self,
        config: &ContainerConfig,
    ) -> Result<ContainerId, ContainerError> {
        let id = self.fresh_id();
        self.containers.lock().insert(
            id.clone(),
            FakeContainer {
                name: config.name.clone(),
                image: config.image.to_string(),
                labels: config.labels.clone(),
                state: ContainerState::Created,
                networks: HashMap::new(),
            },
        );
        Ok(id)
    }

    async fn start_container(&self, id: &ContainerId) -> Result<(), ContainerError> {
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.state = ContainerState::Running;
        Ok(())
    }

    async fn stop_container(
        &self,
        id: &ContainerId,
        _timeout: std::time::Duration,
    ) -> Result<(), ContainerError> {
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.state = ContainerState::Exited;
        Ok(())
    }

    async fn remove_container(&self, id: &ContainerId, _force: bool) -> Result<(), ContainerError> {
        self.containers
            .lock()
            .remove(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        Ok(())
    }

    async fn inspect_container(&self, id: &ContainerId) -> Result<ContainerInfo, ContainerError> {
        let containers = self.containers.lock();
        let container = containers
            .get(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        Ok(ContainerInfo {
            id: id.clone(),
            name: container.name.clone(),
            image: container.image.clone(),
            state: container.state,
            health: None,
            created: "1970-01-01T00:00:00Z".to_string(),
            labels: container.labels.clone(),
            network_settings: NetworkSettings {
                networks: container.networks.clone(),
            },
        })
    }

    async fn list_containers(
        &self,
        filters: &ContainerFilters,
    ) -> Result<Vec<ContainerSummary>, ContainerError> {
        let containers = self.containers.lock();
        let matches = containers
            .iter()
            .filter(|(_, c)| {
                if !filters.all && c.state != ContainerState::Running {
                    return false;
                }
                if let Some(ref name) = filters.name
                    && !c.name.contains(name.as_str())
                {
                    return false;
                }
                filters
                    .labels
                    .iter()
                    .all(|(k, v)| c.labels.get(k) == Some(v))
            })
            .map(|(id, c)| ContainerSummary {
                id: id.clone(),
                name: c.name.clone(),
                image: c.image.clone(),
                state: format!("{:?}", c.state),
                status: format!("{:?}", c.state),
                labels: c.labels.clone(),
            })
            .collect();
        Ok(matches)
    }

    async fn rename_container(
        &self,
        id: &ContainerId,
        new_name: &str,
    ) -> Result<(), ContainerError> {
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(id)
            .ok_or_else(|| ContainerError::NotFound(id.to_string()))?;
        container.name = new_name.to_string();
        Ok(())
    }
}

#[async_trait]
impl NetworkOps for FakeRuntime {
    async fn create_network(&self, config: &NetworkConfig) -> Result<NetworkId, NetworkError> {
        let id = NetworkId::new(config.name.clone());
        self.networks.lock().insert(config.name.clone(), id.clone());
        Ok(id)
    }

    async fn remove_network(&self, id: &NetworkId) -> Result<(), NetworkError> {
        self.networks.lock().retain(|_, v| v != id);
        Ok(())
    }

    async fn connect_to_network(
        &self,
        container: &ContainerId,
        network: &NetworkId,
        _aliases: &[NetworkAlias],
    ) -> Result<(), NetworkError> {
        let mut containers = self.containers.lock();
        let container = containers
            .get_mut(container)
            .ok_or_else(|| NetworkError::ContainerNotFound(container.to_string()))?;
        container.networks.insert(
            network.as_str().to_string(),
            NetworkInfo {
                network_id: network.to_string(),
                ip_address: "10.0.0.2".to_string(),
                gateway: "10.0.0.1".to_string(),
                aliases: Vec::new(),
            },
        );
        Ok(())
    }

    async fn disconnect_from_network(
        &self,
        container: &ContainerId,
        network: &NetworkId,
    ) -> Result<(), NetworkError> {
        if let Some(c) = self.containers.lock().get_mut(container) {
            c.networks.remove(network.as_str());
        }
        Ok(())
    }

    async fn network_exists(&self, name: &str) -> Result<bool, NetworkError> {
        Ok(self.networks.lock().contains_key(name))
    }
}

#[async_trait]
impl RuntimeInfoTrait for FakeRuntime {
    async fn info(&self) -> Result<RuntimeMetadata, RuntimeInfoError> {
        Ok(RuntimeMetadata {
            name: "fake".to_string(),
            version: "0.0.0".to_string(),
            api_version: "0.0".to_string(),
            os: "linux".to_string(),
            arch: "x86_64".to_string(),
        })
    }

    async fn ping(&self) -> Result<(), RuntimeInfoError> {
        Ok(())
    }
}

#[async_trait]
impl EventStream for FakeRuntime {
    async fn events(
        &self,
        _filter: &EventFilter,
    ) -> Result<Pin<Box<dyn Stream<Item = Result<RuntimeEvent, EventsError>> + Send>>, EventsError>
    {
        let rx = self
            .events_rx
            .lock()
            .take()
            .expect("events() is only subscribed once per FakeRuntime in these tests");
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(Box::pin(stream))
    }
}
