// ABOUTME: The Engine - RUN/STOP/RESTART against the container runtime, keyed by labels not memory.
// ABOUTME: There is no in-memory workload registry; the running containers' labels are the record.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use crate::api::ApiClient;
use crate::config::Config;
use crate::model::{DeploymentStatus, HubArtifact, Instance, PortProtocol};
use crate::runtime::{
    ComputeRuntime, ContainerConfig, ContainerFilters, NetworkConfig, PortMapping, Protocol,
    ResourceLimits,
};
use crate::types::NetworkId;

use super::capacity;
use super::error::EngineError;
use super::labels::{self, LabeledInstanceRef};

const COMPONENT_IMAGE_DIR: &str = "/images";
const SERVER_IMAGE_DIR: &str = "/images/servers";
const STOP_TIMEOUT: Duration = Duration::from_secs(30);

/// Action a desired/observed diff resolves to for a single instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Run,
    Stop,
    Restart,
}

/// Executes RUN/STOP/RESTART against a [`ComputeRuntime`], using container
/// labels as the only source of truth for what is currently deployed.
pub struct Engine<R: ComputeRuntime> {
    runtime: Arc<R>,
    api: ApiClient,
    config: Arc<Config>,
}

impl<R: ComputeRuntime> Engine<R> {
    /// Construct the engine and perform startup reconciliation: ensure the
    /// node's bridge network exists, and connect any pre-existing containers
    /// that carry this node's labels but aren't on it yet. This makes
    /// restart-after-crash correct without a persisted registry.
    pub async fn new(
        runtime: Arc<R>,
        api: ApiClient,
        config: Arc<Config>,
    ) -> Result<Self, EngineError> {
        let engine = Self {
            runtime,
            api,
            config,
        };
        engine.reconcile_network().await?;
        Ok(engine)
    }

    fn network_name(&self) -> String {
        self.config.compute_node_id.clone()
    }

    async fn reconcile_network(&self) -> Result<(), EngineError> {
        let name = self.network_name();
        if !self.runtime.network_exists(&name).await? {
            self.runtime
                .create_network(&NetworkConfig {
                    name: name.clone(),
                    driver: Some("bridge".to_string()),
                    labels: HashMap::new(),
                })
                .await?;
        }
        let network_id = NetworkId::new(name.clone());

        let mut label_filter = HashMap::new();
        label_filter.insert(labels::AGENT_ID.to_string(), self.config.compute_node_id.clone());
        let containers = self
            .runtime
            .list_containers(&ContainerFilters {
                labels: label_filter,
                name: None,
                all: true,
            })
            .await?;

        for container in containers {
            let info = self.runtime.inspect_container(&container.id).await?;
            if !info.network_settings.networks.contains_key(&name) {
                self.runtime
                    .connect_to_network(&container.id, &network_id, &[])
                    .await?;
            }
        }
        Ok(())
    }

    /// Dispatch a resolved action to the matching operation. `Action` is a
    /// closed enum, so every value here is well-formed by construction;
    /// `EngineError::InvalidAction` exists for a future action vocabulary
    /// that isn't exhaustively known at compile time.
    pub async fn handle_action(&self, action: Action, instance: &Instance) -> Result<(), EngineError> {
        match action {
            Action::Run => self.run(instance).await,
            Action::Stop => self.stop(instance).await,
            Action::Restart => self.restart(instance).await,
        }
    }

    /// Bring an instance up: download its image, load it into the runtime,
    /// and run it. Download/load failures mark the instance `Failed` and
    /// return `Ok(())` - they are expected, recoverable-next-tick outcomes,
    /// not engine bugs. A `run_container` failure propagates as a
    /// `ContainerExecutionError`.
    pub async fn run(&self, instance: &Instance) -> Result<(), EngineError> {
        self.publish_status(instance, DeploymentStatus::Pending).await;

        let artifact = instance.hub_artifact();
        let tarball_path = Self::stage_path(&artifact);

        if let Err(e) = self.download(&artifact, &tarball_path).await {
            tracing::warn!(instance = instance.id(), error = %e, "image download failed");
            self.publish_status(instance, DeploymentStatus::Failed).await;
            return Ok(());
        }

        let image = match self.runtime.load_image(&tarball_path).await {
            Ok(image) => image,
            Err(e) => {
                tracing::warn!(instance = instance.id(), error = %e, "image load failed");
                self.publish_status(instance, DeploymentStatus::Failed).await;
                return Ok(());
            }
        };

        let legacy = artifact.is_legacy_runner();
        let state_hash = instance.to_hash();
        let container_labels =
            labels::build_labels(&self.config.compute_node_id, instance, &state_hash, legacy);

        let config = ContainerConfig {
            name: instance.id().to_string(),
            image,
            env: self.build_env(instance),
            labels: container_labels,
            ports: Self::build_ports(instance),
            volumes: Vec::new(),
            command: Self::build_command(instance, legacy),
            entrypoint: None,
            working_dir: None,
            user: None,
            restart_policy: capacity::restart_policy_config(
                instance.common().deployment_restart_policy,
            ),
            resources: Some(ResourceLimits {
                memory: Some(capacity::memory_limit_bytes(instance.common().deployment_capacity)),
                cpus: None,
            }),
            healthcheck: Some(capacity::healthcheck_config()),
            log_config: Some(capacity::log_config()),
            stop_timeout: Some(STOP_TIMEOUT),
            network: Some(self.network_name()),
            network_aliases: Vec::new(),
        };

        let container_id = self.runtime.create_container(&config).await?;
        self.runtime.start_container(&container_id).await?;
        Ok(())
    }

    /// Find every container matching `(AgentID, InstanceID)`, stop and
    /// remove each, then publish `Stopped`. A no-op if nothing matches.
    pub async fn stop(&self, instance: &Instance) -> Result<(), EngineError> {
        let filters = ContainerFilters {
            labels: labels::instance_label_filters(&self.config.compute_node_id, instance),
            name: None,
            all: true,
        };
        let containers = self.runtime.list_containers(&filters).await?;
        if containers.is_empty() {
            return Ok(());
        }

        for container in &containers {
            self.runtime.stop_container(&container.id, STOP_TIMEOUT).await?;
            self.runtime.remove_container(&container.id, true).await?;
        }

        self.publish_status(instance, DeploymentStatus::Stopped).await;
        Ok(())
    }

    pub async fn restart(&self, instance: &Instance) -> Result<(), EngineError> {
        self.stop(instance).await?;
        self.run(instance).await
    }

    /// The `StateHash` label of the (first) matching live container, or
    /// `None` if no container carries this instance's labels.
    pub async fn get_instance_hash(&self, instance: &Instance) -> Result<Option<String>, EngineError> {
        let filters = ContainerFilters {
            labels: labels::instance_label_filters(&self.config.compute_node_id, instance),
            name: None,
            all: true,
        };
        let containers = self.runtime.list_containers(&filters).await?;
        Ok(containers
            .first()
            .and_then(|c| c.labels.get(labels::STATE_HASH).cloned()))
    }

    /// Enumerate every container with `AgentID=<node id>`, stop and remove
    /// each, and return the instances that were successfully stopped.
    /// Per-container failures are logged and skipped; a drain never aborts
    /// partway through.
    pub async fn stop_all(&self) -> Result<Vec<LabeledInstanceRef>, EngineError> {
        let mut label_filter = HashMap::new();
        label_filter.insert(labels::AGENT_ID.to_string(), self.config.compute_node_id.clone());
        let containers = self
            .runtime
            .list_containers(&ContainerFilters {
                labels: label_filter,
                name: None,
                all: true,
            })
            .await?;

        let mut stopped = Vec::new();
        for container in containers {
            let Some(instance_ref) = labels::labeled_instance_ref(&container.labels) else {
                continue;
            };
            if let Err(e) = self.runtime.stop_container(&container.id, STOP_TIMEOUT).await {
                tracing::warn!(container = %container.id, error = %e, "failed to stop container during drain");
                continue;
            }
            if let Err(e) = self.runtime.remove_container(&container.id, true).await {
                tracing::warn!(container = %container.id, error = %e, "failed to remove container during drain");
                continue;
            }
            stopped.push(instance_ref);
        }
        Ok(stopped)
    }

    async fn publish_status(&self, instance: &Instance, status: DeploymentStatus) {
        if let Err(e) = self.api.update_status(instance, status).await {
            tracing::warn!(
                instance = instance.id(),
                status = %status,
                error = %e,
                "failed to publish status"
            );
        }
    }

    fn stage_path(artifact: &HubArtifact) -> PathBuf {
        let dir = match artifact {
            HubArtifact::Component(_) => COMPONENT_IMAGE_DIR,
            HubArtifact::Server(_) => SERVER_IMAGE_DIR,
        };
        Path::new(dir).join(artifact.tarball_file_name())
    }

    async fn download(&self, artifact: &HubArtifact, dest: &Path) -> Result<(), EngineError> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EngineError::Download { message: e.to_string() })?;
        }
        let url = self
            .api
            .download_url(artifact)
            .await
            .map_err(|e| EngineError::Download { message: e.to_string() })?;
        self.api
            .download_tarball(&url, dest)
            .await
            .map_err(|e| EngineError::Download { message: e.to_string() })
    }

    /// Node-wide base (credentials, API host, namespace) plus the
    /// per-instance identity variables the runner expects.
    fn build_env(&self, instance: &Instance) -> HashMap<String, String> {
        let mut env = HashMap::new();
        env.insert("SPLIGHT_ACCESS_ID".to_string(), self.config.access_id.clone());
        env.insert("SPLIGHT_SECRET_KEY".to_string(), self.config.secret_key.clone());
        env.insert(
            "SPLIGHT_PLATFORM_API_HOST".to_string(),
            self.config.platform_api_host.clone(),
        );
        if let Some(ref namespace) = self.config.namespace {
            env.insert("NAMESPACE".to_string(), namespace.clone());
        }
        env.insert(
            "LOG_LEVEL".to_string(),
            instance.common().deployment_log_level.clone(),
        );

        match instance {
            Instance::Component(c) => {
                env.insert("PROCESS_TYPE".to_string(), "component".to_string());
                env.insert("COMPONENT_ID".to_string(), c.common.id.clone());
            }
            Instance::Server(s) => {
                env.insert("PROCESS_TYPE".to_string(), "server".to_string());
                env.insert("SPLIGHT_SERVER_ID".to_string(), s.common.id.clone());
                for var in &s.env_vars {
                    env.insert(var.name.clone(), var.value.clone());
                }
            }
        }
        env
    }

    fn build_command(instance: &Instance, legacy: bool) -> Option<Vec<String>> {
        match instance {
            Instance::Component(c) => {
                if legacy {
                    let runspec = serde_json::json!({
                        "id": c.common.id,
                        "input": c.input,
                    });
                    Some(vec![
                        "python".to_string(),
                        "runner.py".to_string(),
                        "-r".to_string(),
                        runspec.to_string(),
                    ])
                } else {
                    Some(vec!["./main.py".to_string(), format!("--component-id={}", c.common.id)])
                }
            }
            Instance::Server(_) => None,
        }
    }

    fn build_ports(instance: &Instance) -> Vec<PortMapping> {
        match instance {
            Instance::Server(s) => s
                .ports
                .iter()
                .map(|p| PortMapping {
                    host_port: Some(p.exposed_port),
                    container_port: p.internal_port,
                    protocol: match p.protocol {
                        PortProtocol::Tcp => Protocol::Tcp,
                        PortProtocol::Udp => Protocol::Udp,
                    },
                    host_ip: None,
                })
                .collect(),
            Instance::Component(_) => Vec::new(),
        }
    }
}
