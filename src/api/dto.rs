// ABOUTME: Wire records for the control-plane JSON API, converted into the workload model.
// ABOUTME: Kept separate from `model` so a field rename on the wire doesn't ripple into the Engine.

use serde::{Deserialize, Serialize};

use crate::model::{
    Capacity, Component, DeploymentStatus, EnvVar, HubComponent, HubServer, InputParam, Instance,
    InstanceCommon, Port, RestartPolicy, Server,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentRecord {
    pub id: String,
    pub name: String,
    pub deployment_active: bool,
    #[serde(default)]
    pub deployment_status: DeploymentStatus,
    pub deployment_capacity: Capacity,
    pub deployment_log_level: String,
    pub deployment_restart_policy: Option<RestartPolicy>,
    pub compute_node: String,
    #[serde(default)]
    pub input: Vec<InputParam>,
    pub hub_component: HubComponent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerRecord {
    pub id: String,
    pub name: String,
    pub deployment_active: bool,
    #[serde(default)]
    pub deployment_status: DeploymentStatus,
    pub deployment_capacity: Capacity,
    pub deployment_log_level: String,
    pub deployment_restart_policy: Option<RestartPolicy>,
    pub compute_node: String,
    #[serde(default)]
    pub config: String,
    #[serde(default)]
    pub ports: Vec<Port>,
    #[serde(default)]
    pub env_vars: Vec<EnvVar>,
    pub hub_server: HubServer,
}

impl From<ComponentRecord> for Instance {
    fn from(record: ComponentRecord) -> Self {
        Instance::Component(Component {
            common: InstanceCommon {
                id: record.id,
                name: record.name,
                deployment_active: record.deployment_active,
                deployment_status: record.deployment_status,
                deployment_capacity: record.deployment_capacity,
                deployment_log_level: record.deployment_log_level,
                deployment_restart_policy: record.deployment_restart_policy,
                compute_node: record.compute_node,
            },
            input: record.input,
            hub_component: record.hub_component,
        })
    }
}

impl From<ServerRecord> for Instance {
    fn from(record: ServerRecord) -> Self {
        Instance::Server(Server {
            common: InstanceCommon {
                id: record.id,
                name: record.name,
                deployment_active: record.deployment_active,
                deployment_status: record.deployment_status,
                deployment_capacity: record.deployment_capacity,
                deployment_log_level: record.deployment_log_level,
                deployment_restart_policy: record.deployment_restart_policy,
                compute_node: record.compute_node,
            },
            config: record.config,
            ports: record.ports,
            env_vars: record.env_vars,
            hub_server: record.hub_server,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct UpdateStatusBody {
    pub deployment_status: DeploymentStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateVersionBody<'a> {
    pub agent_version: &'a str,
}

#[derive(Debug, Serialize)]
pub struct UsageBody {
    pub cpu_percent: f32,
    pub memory_percent: f32,
    pub disk_percent: f32,
}

#[derive(Debug, Serialize)]
pub struct LatencyBody {
    pub latency: u64,
}

#[derive(Debug, Deserialize)]
pub struct DownloadUrlResponse {
    pub url: String,
}
