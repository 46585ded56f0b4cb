// ABOUTME: Component and server workload records - the agent's desired-state vocabulary.
// ABOUTME: Every instance is hashable via `to_hash`, the sole ground truth for "already deployed".

use serde::{Deserialize, Serialize};

use super::hash::state_hash;
use super::hub::HubArtifact;
use super::status::DeploymentStatus;

/// Capacity tier, translated by the engine into a fixed memory limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    Small,
    Medium,
    Large,
    VeryLarge,
}

/// Restart policy as stored by the control plane; translated by the engine
/// into the runtime's restart-policy vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    Always,
    OnFailure,
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputParam {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortProtocol {
    Tcp,
    Udp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub protocol: PortProtocol,
    pub internal_port: u16,
    pub exposed_port: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Fields shared by every instance, independent of kind.
#[derive(Debug, Clone)]
pub struct InstanceCommon {
    pub id: String,
    pub name: String,
    pub deployment_active: bool,
    pub deployment_status: DeploymentStatus,
    pub deployment_capacity: Capacity,
    pub deployment_log_level: String,
    pub deployment_restart_policy: Option<RestartPolicy>,
    pub compute_node: String,
}

#[derive(Debug, Clone)]
pub struct Component {
    pub common: InstanceCommon,
    pub input: Vec<InputParam>,
    pub hub_component: HubComponent,
}

#[derive(Debug, Clone)]
pub struct Server {
    pub common: InstanceCommon,
    pub config: String,
    pub ports: Vec<Port>,
    pub env_vars: Vec<EnvVar>,
    pub hub_server: HubServer,
}

pub use super::hub::{HubComponent, HubServer};

/// A workload assigned to this node: either a Component or a Server.
#[derive(Debug, Clone)]
pub enum Instance {
    Component(Component),
    Server(Server),
}

/// Fields that go into the state hash, keyed by declaration order so the
/// digest is stable regardless of how the caller built up the collections.
#[derive(Serialize)]
struct HashableCommon<'a> {
    capacity: Capacity,
    log_level: &'a str,
    restart_policy: Option<RestartPolicy>,
}

#[derive(Serialize)]
struct HashableComponent<'a> {
    common: HashableCommon<'a>,
    input: &'a [InputParam],
}

#[derive(Serialize)]
struct HashableServer<'a> {
    common: HashableCommon<'a>,
    config: &'a str,
    ports: &'a [Port],
    env_vars: &'a [EnvVar],
}

impl Instance {
    pub fn common(&self) -> &InstanceCommon {
        match self {
            Instance::Component(c) => &c.common,
            Instance::Server(s) => &s.common,
        }
    }

    pub fn id(&self) -> &str {
        &self.common().id
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Instance::Component(_) => "component",
            Instance::Server(_) => "server",
        }
    }

    pub fn hub_artifact(&self) -> HubArtifact {
        match self {
            Instance::Component(c) => HubArtifact::Component(c.hub_component.clone()),
            Instance::Server(s) => HubArtifact::Server(s.hub_server.clone()),
        }
    }

    /// Canonical state hash over the fields that matter for deployment
    /// equivalence - see `HashableComponent`/`HashableServer`.
    pub fn to_hash(&self) -> String {
        let common = HashableCommon {
            capacity: self.common().deployment_capacity,
            log_level: &self.common().deployment_log_level,
            restart_policy: self.common().deployment_restart_policy,
        };
        match self {
            Instance::Component(c) => state_hash(&HashableComponent {
                common,
                input: &c.input,
            }),
            Instance::Server(s) => state_hash(&HashableServer {
                common,
                config: &s.config,
                ports: &s.ports,
                env_vars: &s.env_vars,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_component(input: Vec<InputParam>) -> Instance {
        Instance::Component(Component {
            common: InstanceCommon {
                id: "c1".to_string(),
                name: "c1".to_string(),
                deployment_active: true,
                deployment_status: DeploymentStatus::Pending,
                deployment_capacity: Capacity::Small,
                deployment_log_level: "info".to_string(),
                deployment_restart_policy: Some(RestartPolicy::Always),
                compute_node: "node-1".to_string(),
            },
            input,
            hub_component: HubComponent {
                id: "hc1".to_string(),
                name: "demo".to_string(),
                version: "1.0.0".to_string(),
                runner_cli_version: Some("4.0.0".to_string()),
            },
        })
    }

    #[test]
    fn hash_stable_for_equal_input() {
        let a = sample_component(vec![InputParam {
            key: "k".to_string(),
            value: "v".to_string(),
        }]);
        let b = sample_component(vec![InputParam {
            key: "k".to_string(),
            value: "v".to_string(),
        }]);
        assert_eq!(a.to_hash(), b.to_hash());
    }

    #[test]
    fn hash_changes_with_capacity() {
        let a = sample_component(vec![]);
        let mut b = sample_component(vec![]);
        if let Instance::Component(ref mut c) = b {
            c.common.deployment_capacity = Capacity::Large;
        }
        assert_ne!(a.to_hash(), b.to_hash());
    }
}
