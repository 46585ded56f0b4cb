// ABOUTME: Workload data model shared by the dispatcher, engine, and exporter.
// ABOUTME: Component/Server instances, hub artifacts, deployment status, and the state hash.

mod hash;
mod hub;
mod instance;
mod node;
mod status;

pub use hash::state_hash;
pub use hub::{HubArtifact, HubComponent, HubServer};
pub use instance::{
    Capacity, Component, EnvVar, Instance, InstanceCommon, InputParam, Port, PortProtocol,
    RestartPolicy, Server,
};
pub use node::ComputeNode;
pub use status::DeploymentStatus;
