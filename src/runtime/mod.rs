// ABOUTME: Container runtime detection and trait abstractions.
// ABOUTME: Auto-detects available runtime, defines composable capability traits.

mod bollard;
mod detection;
pub mod traits;
mod types;

pub use bollard::BollardRuntime;
pub use detection::{DetectionError, detect_local};
pub use types::{RuntimeInfo, RuntimeType};

// Re-export traits at runtime level for convenience
pub use traits::{
    ContainerConfig, ContainerError, ContainerFilters, ContainerInfo, ContainerOps, ContainerState,
    ContainerSummary, EventAction, EventFilter, EventStream, EventsError, HealthState,
    HealthcheckConfig, ImageError, ImageOps, LogConfig, NetworkConfig, NetworkError, NetworkOps,
    PortMapping, Protocol, RegistryAuth, ResourceLimits, RestartPolicyConfig, RuntimeEvent,
    RuntimeInfo as RuntimeInfoTrait, RuntimeInfoError, RuntimeMetadata, VolumeMount,
};

/// Capability surface the engine and exporter require of a container runtime.
pub trait ComputeRuntime: ImageOps + ContainerOps + NetworkOps + RuntimeInfoTrait + EventStream {}

impl<T> ComputeRuntime for T where T: ImageOps + ContainerOps + NetworkOps + RuntimeInfoTrait + EventStream
{}
