// ABOUTME: Deployment status lifecycle for components and servers.
// ABOUTME: Published to the control plane as the instance moves through RUN/STOP.

use serde::{Deserialize, Serialize};

/// Lifecycle of a single deployment epoch of a component or server.
///
/// `StartRequested` and `StopRequested` are set by the control plane before
/// the agent observes `deployment_active`; the agent only ever publishes the
/// states reachable from its own actions (`Pending`, `Running`, `Succeeded`,
/// `Failed`, `Stopped`). `Unknown` is an absorbing fallback for statuses the
/// agent does not recognize, never produced locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    StartRequested,
    Pending,
    Running,
    Succeeded,
    Failed,
    StopRequested,
    Stopped,
    Unknown,
}

impl DeploymentStatus {
    /// Terminal states close out a deployment epoch; a RUN re-enters `Pending`.
    pub fn is_terminal(self) -> bool {
        matches!(self, DeploymentStatus::Stopped | DeploymentStatus::Succeeded)
    }
}

impl Default for DeploymentStatus {
    fn default() -> Self {
        DeploymentStatus::Unknown
    }
}

impl std::fmt::Display for DeploymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            DeploymentStatus::StartRequested => "start_requested",
            DeploymentStatus::Pending => "pending",
            DeploymentStatus::Running => "running",
            DeploymentStatus::Succeeded => "succeeded",
            DeploymentStatus::Failed => "failed",
            DeploymentStatus::StopRequested => "stop_requested",
            DeploymentStatus::Stopped => "stopped",
            DeploymentStatus::Unknown => "unknown",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_stopped_and_succeeded_are_terminal() {
        assert!(DeploymentStatus::Stopped.is_terminal());
        assert!(DeploymentStatus::Succeeded.is_terminal());
        assert!(!DeploymentStatus::Running.is_terminal());
        assert!(!DeploymentStatus::Failed.is_terminal());
    }
}
