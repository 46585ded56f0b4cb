// ABOUTME: Hub-provided artifact metadata (component/server image versions).
// ABOUTME: Resolves a download URL through the control-plane API, not the runtime.

use semver::Version;
use serde::{Deserialize, Serialize};

/// A versioned image published to the hub, referenced by a component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubComponent {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub runner_cli_version: Option<String>,
}

/// A versioned image published to the hub, referenced by a server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HubServer {
    pub id: String,
    pub name: String,
    pub version: String,
}

/// Either variant of hub artifact, used wherever the engine only needs the
/// identity fields to stage a tarball file name (`<name>-<version>`).
#[derive(Debug, Clone)]
pub enum HubArtifact {
    Component(HubComponent),
    Server(HubServer),
}

impl HubArtifact {
    pub fn id(&self) -> &str {
        match self {
            HubArtifact::Component(c) => &c.id,
            HubArtifact::Server(s) => &s.id,
        }
    }

    pub fn tarball_file_name(&self) -> String {
        match self {
            HubArtifact::Component(c) => format!("{}-{}", c.name, c.version),
            HubArtifact::Server(s) => format!("{}-{}", s.name, s.version),
        }
    }

    /// Legacy runner CLIs (pre-4.0.0) take a different component command line.
    pub fn is_legacy_runner(&self) -> bool {
        const CURRENT_RUNNER_CLI_VERSION: Version = Version::new(4, 0, 0);
        match self {
            HubArtifact::Component(c) => c
                .runner_cli_version
                .as_deref()
                .and_then(|v| Version::parse(v).ok())
                .is_some_and(|v| v < CURRENT_RUNNER_CLI_VERSION),
            HubArtifact::Server(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn component_with_runner(version: Option<&str>) -> HubArtifact {
        HubArtifact::Component(HubComponent {
            id: "hc1".to_string(),
            name: "demo".to_string(),
            version: "1.0.0".to_string(),
            runner_cli_version: version.map(str::to_string),
        })
    }

    #[test]
    fn newer_major_version_is_not_legacy() {
        // Lexicographic `&str` ordering would put "10.0.0" before "4.0.0".
        assert!(!component_with_runner(Some("10.0.0")).is_legacy_runner());
    }

    #[test]
    fn older_version_is_legacy() {
        assert!(component_with_runner(Some("3.9.0")).is_legacy_runner());
    }

    #[test]
    fn exact_current_version_is_not_legacy() {
        assert!(!component_with_runner(Some("4.0.0")).is_legacy_runner());
    }

    #[test]
    fn missing_version_is_not_legacy() {
        assert!(!component_with_runner(None).is_legacy_runner());
    }
}
