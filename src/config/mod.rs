// ABOUTME: Layered agent configuration - environment variables, overridden by a YAML file.
// ABOUTME: Built once at startup and wrapped in an Arc; no global/static config anywhere else.

mod duration;
mod error;

pub use error::ConfigError;

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn default_poll_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_ping_interval() -> Duration {
    Duration::from_secs(30)
}

fn default_cpu_percent_samples() -> usize {
    4
}

/// Agent configuration. Loaded once in `main` via [`Config::load`] and passed
/// to every component constructor as an `Arc<Config>` - there is no
/// module-level singleton.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "splight_access_id")]
    pub access_id: String,

    #[serde(rename = "splight_secret_key")]
    pub secret_key: String,

    #[serde(rename = "splight_platform_api_host")]
    pub platform_api_host: String,

    /// Node identity. Absence is the one fatal configuration error.
    #[serde(rename = "compute_node_id")]
    pub compute_node_id: String,

    #[serde(rename = "workspace_name", default)]
    pub workspace_name: Option<String>,

    #[serde(rename = "ecr_repository", default)]
    pub ecr_repository: Option<String>,

    #[serde(rename = "namespace", default)]
    pub namespace: Option<String>,

    #[serde(
        rename = "api_poll_interval",
        default = "default_poll_interval",
        deserialize_with = "duration::deserialize"
    )]
    pub poll_interval: Duration,

    #[serde(
        rename = "api_ping_interval",
        default = "default_ping_interval",
        deserialize_with = "duration::deserialize"
    )]
    pub ping_interval: Duration,

    #[serde(rename = "report_usage", default)]
    pub report_usage: bool,

    #[serde(rename = "cpu_percent_samples", default = "default_cpu_percent_samples")]
    pub cpu_percent_samples: usize,
}

impl Config {
    /// Path to the YAML override file: `$HOME/.splight/agent_config`.
    pub fn yaml_override_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".splight").join("agent_config"))
    }

    /// Load configuration from the environment, overridden by the YAML file
    /// at [`Config::yaml_override_path`] when it exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::yaml_override_path().as_deref())
    }

    /// Load with an explicit override path, for tests.
    pub fn load_from(yaml_path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder().add_source(config::Environment::default());

        if let Some(path) = yaml_path
            && path.exists()
        {
            builder = builder.add_source(
                config::File::from(path.to_path_buf()).format(config::FileFormat::Yaml),
            );
        }

        let raw = builder.build()?;
        let config: Config = raw.try_deserialize()?;

        if config.compute_node_id.trim().is_empty() {
            return Err(ConfigError::Missing(
                "COMPUTE_NODE_ID is required and was empty".to_string(),
            ));
        }

        Ok(config)
    }

    /// Wrap in the `Arc` every component constructor expects.
    pub fn into_shared(self) -> Arc<Config> {
        Arc::new(self)
    }

    /// The node's display name. The control plane does not hand out a
    /// separate node name, so the agent uses its id for both.
    pub fn compute_node_name(&self) -> &str {
        &self.compute_node_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn load_fails_without_node_id() {
        temp_env::with_vars_unset(["COMPUTE_NODE_ID"], || {
            temp_env::with_vars(
                [
                    ("SPLIGHT_ACCESS_ID", Some("a")),
                    ("SPLIGHT_SECRET_KEY", Some("b")),
                    ("SPLIGHT_PLATFORM_API_HOST", Some("https://example.com")),
                ],
                || {
                    let result = Config::load_from(None);
                    assert!(result.is_err());
                },
            );
        });
    }

    #[test]
    fn yaml_layer_overrides_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "compute_node_id: from-yaml").unwrap();

        temp_env::with_vars(
            [
                ("SPLIGHT_ACCESS_ID", Some("a")),
                ("SPLIGHT_SECRET_KEY", Some("b")),
                ("SPLIGHT_PLATFORM_API_HOST", Some("https://example.com")),
                ("COMPUTE_NODE_ID", Some("from-env")),
            ],
            || {
                let config = Config::load_from(Some(file.path())).unwrap();
                assert_eq!(config.compute_node_id, "from-yaml");
            },
        );
    }

    #[test]
    fn duration_accepts_plain_seconds_from_environment() {
        temp_env::with_vars(
            [
                ("SPLIGHT_ACCESS_ID", Some("a")),
                ("SPLIGHT_SECRET_KEY", Some("b")),
                ("SPLIGHT_PLATFORM_API_HOST", Some("https://example.com")),
                ("COMPUTE_NODE_ID", Some("node-1")),
                ("API_POLL_INTERVAL", Some("15")),
            ],
            || {
                let config = Config::load_from(None).unwrap();
                assert_eq!(config.poll_interval, Duration::from_secs(15));
            },
        );
    }
}
