// ABOUTME: Configuration error - the only error kind allowed to be fatal at startup.
// ABOUTME: Everything else in the agent logs and continues; a bad config never gets that far.

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Missing(String),

    #[error("failed to load configuration: {0}")]
    Source(#[from] config::ConfigError),
}
