// ABOUTME: Top-level startup error - configuration loading and initial client construction only.
// ABOUTME: Never threaded through the long-lived activities; they log and continue by construction.

use thiserror::Error;

use crate::config::ConfigError;
use crate::engine::EngineError;
use crate::runtime::{DetectionError, RuntimeInfoError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("runtime detection failed: {0}")]
    RuntimeDetection(#[from] DetectionError),

    #[error("runtime connection failed: {0}")]
    RuntimeConnect(#[from] RuntimeInfoError),

    #[error("engine startup failed: {0}")]
    Engine(#[from] EngineError),
}

pub type Result<T> = std::result::Result<T, Error>;
