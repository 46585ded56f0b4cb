// ABOUTME: Engine error type - wraps runtime and download failures with a stable kind() accessor.
// ABOUTME: The Dispatcher logs on this kind without matching the private variants.

use crate::runtime::{ContainerError, EventsError, ImageError, NetworkError};
use snafu::Snafu;

/// Category of engine failure, for the Dispatcher to log without inspecting
/// private variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineErrorKind {
    Download,
    ImageLoad,
    ContainerExecution,
    Network,
    InvalidAction,
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum EngineError {
    #[snafu(display("failed to download image tarball: {message}"))]
    Download { message: String },

    #[snafu(display("failed to load image: {source}"))]
    ImageLoad { source: ImageError },

    #[snafu(display("container execution failed: {source}"))]
    ContainerExecution { source: ContainerError },

    #[snafu(display("network operation failed: {source}"))]
    Network { source: NetworkError },

    #[snafu(display("event stream error: {source}"))]
    Events { source: EventsError },

    #[snafu(display("unknown action: {action}"))]
    InvalidAction { action: String },
}

impl EngineError {
    pub fn kind(&self) -> EngineErrorKind {
        match self {
            EngineError::Download { .. } => EngineErrorKind::Download,
            EngineError::ImageLoad { .. } => EngineErrorKind::ImageLoad,
            EngineError::ContainerExecution { .. } => EngineErrorKind::ContainerExecution,
            EngineError::Network { .. } | EngineError::Events { .. } => EngineErrorKind::Network,
            EngineError::InvalidAction { .. } => EngineErrorKind::InvalidAction,
        }
    }
}

impl From<ContainerError> for EngineError {
    fn from(source: ContainerError) -> Self {
        EngineError::ContainerExecution { source }
    }
}

impl From<ImageError> for EngineError {
    fn from(source: ImageError) -> Self {
        EngineError::ImageLoad { source }
    }
}

impl From<NetworkError> for EngineError {
    fn from(source: NetworkError) -> Self {
        EngineError::Network { source }
    }
}

impl From<EventsError> for EngineError {
    fn from(source: EventsError) -> Self {
        EngineError::Events { source }
    }
}
