// ABOUTME: Image operations trait for container runtimes.
// ABOUTME: Pull, load from a local tarball, check existence, and remove container images.

use super::sealed::Sealed;
use super::shared_types::RegistryAuth;
use crate::types::ImageRef;
use async_trait::async_trait;
use std::path::Path;

/// Image operations: pull, load, check existence, remove.
#[async_trait]
pub trait ImageOps: Sealed + Send + Sync {
    /// Pull an image from a registry.
    async fn pull_image(
        &self,
        reference: &ImageRef,
        auth: Option<&RegistryAuth>,
    ) -> Result<(), ImageError>;

    /// Load an image from a local tarball (e.g. `docker save` output) into the
    /// runtime's local image store. Returns the reference embedded in the
    /// tarball's manifest, which takes precedence over any reference the
    /// caller reconstructed from naming conventions.
    async fn load_image(&self, tarball_path: &Path) -> Result<ImageRef, ImageError>;

    /// Check if an image exists locally.
    async fn image_exists(&self, reference: &ImageRef) -> Result<bool, ImageError>;

    /// Remove an image.
    async fn remove_image(&self, reference: &ImageRef, force: bool) -> Result<(), ImageError>;
}

/// Errors from image operations.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("authentication failed for registry: {0}")]
    AuthenticationFailed(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("load failed: {0}")]
    LoadFailed(String),

    #[error("image in use, cannot remove: {0}")]
    InUse(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
