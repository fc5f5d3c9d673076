//! Generation client trait.

use crate::error::Result;
use crate::image::ImagePayload;
use async_trait::async_trait;

/// Trait for headshot generation backends.
///
/// The session controller only talks to this seam, so tests can drive the
/// full upload/generate/regenerate machine without touching the network.
/// Implementations perform exactly one request per call; retries are the
/// user's decision, never the client's.
#[async_trait]
pub trait HeadshotGenerator: Send + Sync {
    /// Sends one source image and one instruction to the model and returns
    /// the extracted result image.
    async fn generate(&self, source: &ImagePayload, instruction: &str) -> Result<ImagePayload>;
}
