//! Generic `Vision` trait over the camera + object-detection pipeline.
//!
//! The behavior loops never see frames or model weights; they consume the
//! two distilled signals the detector produces: a per-frame list of
//! [`ObjectObservation`]s, and a bearing/area pair for one tracked target.

use async_trait::async_trait;
use trundle_types::{Bearing, ObjectObservation, TrundleError};

/// The camera-and-detector collaborator.
#[async_trait]
pub trait Vision: Send + Sync {
    /// Run detection on the next frame and return everything seen.
    ///
    /// An empty list is a normal result, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`TrundleError::HardwareFault`] when the camera or the
    /// inference backend is unavailable.
    async fn detect(&self) -> Result<Vec<ObjectObservation>, TrundleError>;

    /// Locate `target` in the next frame.
    ///
    /// Returns the target's [`Bearing`] and a bounding-box-area proximity
    /// proxy (larger = closer), or `None` when the target is not visible.
    async fn track(&self, target: &str) -> Result<Option<(Bearing, f32)>, TrundleError>;
}
