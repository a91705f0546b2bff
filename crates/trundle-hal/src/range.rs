//! Generic `RangeArray` trait for the four-sensor ultrasonic ring.

use async_trait::async_trait;
use trundle_types::{DistanceSample, TrundleError};

/// The fixed ultrasonic sensor ring (front, left, right, back).
///
/// A poll may take tens of milliseconds while echoes return.  Drivers retry
/// a bounded number of times internally; a sensor that still produces no
/// valid echo reports [`NO_ECHO`][trundle_types::NO_ECHO] for its field
/// rather than failing the whole sample.
#[async_trait]
pub trait RangeArray: Send + Sync {
    /// Fire all four sensors and collect one fresh [`DistanceSample`].
    ///
    /// # Errors
    ///
    /// Returns [`TrundleError::HardwareFault`] only when the sensor bus
    /// itself is unusable.  Per-sensor timeouts are not errors.
    async fn read_distances(&self) -> Result<DistanceSample, TrundleError>;
}
