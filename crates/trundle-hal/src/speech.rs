//! Generic `Announcer` trait over the speech pipeline.

use async_trait::async_trait;

/// Text-to-speech announcements ("I found the bottle", "now available").
///
/// Best-effort by contract: the core calls it at fixed points but never
/// depends on its success, so there is no error path.  Implementations log
/// their own failures.
#[async_trait]
pub trait Announcer: Send + Sync {
    /// Speak `text`.  Returns once playback has been handed off.
    async fn say(&self, text: &str);
}
