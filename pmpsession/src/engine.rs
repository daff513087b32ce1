//! Playback engine contract
//!
//! Decoding and output live outside this crate; the session only needs one
//! active stream with load/pause/seek/position. The real implementation
//! wraps the platform's media backend, tests use an in-memory fake.

use pmpcatalog::StreamLocator;

/// The engine failed to load or play a locator
#[derive(Debug, thiserror::Error)]
#[error("playback engine error: {0}")]
pub struct EngineError(pub String);

/// A single-stream media decoding/output engine
///
/// Positions and durations are in milliseconds. `load` replaces the active
/// stream and starts playback; a seek issued immediately after `load` is
/// unreliable on the real backend, which is why the controller waits a
/// short settle delay before restoring a bookmark.
pub trait PlaybackEngine: Send {
    /// Loads the stream behind the locator and starts playing it
    fn load(&mut self, locator: &StreamLocator) -> Result<(), EngineError>;

    /// Resumes a paused stream
    fn play(&mut self);

    /// Pauses the active stream
    fn pause(&mut self);

    /// Current position of the active stream
    fn position_ms(&self) -> u64;

    /// Seeks the active stream
    fn set_position_ms(&mut self, position: u64);

    /// Total duration of the active stream, 0 while unknown
    fn duration_ms(&self) -> u64;

    /// Whether the stream is currently advancing
    fn is_playing(&self) -> bool;
}
