//! Hardware seams of the binary
//!
//! The session core consumes traits; this module holds the process-level
//! implementations. On the device image these are replaced by the GPIO
//! button reader, the LCD framebuffer renderer and the platform media
//! backend. The placeholders here keep the session fully drivable over the
//! remote surface on any machine.

use pmpcatalog::StreamLocator;
use pmpsession::{Button, EngineError, InputSource, PlaybackEngine, View, ViewSnapshot};
use std::time::Instant;
use tracing::{debug, info};

/// Input source with no buttons attached
///
/// Off-device runs are driven entirely through the REST surface.
pub struct NoInput;

impl InputSource for NoInput {
    fn is_pressed(&self, _button: Button) -> bool {
        false
    }
}

/// Stand-in for the platform media backend
///
/// Honors the engine contract observably: the stream "plays" from the
/// moment it is loaded and the position advances with wall-clock time, so
/// the session's progress display and autosave behave. No audio leaves
/// the process.
pub struct SilentEngine {
    started_at: Option<Instant>,
    paused_at_ms: u64,
    playing: bool,
}

impl SilentEngine {
    pub fn new() -> Self {
        Self {
            started_at: None,
            paused_at_ms: 0,
            playing: false,
        }
    }
}

impl PlaybackEngine for SilentEngine {
    fn load(&mut self, locator: &StreamLocator) -> Result<(), EngineError> {
        info!(%locator, "SilentEngine: loading stream");
        self.started_at = Some(Instant::now());
        self.paused_at_ms = 0;
        self.playing = true;
        Ok(())
    }

    fn play(&mut self) {
        if !self.playing {
            self.started_at = Some(Instant::now());
            self.playing = true;
        }
    }

    fn pause(&mut self) {
        if self.playing {
            self.paused_at_ms = self.position_ms();
            self.playing = false;
        }
    }

    fn position_ms(&self) -> u64 {
        match (&self.started_at, self.playing) {
            (Some(started), true) => self.paused_at_ms + started.elapsed().as_millis() as u64,
            _ => self.paused_at_ms,
        }
    }

    fn set_position_ms(&mut self, position: u64) {
        self.paused_at_ms = position;
        if self.playing {
            self.started_at = Some(Instant::now());
        }
    }

    fn duration_ms(&self) -> u64 {
        0
    }

    fn is_playing(&self) -> bool {
        self.playing
    }
}

/// Renderer that narrates view changes into the log
///
/// The LCD driver consumes the same [`ViewSnapshot`]; this keeps headless
/// runs observable.
pub struct LogSurface {
    last_view: Option<View>,
}

impl LogSurface {
    pub fn new() -> Self {
        Self { last_view: None }
    }

    pub fn render(&mut self, snapshot: &ViewSnapshot) {
        if self.last_view != Some(snapshot.view) {
            self.last_view = Some(snapshot.view);
            debug!(view = ?snapshot.view, rows = snapshot.rows.len(), "View changed");
            if let Some(now_playing) = &snapshot.now_playing {
                info!(track = %now_playing.name, "Now playing");
            }
        }
    }
}
