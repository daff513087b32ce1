//! View model: what a renderer needs to draw one frame
//!
//! The controller draws nothing. [`ViewSnapshot`] is a pure read of its
//! state, sized for the device screen (a five-row window around the
//! cursor), and [`SessionStatus`] is the serializable digest the remote
//! surface reports.

use pmpbluetooth::LinkState;
use serde::Serialize;
use std::time::Instant;

/// Number of list rows visible on the device screen
pub const VISIBLE_ROWS: usize = 5;

/// Top-level mode of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum View {
    Menu,
    Browser,
    BtScan,
    Playing,
}

/// Severity of a transient banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A transient banner shown over the current view
///
/// Replaces the blocking "draw and sleep" messages of older firmware: the
/// notice carries its own deadline and the loop keeps running.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub title: String,
    pub message: String,
    pub(crate) expires_at: Instant,
}

impl Notice {
    pub fn expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// One visible list row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub text: String,
    /// Whether the cursor sits on this row
    pub selected: bool,
    /// Whether a resume bookmark exists for this row's item
    pub bookmarked: bool,
}

/// Now-playing metadata for the playback screen
#[derive(Debug, Clone, PartialEq)]
pub struct NowPlaying {
    pub name: String,
    pub position_ms: u64,
    pub duration_ms: u64,
    /// Position as a fraction of duration, 0.0 while duration is unknown
    pub progress: f32,
    pub paused: bool,
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone)]
pub struct ViewSnapshot {
    pub view: View,
    pub rows: Vec<Row>,
    pub now_playing: Option<NowPlaying>,
    pub notice: Option<Notice>,
    pub link_state: LinkState,
}

/// Serializable digest for the remote-control surface
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub view_state: View,
    pub current_track: Option<String>,
    pub playlist_length: usize,
    pub paused: bool,
    pub link_state: LinkState,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_serializes_like_the_wire_format() {
        assert_eq!(serde_json::to_string(&View::Menu).unwrap(), "\"MENU\"");
        assert_eq!(serde_json::to_string(&View::BtScan).unwrap(), "\"BT_SCAN\"");
    }

    #[test]
    fn test_notice_expiry() {
        let fresh = Notice {
            level: NoticeLevel::Info,
            title: "T".into(),
            message: "M".into(),
            expires_at: Instant::now() + std::time::Duration::from_secs(60),
        };
        assert!(!fresh.expired());
    }
}
