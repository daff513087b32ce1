//! Commands and menu entries
//!
//! Everything the controller can be asked to do is one of these variants,
//! whether the request came from a hardware button or the remote surface.
//! Dispatch is by exhaustive match; there is no string-based routing.

use pmpcatalog::Source;
use serde::{Deserialize, Serialize};

/// One entry of the top-level source menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuEntry {
    Jellyfin,
    JellyfinShuffle,
    Audiobookshelf,
    LocalFiles,
    LocalShuffle,
    BluetoothPair,
}

impl MenuEntry {
    /// Label drawn on the menu screen
    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Jellyfin => "Jellyfin",
            MenuEntry::JellyfinShuffle => "Jellyfin Shuffle",
            MenuEntry::Audiobookshelf => "Audiobookshelf",
            MenuEntry::LocalFiles => "Local Files",
            MenuEntry::LocalShuffle => "Local Shuffle",
            MenuEntry::BluetoothPair => "Bluetooth Pair",
        }
    }

    /// The catalog source behind a content entry, `None` for Bluetooth
    pub fn source(&self) -> Option<Source> {
        match self {
            MenuEntry::Jellyfin | MenuEntry::JellyfinShuffle => Some(Source::Jellyfin),
            MenuEntry::Audiobookshelf => Some(Source::Bookshelf),
            MenuEntry::LocalFiles | MenuEntry::LocalShuffle => Some(Source::Local),
            MenuEntry::BluetoothPair => None,
        }
    }

    /// Whether selecting this entry shuffles and starts playback directly
    pub fn autoplay(&self) -> bool {
        matches!(self, MenuEntry::JellyfinShuffle | MenuEntry::LocalShuffle)
    }
}

/// One request into the session controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Move the cursor up within the visible list (clamped)
    ScrollUp,
    /// Move the cursor down within the visible list (clamped)
    ScrollDown,
    /// Jump to the next item starting with a different letter
    JumpLetterForward,
    /// Jump back to the first item of the previous letter run
    JumpLetterBack,
    /// Activate the item under the cursor (or toggle pause while playing)
    Select,
    /// Leave the current view for the menu, flushing the bookmark first
    Back,
    /// Nudge playback backward by the configured delta
    SeekBack,
    /// Nudge playback forward by the configured delta
    SeekForward,
    /// Advance to the next track (wraps around)
    Next,
    /// Retreat to the previous track (wraps around)
    Previous,
    /// Resume playback
    Play,
    /// Pause playback and flush the bookmark
    Pause,
    /// Activate a menu entry directly (remote surface)
    SelectMenuEntry(MenuEntry),
    /// Play a playlist item by index (remote surface)
    PlayItem(usize),
    /// Run a Bluetooth discovery scan
    ScanBluetooth,
    /// Connect a discovered device by index
    ConnectDevice(usize),
}
