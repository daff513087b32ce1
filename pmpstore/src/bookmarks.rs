//! Bookmark persistence: `name → position (ms)`
//!
//! Bookmarks are keyed by the item's display name, not by `(source, id)`.
//! Two items sharing a name therefore share one bookmark; this matches the
//! on-disk format the player has always used and is accepted as a known
//! limitation.

use crate::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Map from item name to last-known playback position in milliseconds
pub type Bookmarks = HashMap<String, u64>;

/// Whole-file JSON store for playback positions
///
/// The store itself is stateless: callers own the in-memory [`Bookmarks`]
/// map and hand it back on every save, which rewrites the entire file.
#[derive(Debug, Clone)]
pub struct BookmarkStore {
    path: PathBuf,
}

impl BookmarkStore {
    /// Creates a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the bookmark map
    ///
    /// A missing or corrupt file yields an empty map, never an error.
    pub fn load(&self) -> Bookmarks {
        match fs::read(&self.path) {
            Ok(data) => match serde_json::from_slice(&data) {
                Ok(map) => map,
                Err(e) => {
                    warn!(file = %self.path.display(), error = %e, "Corrupt bookmark file, starting empty");
                    Bookmarks::new()
                }
            },
            Err(_) => Bookmarks::new(),
        }
    }

    /// Records a position and persists the whole map
    ///
    /// A position of zero is a no-op: the map and the file are left
    /// untouched, so an item that never actually played does not overwrite
    /// an earlier resume point.
    pub fn save(&self, bookmarks: &mut Bookmarks, name: &str, position_ms: u64) -> Result<()> {
        if position_ms == 0 {
            return Ok(());
        }
        bookmarks.insert(name.to_string(), position_ms);
        self.persist(bookmarks)?;
        debug!(name, position_ms, "Bookmark saved");
        Ok(())
    }

    /// Looks up the stored position for an item name
    pub fn get(bookmarks: &Bookmarks, name: &str) -> Option<u64> {
        bookmarks.get(name).copied()
    }

    fn persist(&self, bookmarks: &Bookmarks) -> Result<()> {
        let json = serde_json::to_vec(bookmarks)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}
