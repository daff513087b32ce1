//! Normalized item model shared by all catalog sources

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Which backend produced an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Jellyfin media server
    Jellyfin,
    /// Audiobookshelf
    Bookshelf,
    /// Local files
    Local,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Jellyfin => write!(f, "Jellyfin"),
            Source::Bookshelf => write!(f, "Audiobookshelf"),
            Source::Local => write!(f, "Local"),
        }
    }
}

/// Source-specific fields an adapter needs to resolve an item later
///
/// Only the producing adapter interprets these; everything else treats the
/// hint as opaque baggage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocatorHint {
    /// Parent container id (Audiobookshelf book or podcast)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Internal file handle of a podcast episode's audio file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ino: Option<String>,
    /// Audio format of the file, when the backend reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext: Option<String>,
    /// Filesystem path of a local file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

/// One playable unit, normalized from any source
///
/// Items are immutable once produced by an adapter; the session's playlist
/// owns them exclusively and is replaced wholesale on every load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Display name (also the bookmark key)
    pub name: String,
    /// Opaque identifier, scoped to the producing source
    pub id: String,
    /// Producing backend
    pub source: Source,
    /// Resolution baggage for the producing adapter
    #[serde(default)]
    pub locator_hint: LocatorHint,
    /// Duration in milliseconds, when known before playback starts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

/// A resolved, source-specific address the playback engine can consume
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamLocator {
    /// A remote stream or download URL
    Url(String),
    /// A file on the local filesystem
    File(PathBuf),
}

impl fmt::Display for StreamLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamLocator::Url(url) => write!(f, "{url}"),
            StreamLocator::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Source::Jellyfin).unwrap(), "\"jellyfin\"");
        assert_eq!(serde_json::to_string(&Source::Bookshelf).unwrap(), "\"bookshelf\"");
        assert_eq!(serde_json::to_string(&Source::Local).unwrap(), "\"local\"");
    }

    #[test]
    fn test_item_json_omits_empty_hints() {
        let item = Item {
            name: "Track".into(),
            id: "42".into(),
            source: Source::Local,
            locator_hint: LocatorHint::default(),
            duration_ms: None,
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(!json.contains("duration_ms"));
        assert!(!json.contains("parent_id"));
    }
}
