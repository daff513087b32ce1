//! Extension adding catalog settings to `pmpconfig::Config`
//!
//! Follows the per-crate extension-trait convention: `pmpconfig` owns the
//! generic machinery, each crate contributes the getters for its own
//! section of the tree.

use crate::jellyfin::DEFAULT_FETCH_LIMIT;
use crate::local::DEFAULT_EXTENSIONS;
use anyhow::Result;
use pmpconfig::Config;
use serde_yaml::Value;

/// Extension trait for the `sources:` section of the configuration
pub trait CatalogConfigExt {
    // ========================================================================
    // Jellyfin
    // ========================================================================

    /// Server URL, e.g. `http://jellyfin.local:8096`
    fn get_jellyfin_url(&self) -> Result<String>;

    /// API key created in the Jellyfin dashboard
    fn get_jellyfin_api_key(&self) -> Result<String>;

    /// Cap on the number of fetched items
    fn get_jellyfin_limit(&self) -> Result<u32>;

    // ========================================================================
    // Audiobookshelf
    // ========================================================================

    /// Server URL, e.g. `http://abs.local:13378`
    fn get_bookshelf_url(&self) -> Result<String>;

    /// API token with access to the library
    fn get_bookshelf_api_key(&self) -> Result<String>;

    /// Library to list
    fn get_bookshelf_library_id(&self) -> Result<String>;

    /// Download cache directory (created if missing)
    fn get_bookshelf_cache_dir(&self) -> Result<String>;

    // ========================================================================
    // Local files
    // ========================================================================

    /// Music directory (created if missing)
    fn get_local_directory(&self) -> Result<String>;

    /// Allow-listed audio file extensions
    fn get_local_extensions(&self) -> Result<Vec<String>>;
}

fn get_string(config: &Config, path: &[&str]) -> Result<String> {
    match config.get_value(path) {
        Ok(Value::String(s)) => Ok(s),
        _ => Ok(String::new()),
    }
}

impl CatalogConfigExt for Config {
    fn get_jellyfin_url(&self) -> Result<String> {
        get_string(self, &["sources", "jellyfin", "url"])
    }

    fn get_jellyfin_api_key(&self) -> Result<String> {
        get_string(self, &["sources", "jellyfin", "api_key"])
    }

    fn get_jellyfin_limit(&self) -> Result<u32> {
        match self.get_value(&["sources", "jellyfin", "limit"]) {
            Ok(Value::Number(n)) if n.is_u64() => Ok(n.as_u64().unwrap() as u32),
            _ => Ok(DEFAULT_FETCH_LIMIT),
        }
    }

    fn get_bookshelf_url(&self) -> Result<String> {
        get_string(self, &["sources", "audiobookshelf", "url"])
    }

    fn get_bookshelf_api_key(&self) -> Result<String> {
        get_string(self, &["sources", "audiobookshelf", "api_key"])
    }

    fn get_bookshelf_library_id(&self) -> Result<String> {
        get_string(self, &["sources", "audiobookshelf", "library_id"])
    }

    fn get_bookshelf_cache_dir(&self) -> Result<String> {
        self.get_managed_dir(&["sources", "audiobookshelf", "cache_directory"], "abs_cache")
    }

    fn get_local_directory(&self) -> Result<String> {
        self.get_managed_dir(&["sources", "local", "directory"], "music")
    }

    fn get_local_extensions(&self) -> Result<Vec<String>> {
        match self.get_value(&["sources", "local", "extensions"]) {
            Ok(Value::Sequence(seq)) => Ok(seq
                .into_iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect()),
            _ => Ok(DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()),
        }
    }
}
