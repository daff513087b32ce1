//! Audiobookshelf catalog adapter
//!
//! Lists an Audiobookshelf library and flattens it into playable items.
//! Two kinds of library entries exist:
//!
//! - plain **books**, which enter the playlist as one item each
//! - **podcast containers**, which are never playable themselves: one extra
//!   request per podcast enumerates its episodes, and the episodes replace
//!   the container in the flattened list
//!
//! Resolution downloads the audio file into a local cache directory and
//! returns the cached path, so subsequent plays work without the network;
//! when the download fails, the adapter falls back to the server's
//! streaming endpoint instead of failing the resolve.

use crate::error::{Result, SourceError};
use crate::model::{Item, LocatorHint, Source, StreamLocator};
use crate::registry::CatalogSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default timeout for library requests (15 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Timeout for a full audio-file download (10 minutes)
///
/// Audiobook files can be large and the device's network slow, so the
/// download budget is far wider than the catalog budget.
const DOWNLOAD_TIMEOUT_SECS: u64 = 600;

/// Audiobookshelf catalog adapter
#[derive(Debug, Clone)]
pub struct BookshelfAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    library_id: String,
    cache_dir: PathBuf,
}

// ============================================================================
// Wire models (the subset of the Audiobookshelf payloads we consume)
// ============================================================================

#[derive(Debug, Deserialize)]
struct LibraryPage {
    #[serde(default)]
    results: Vec<LibraryEntry>,
}

#[derive(Debug, Deserialize)]
struct LibraryEntry {
    id: String,
    #[serde(rename = "mediaType")]
    media_type: Option<String>,
    #[serde(default)]
    media: EntryMedia,
}

#[derive(Debug, Default, Deserialize)]
struct EntryMedia {
    #[serde(default)]
    metadata: EntryMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct EntryMetadata {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExpandedItem {
    #[serde(default)]
    media: ExpandedMedia,
}

#[derive(Debug, Default, Deserialize)]
struct ExpandedMedia {
    #[serde(default)]
    episodes: Vec<Episode>,
}

#[derive(Debug, Deserialize)]
struct Episode {
    id: String,
    title: Option<String>,
    #[serde(rename = "audioFile", default)]
    audio_file: Option<AudioFile>,
}

#[derive(Debug, Default, Deserialize)]
struct AudioFile {
    ino: Option<String>,
    #[serde(default)]
    metadata: AudioFileMetadata,
}

#[derive(Debug, Default, Deserialize)]
struct AudioFileMetadata {
    format: Option<String>,
}

impl LibraryEntry {
    fn is_podcast(&self) -> bool {
        self.media_type.as_deref() == Some("podcast")
    }

    /// A plain book becomes one item; its own id doubles as the parent id
    /// used by the download endpoint.
    fn into_book_item(self) -> Item {
        Item {
            name: self.media.metadata.title.unwrap_or_else(|| "Book".to_string()),
            source: Source::Bookshelf,
            locator_hint: LocatorHint {
                parent_id: Some(self.id.clone()),
                ..LocatorHint::default()
            },
            id: self.id,
            duration_ms: None,
        }
    }
}

impl Episode {
    /// An episode keeps its podcast's id as parent and carries the audio
    /// file's `ino` handle, which the download endpoint is keyed by.
    fn into_item(self, parent_id: &str) -> Item {
        let audio_file = self.audio_file.unwrap_or_default();
        Item {
            name: self.title.unwrap_or_else(|| "Episode".to_string()),
            id: self.id,
            source: Source::Bookshelf,
            locator_hint: LocatorHint {
                parent_id: Some(parent_id.to_string()),
                ino: audio_file.ino,
                ext: Some(audio_file.metadata.format.unwrap_or_else(|| "mp3".to_string())),
                path: None,
            },
            duration_ms: None,
        }
    }
}

/// Maps every non-alphanumeric character to `_`, producing a filename that
/// is safe on any filesystem the cache may live on.
fn safe_filename(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

impl BookshelfAdapter {
    /// Creates an adapter for the given server and library
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server URL, e.g. `http://abs.local:13378`
    /// * `api_key` - API token with access to the library
    /// * `library_id` - Library to list
    /// * `cache_dir` - Directory for downloaded audio files (must exist)
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        library_id: impl Into<String>,
        cache_dir: impl Into<PathBuf>,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            library_id: library_id.into(),
            cache_dir: cache_dir.into(),
        })
    }

    async fn episodes(&self, podcast: &LibraryEntry) -> Result<Vec<Item>> {
        let url = format!("{}/api/items/{}", self.base_url, podcast.id);
        let expanded: ExpandedItem = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(expanded
            .media
            .episodes
            .into_iter()
            .map(|ep| ep.into_item(&podcast.id))
            .collect())
    }

    /// Cache location of an item's audio file
    fn cached_path(&self, item: &Item) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{}.mp3", item.id, safe_filename(&item.name)))
    }

    /// Download endpoint for an item
    ///
    /// Episodes are keyed by their audio file's `ino` handle; whole books
    /// use the library item's download endpoint.
    fn download_url(&self, item: &Item) -> String {
        let parent = item.locator_hint.parent_id.as_deref().unwrap_or(&item.id);
        match &item.locator_hint.ino {
            Some(ino) => format!(
                "{}/api/items/{}/file/{}/download?token={}",
                self.base_url, parent, ino, self.api_key
            ),
            None => format!(
                "{}/api/items/{}/download?token={}",
                self.base_url, parent, self.api_key
            ),
        }
    }

    /// Streaming endpoint used when a download is not possible
    fn play_url(&self, item: &Item) -> String {
        format!(
            "{}/api/items/{}/play?token={}",
            self.base_url, item.id, self.api_key
        )
    }

    async fn download(&self, item: &Item, target: &Path) -> Result<()> {
        let url = self.download_url(item);
        info!(name = %item.name, "Downloading from Audiobookshelf");

        let response = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        tokio::fs::write(target, &bytes).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogSource for BookshelfAdapter {
    fn kind(&self) -> Source {
        Source::Bookshelf
    }

    async fn fetch(&self) -> Result<Vec<Item>> {
        let url = format!(
            "{}/api/libraries/{}/items",
            self.base_url, self.library_id
        );
        let page: LibraryPage = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let mut items = Vec::new();
        for entry in page.results {
            if entry.is_podcast() {
                // The container itself is never playable; its episodes
                // take its place in the flattened list.
                match self.episodes(&entry).await {
                    Ok(episodes) => items.extend(episodes),
                    Err(e) => {
                        warn!(podcast = %entry.id, error = %e, "Skipping podcast, episode expansion failed")
                    }
                }
            } else {
                items.push(entry.into_book_item());
            }
        }
        debug!(count = items.len(), "Audiobookshelf items fetched");
        Ok(items)
    }

    async fn resolve(&self, item: &Item) -> Result<StreamLocator> {
        if item.source != Source::Bookshelf {
            return Err(SourceError::Resolution(format!(
                "not an Audiobookshelf item: {}",
                item.name
            )));
        }

        let cached = self.cached_path(item);
        if cached.exists() {
            debug!(path = %cached.display(), "Playing cached file");
            return Ok(StreamLocator::File(cached));
        }

        match self.download(item, &cached).await {
            Ok(()) => Ok(StreamLocator::File(cached)),
            Err(e) => {
                // Streaming still works when the cache cannot be filled.
                warn!(name = %item.name, error = %e, "Download failed, falling back to streaming");
                Ok(StreamLocator::Url(self.play_url(item)))
            }
        }
    }
}
