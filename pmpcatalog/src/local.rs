//! Local-directory catalog adapter
//!
//! Lists a fixed music directory, keeping only files whose extension is on
//! the configured allow-list (matched case-insensitively), sorted by
//! filename. The directory is created when missing, and an empty listing is
//! reported as the distinct [`SourceError::NoFiles`] signal rather than a
//! transient failure.

use crate::error::{Result, SourceError};
use crate::model::{Item, LocatorHint, Source, StreamLocator};
use crate::registry::CatalogSource;
use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Extensions accepted when the configuration does not list its own
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav"];

/// Local files catalog adapter
#[derive(Debug, Clone)]
pub struct LocalAdapter {
    directory: PathBuf,
    extensions: Vec<String>,
}

impl LocalAdapter {
    /// Creates an adapter over the given directory
    ///
    /// Extensions are stored lowercased; matching at fetch time lowercases
    /// the candidate side as well.
    pub fn new(directory: impl Into<PathBuf>, extensions: &[String]) -> Self {
        let extensions = if extensions.is_empty() {
            DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
        } else {
            extensions.iter().map(|e| e.to_lowercase()).collect()
        };
        Self {
            directory: directory.into(),
            extensions,
        }
    }

    fn is_allowed(&self, file_name: &str) -> bool {
        let lower = file_name.to_lowercase();
        self.extensions
            .iter()
            .any(|ext| lower.ends_with(&format!(".{ext}")))
    }
}

#[async_trait]
impl CatalogSource for LocalAdapter {
    fn kind(&self) -> Source {
        Source::Local
    }

    async fn fetch(&self) -> Result<Vec<Item>> {
        if !self.directory.exists() {
            fs::create_dir_all(&self.directory)?;
        }

        let mut names: Vec<String> = fs::read_dir(&self.directory)?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.is_allowed(name))
            .collect();

        if names.is_empty() {
            return Err(SourceError::NoFiles);
        }
        names.sort();

        let items = names
            .into_iter()
            .map(|name| Item {
                id: name.clone(),
                locator_hint: LocatorHint {
                    path: Some(self.directory.join(&name)),
                    ..LocatorHint::default()
                },
                name,
                source: Source::Local,
                duration_ms: None,
            })
            .collect::<Vec<_>>();
        debug!(count = items.len(), directory = %self.directory.display(), "Local files listed");
        Ok(items)
    }

    async fn resolve(&self, item: &Item) -> Result<StreamLocator> {
        item.locator_hint
            .path
            .clone()
            .map(StreamLocator::File)
            .ok_or_else(|| SourceError::Resolution(format!("local item without path: {}", item.name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &TempDir, name: &str) {
        fs::write(dir.path().join(name), b"x").unwrap();
    }

    fn adapter(dir: &TempDir) -> LocalAdapter {
        LocalAdapter::new(dir.path(), &[])
    }

    #[tokio::test]
    async fn test_filters_by_allow_list_case_insensitively() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "b.MP3");
        touch(&dir, "a.mp3");
        touch(&dir, "notes.txt");
        touch(&dir, "c.M4A");

        let items = adapter(&dir).fetch().await.unwrap();
        let names: Vec<_> = items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.mp3", "b.MP3", "c.M4A"]);
    }

    #[tokio::test]
    async fn test_empty_directory_reports_no_files() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(adapter(&dir).fetch().await, Err(SourceError::NoFiles)));
    }

    #[tokio::test]
    async fn test_missing_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("music");
        let adapter = LocalAdapter::new(&nested, &[]);

        assert!(matches!(adapter.fetch().await, Err(SourceError::NoFiles)));
        assert!(nested.is_dir());
    }

    #[tokio::test]
    async fn test_resolve_returns_the_file_path() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.mp3");

        let adapter = adapter(&dir);
        let item = adapter.fetch().await.unwrap().remove(0);
        assert_eq!(
            adapter.resolve(&item).await.unwrap(),
            StreamLocator::File(dir.path().join("a.mp3"))
        );
    }

    #[tokio::test]
    async fn test_custom_allow_list() {
        let dir = TempDir::new().unwrap();
        touch(&dir, "a.ogg");
        touch(&dir, "b.mp3");

        let adapter = LocalAdapter::new(dir.path(), &["OGG".to_string()]);
        let items = adapter.fetch().await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].name, "a.ogg");
    }
}
