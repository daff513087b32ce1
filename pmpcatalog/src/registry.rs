//! Source registry: uniform access to every configured backend

use crate::error::{Result, SourceError};
use crate::model::{Item, Source, StreamLocator};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use tracing::{debug, info};

/// Options applied to a fetch, independent of the backend
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchOptions {
    /// Shuffle the fetched items before returning them
    pub shuffle: bool,
}

impl FetchOptions {
    /// Options for a shuffled fetch
    pub fn shuffled() -> Self {
        Self { shuffle: true }
    }
}

/// A catalog backend normalized to the common item model
///
/// Implementations own their credentials and HTTP clients; nothing here is
/// shared process-wide. All methods are best-effort network calls and may
/// take seconds; callers run them inside the session's serialized command
/// path.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Which [`Source`] this adapter produces
    fn kind(&self) -> Source;

    /// Fetches the full normalized item list
    ///
    /// Either every item made it through, or the fetch failed as a whole;
    /// a partial list is never returned.
    async fn fetch(&self) -> Result<Vec<Item>>;

    /// Resolves an item produced by this adapter to a playable locator
    async fn resolve(&self, item: &Item) -> Result<StreamLocator>;
}

/// Registry owning one adapter per enabled source
///
/// Adapters are injected at construction; dispatch is by the closed
/// [`Source`] enum.
#[derive(Default)]
pub struct SourceRegistry {
    adapters: Vec<Box<dyn CatalogSource>>,
}

impl SourceRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an adapter, replacing any previous one of the same kind
    pub fn register(&mut self, adapter: Box<dyn CatalogSource>) {
        let kind = adapter.kind();
        self.adapters.retain(|a| a.kind() != kind);
        self.adapters.push(adapter);
        info!(source = %kind, "Catalog source registered");
    }

    /// Lists the kinds with a registered adapter
    pub fn kinds(&self) -> Vec<Source> {
        self.adapters.iter().map(|a| a.kind()).collect()
    }

    fn adapter(&self, kind: Source) -> Result<&dyn CatalogSource> {
        self.adapters
            .iter()
            .find(|a| a.kind() == kind)
            .map(|a| a.as_ref())
            .ok_or(SourceError::NoAdapter(kind))
    }

    /// Fetches the item list of one source
    pub async fn fetch(&self, kind: Source, options: FetchOptions) -> Result<Vec<Item>> {
        let mut items = self.adapter(kind)?.fetch().await?;
        if options.shuffle {
            items.shuffle(&mut rand::rng());
        }
        debug!(source = %kind, count = items.len(), shuffle = options.shuffle, "Fetched items");
        Ok(items)
    }

    /// Resolves an item through the adapter that produced it
    pub async fn resolve(&self, item: &Item) -> Result<StreamLocator> {
        self.adapter(item.source)?.resolve(item).await
    }
}
