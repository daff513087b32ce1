//! Jellyfin catalog adapter
//!
//! Queries a Jellyfin server for audio items over its REST API and resolves
//! them to direct stream URLs. The server reports durations in
//! `RunTimeTicks` (100-nanosecond units); they are flattened to
//! milliseconds here so nothing downstream knows about ticks.

use crate::error::{Result, SourceError};
use crate::model::{Item, LocatorHint, Source, StreamLocator};
use crate::registry::CatalogSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Default timeout for catalog requests (15 seconds)
///
/// Increase in the configuration if the server is slow or on an unreliable
/// network.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

/// Default cap on the number of fetched items
pub const DEFAULT_FETCH_LIMIT: u32 = 50;

/// One `RunTimeTicks` unit is 100 ns; 10 000 of them make a millisecond.
const TICKS_PER_MS: u64 = 10_000;

/// Jellyfin catalog adapter
///
/// The adapter owns its HTTP client and credentials; construct one per
/// configured server and hand it to the registry.
#[derive(Debug, Clone)]
pub struct JellyfinAdapter {
    client: Client,
    base_url: String,
    api_key: String,
    limit: u32,
}

#[derive(Debug, Deserialize)]
struct ItemsPage {
    #[serde(rename = "Items", default)]
    items: Vec<JellyfinItem>,
}

#[derive(Debug, Deserialize)]
struct JellyfinItem {
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Id")]
    id: String,
    #[serde(rename = "RunTimeTicks")]
    run_time_ticks: Option<u64>,
}

impl JellyfinItem {
    fn into_item(self) -> Item {
        Item {
            duration_ms: self.run_time_ticks.map(|t| t / TICKS_PER_MS),
            name: self.name,
            id: self.id,
            source: Source::Jellyfin,
            locator_hint: LocatorHint::default(),
        }
    }
}

impl JellyfinAdapter {
    /// Creates an adapter for the given server
    ///
    /// # Arguments
    ///
    /// * `base_url` - Server URL, e.g. `http://jellyfin.local:8096`
    /// * `api_key` - API key created in the Jellyfin dashboard
    /// * `limit` - Cap on the number of fetched items
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, limit: u32) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            limit,
        })
    }

    /// Constructs the direct stream URL for an audio item
    fn stream_url(&self, item_id: &str) -> String {
        // Standard Jellyfin streaming endpoint
        format!(
            "{}/Audio/{}/stream.mp3?api_key={}",
            self.base_url, item_id, self.api_key
        )
    }
}

#[async_trait]
impl CatalogSource for JellyfinAdapter {
    fn kind(&self) -> Source {
        Source::Jellyfin
    }

    async fn fetch(&self) -> Result<Vec<Item>> {
        let url = format!("{}/Items", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("IncludeItemTypes", "Audio"),
                ("Recursive", "true"),
                ("Limit", &self.limit.to_string()),
                ("api_key", &self.api_key),
            ])
            .send()
            .await?
            .error_for_status()?;

        let page: ItemsPage = response.json().await?;
        let items: Vec<Item> = page.items.into_iter().map(JellyfinItem::into_item).collect();
        debug!(count = items.len(), "Jellyfin items fetched");
        Ok(items)
    }

    async fn resolve(&self, item: &Item) -> Result<StreamLocator> {
        if item.source != Source::Jellyfin {
            return Err(SourceError::Resolution(format!(
                "not a Jellyfin item: {}",
                item.name
            )));
        }
        Ok(StreamLocator::Url(self.stream_url(&item.id)))
    }
}
