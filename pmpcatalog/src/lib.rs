//! # PMPCatalog
//!
//! Catalog sources for PMPlayer. This crate normalizes three heterogeneous
//! backends into one playable-item model:
//!
//! - **Jellyfin**: audio items from a Jellyfin media server
//! - **Audiobookshelf**: books and podcast episodes, with podcast containers
//!   expanded into their episodes
//! - **Local files**: an allow-listed directory of audio files
//!
//! ## Architecture
//!
//! Every backend implements the [`CatalogSource`] trait and is owned by a
//! [`SourceRegistry`]. Adapters are constructed explicitly (usually from
//! `pmpconfig`) and injected into the registry; there is no process-wide
//! client state.
//!
//! Fetching never yields a partial playlist: a network or parse failure
//! surfaces as a [`SourceError`] and the caller keeps its previous state.

pub mod bookshelf;
pub mod config_ext;
pub mod error;
pub mod jellyfin;
pub mod local;
pub mod model;
pub mod registry;

pub use bookshelf::BookshelfAdapter;
pub use config_ext::CatalogConfigExt;
pub use error::{Result, SourceError};
pub use jellyfin::JellyfinAdapter;
pub use local::LocalAdapter;
pub use model::{Item, LocatorHint, Source, StreamLocator};
pub use registry::{CatalogSource, FetchOptions, SourceRegistry};
