//! # PMPStore
//!
//! Durable persistence for the two small documents PMPlayer keeps across
//! power cycles:
//!
//! - **Bookmarks**: a `name → position (ms)` map, so playback resumes where
//!   it stopped ([`BookmarkStore`]).
//! - **Last Bluetooth device**: the `{mac, name}` record replayed at boot
//!   ([`DeviceMemory`]).
//!
//! Both are whole-file JSON documents, overwritten on every save. The
//! session process is the only writer, so last-writer-wins is enough; read
//! failures of any kind degrade to "no data" rather than propagating.

pub mod bookmarks;
pub mod config_ext;
pub mod device;
pub mod error;

pub use bookmarks::{BookmarkStore, Bookmarks};
pub use config_ext::StoreConfigExt;
pub use device::{BtDevice, DeviceMemory};
pub use error::{Result, StoreError};
