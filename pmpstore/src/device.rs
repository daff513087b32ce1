//! Last-used Bluetooth device record

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// A Bluetooth device as discovered by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BtDevice {
    /// MAC address, e.g. `AA:BB:CC:DD:EE:FF`
    pub mac: String,
    /// Human-readable device name
    pub name: String,
}

/// Whole-file JSON store for the single "last paired device" record
///
/// At most one device is remembered; every successful connect overwrites
/// the previous record.
#[derive(Debug, Clone)]
pub struct DeviceMemory {
    path: PathBuf,
}

impl DeviceMemory {
    /// Creates a store backed by the given file path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persists the device record, replacing any previous one
    pub fn save(&self, device: &BtDevice) -> Result<()> {
        let json = serde_json::to_vec(device)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Loads the remembered device, if any
    ///
    /// A missing or corrupt file reads back as `None`.
    pub fn load(&self) -> Option<BtDevice> {
        let data = fs::read(&self.path).ok()?;
        match serde_json::from_slice(&data) {
            Ok(device) => Some(device),
            Err(e) => {
                warn!(file = %self.path.display(), error = %e, "Corrupt device record, ignoring");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_roundtrip() {
        let dir = TempDir::new().unwrap();
        let memory = DeviceMemory::new(dir.path().join("bt_device.json"));

        assert_eq!(memory.load(), None);

        let device = BtDevice {
            mac: "AA:BB:CC:DD:EE:FF".into(),
            name: "Speaker".into(),
        };
        memory.save(&device).unwrap();
        assert_eq!(memory.load(), Some(device));
    }

    #[test]
    fn test_save_overwrites() {
        let dir = TempDir::new().unwrap();
        let memory = DeviceMemory::new(dir.path().join("bt_device.json"));

        memory
            .save(&BtDevice { mac: "11:11:11:11:11:11".into(), name: "Old".into() })
            .unwrap();
        memory
            .save(&BtDevice { mac: "22:22:22:22:22:22".into(), name: "New".into() })
            .unwrap();

        assert_eq!(memory.load().unwrap().name, "New");
    }

    #[test]
    fn test_corrupt_record_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let memory = DeviceMemory::new(dir.path().join("bt_device.json"));
        fs::write(memory.path(), b"[1, 2").unwrap();
        assert_eq!(memory.load(), None);
    }
}
