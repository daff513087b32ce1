//! Extension adding storage paths to `pmpconfig::Config`

use pmpconfig::Config;

const DEFAULT_BOOKMARKS_FILE: &str = "bookmarks.json";
const DEFAULT_DEVICE_FILE: &str = "bt_device.json";

/// Extension trait resolving the persisted-file locations
///
/// Relative paths resolve against the configuration directory, so the
/// documents live next to `config.yaml` by default.
pub trait StoreConfigExt {
    /// Path of the bookmark table file
    fn get_bookmarks_file(&self) -> String;

    /// Path of the last-Bluetooth-device record file
    fn get_device_file(&self) -> String;
}

impl StoreConfigExt for Config {
    fn get_bookmarks_file(&self) -> String {
        let name = match self.get_value(&["storage", "bookmarks_file"]) {
            Ok(serde_yaml::Value::String(s)) => s,
            _ => DEFAULT_BOOKMARKS_FILE.to_string(),
        };
        self.resolve_file(&name)
    }

    fn get_device_file(&self) -> String {
        let name = match self.get_value(&["storage", "device_file"]) {
            Ok(serde_yaml::Value::String(s)) => s,
            _ => DEFAULT_DEVICE_FILE.to_string(),
        };
        self.resolve_file(&name)
    }
}
