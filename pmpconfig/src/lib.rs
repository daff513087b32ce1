//! # PMPlayer Configuration Module
//!
//! This module provides configuration management for PMPlayer, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! Crate-specific settings (catalog credentials, Bluetooth tuning, session
//! timings) are added by the downstream crates through extension traits on
//! [`Config`], so this crate only knows about the generic machinery and the
//! handful of host-level values.
//!
//! ## Usage
//!
//! ```no_run
//! use pmpconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let port = config.get_http_port();
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Result, anyhow};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex},
};
use tracing::info;

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("pmplayer.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load PMPlayer configuration"));
}

const ENV_CONFIG_DIR: &str = "PMPLAYER_CONFIG";
const ENV_PREFIX: &str = "PMPLAYER_CONFIG__";

const DEFAULT_HTTP_PORT: u16 = 8090;

/// Macro to generate getter/setter for u64 values with default
#[macro_export]
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        fn $getter(&self) -> anyhow::Result<u64> {
            match self.get_value($path)? {
                serde_yaml::Value::Number(n) if n.is_u64() => Ok(n.as_u64().unwrap()),
                serde_yaml::Value::Number(n) if n.is_i64() => Ok(n.as_i64().unwrap() as u64),
                _ => Ok($default),
            }
        }

        fn $setter(&self, value: u64) -> anyhow::Result<()> {
            let n = serde_yaml::Number::from(value);
            self.set_value($path, serde_yaml::Value::Number(n))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
#[macro_export]
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        fn $getter(&self) -> anyhow::Result<bool> {
            match self.get_value($path)? {
                serde_yaml::Value::Bool(b) => Ok(b),
                _ => Ok($default),
            }
        }

        fn $setter(&self, value: bool) -> anyhow::Result<()> {
            self.set_value($path, serde_yaml::Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
#[macro_export]
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        fn $getter(&self) -> anyhow::Result<String> {
            match self.get_value($path)? {
                serde_yaml::Value::String(s) => Ok(s),
                _ => Ok($default.to_string()),
            }
        }

        fn $setter(&self, value: String) -> anyhow::Result<()> {
            self.set_value($path, serde_yaml::Value::String(value))
        }
    };
}

/// Configuration manager for PMPlayer
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with the default embedded configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Clone for Config {
    fn clone(&self) -> Self {
        let data = self.data.lock().unwrap().clone();
        Self {
            config_dir: self.config_dir.clone(),
            path: self.path.clone(),
            data: Mutex::new(data),
        }
    }
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var = ENV_CONFIG_DIR, path = %env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".pmplayer").exists() {
            return ".pmplayer".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".pmplayer");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        // Default fallback
        ".pmplayer".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("Configuration path is not a directory"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PMPLAYER_CONFIG` environment variable
    /// 3. `.pmplayer` in the current directory
    /// 4. `.pmplayer` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for
    /// read/write permissions.
    ///
    /// # Panics
    ///
    /// Panics if the directory cannot be created or validated
    pub fn config_dir(directory: &str) -> String {
        let dir_path = Self::find_config_dir(directory);
        let path = Path::new(&dir_path);

        Self::validate_config_dir(path).expect("Cannot validate the configuration directory");

        dir_path
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory);
        info!(config_dir = %config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        // Charger la configuration par défaut
        let mut default_value: Value = serde_yaml::from_str(DEFAULT_CONFIG)?;

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file = %path, "Loaded config file");
            data
        } else {
            info!(config_file = %path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Merger avec la config par défaut
        let external_value: Value = serde_yaml::from_slice(&yaml_data)?;
        merge_yaml(&mut default_value, &external_value);
        let mut config_value = Self::lower_keys_value(default_value);

        // Appliquer les overrides depuis les variables d'environnement
        Self::apply_env_overrides(&mut config_value);

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let data = self.data.lock().unwrap();
        let yaml = serde_yaml::to_string(&*data)?;
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["host", "http_port"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        let mut data = self.data.lock().unwrap();
        Self::set_value_internal(&mut data, path, value)?;
        drop(data);
        self.save()?;
        Ok(())
    }

    fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
        if path.is_empty() {
            *data = value;
            return Ok(());
        }
        if let Value::Mapping(map) = data {
            let key = path[0].to_lowercase();
            let key_value = Value::String(key);
            if path.len() == 1 {
                map.insert(key_value, value);
            } else {
                let entry = map
                    .entry(key_value)
                    .or_insert(Value::Mapping(Mapping::new()));
                Self::set_value_internal(entry, &path[1..], value)?;
            }
            Ok(())
        } else {
            Err(anyhow!("Current node is not a map"))
        }
    }

    /// Gets a configuration value at the specified path
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["host", "http_port"]`)
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing the YAML value or an error if the path
    /// doesn't exist
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.data.lock().unwrap();
        Self::get_value_internal(&data, path)
    }

    fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
        let mut current = data;
        for (i, key) in path.iter().enumerate() {
            if let Value::Mapping(map) = current {
                let key = key.to_lowercase();

                if let Some(next) = map.get(&Value::String(key)) {
                    current = next;
                } else {
                    return Err(anyhow!("Path {} does not exist", path[..=i].join(".")));
                }
            } else {
                return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
            }
        }
        Ok(current.clone())
    }

    fn apply_env_overrides(config: &mut Value) {
        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                let key_path = key
                    .trim_start_matches(ENV_PREFIX)
                    .split("__")
                    .collect::<Vec<_>>();
                let yaml_value = Self::convert_env_value(&value);
                let _ = Self::set_value_internal(config, &key_path, yaml_value);
            }
        }
    }

    fn convert_env_value(value: &str) -> Value {
        if let Ok(parsed) = serde_yaml::from_str::<Value>(value) {
            return parsed;
        }
        Value::String(value.to_string())
    }

    fn lower_keys_value(value: Value) -> Value {
        match value {
            Value::Mapping(map) => {
                let mut new_map = Mapping::new();
                for (k, v) in map {
                    if let Value::String(s) = k {
                        let new_key = Value::String(s.to_lowercase());
                        new_map.insert(new_key, Self::lower_keys_value(v));
                    } else {
                        new_map.insert(k, Self::lower_keys_value(v));
                    }
                }
                Value::Mapping(new_map)
            }
            Value::Sequence(seq) => {
                Value::Sequence(seq.into_iter().map(Self::lower_keys_value).collect())
            }
            _ => value,
        }
    }

    /// Resolves a relative or absolute path and creates the directory if needed
    fn resolve_and_create_dir(&self, dir_path: &str) -> Result<String> {
        let path = Path::new(dir_path);

        let absolute_path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            // Chemin relatif : le résoudre par rapport à config_dir
            Path::new(&self.config_dir).join(path)
        };

        if !absolute_path.exists() {
            fs::create_dir_all(&absolute_path)?;
            info!(directory = %absolute_path.display(), "Created managed directory");
        }

        Ok(absolute_path.to_string_lossy().to_string())
    }

    /// Gets a directory managed by the configuration
    ///
    /// The directory may be absolute or relative to the configuration
    /// directory, and is created if it doesn't exist. The default is
    /// persisted back into the configuration when the key is missing.
    ///
    /// # Arguments
    ///
    /// * `path` - Path in the configuration tree (e.g., `&["sources", "local", "directory"]`)
    /// * `default` - Default directory name if not configured
    pub fn get_managed_dir(&self, path: &[&str], default: &str) -> Result<String> {
        let dir_path = match self.get_value(path) {
            Ok(Value::String(s)) => s,
            _ => {
                self.set_value(path, Value::String(default.to_string()))?;
                default.to_string()
            }
        };
        self.resolve_and_create_dir(&dir_path)
    }

    /// Resolves a file path relative to the configuration directory
    ///
    /// Absolute paths are returned unchanged. Unlike [`get_managed_dir`],
    /// nothing is created: the file may legitimately not exist yet.
    ///
    /// [`get_managed_dir`]: Config::get_managed_dir
    pub fn resolve_file(&self, name: &str) -> String {
        let path = Path::new(name);
        if path.is_absolute() {
            name.to_string()
        } else {
            Path::new(&self.config_dir)
                .join(path)
                .to_string_lossy()
                .to_string()
        }
    }

    /// Returns the configuration directory
    pub fn dir(&self) -> &str {
        &self.config_dir
    }

    // ========================================================================
    // Host settings
    // ========================================================================

    /// Returns the HTTP port of the remote-control server
    pub fn get_http_port(&self) -> u16 {
        match self.get_value(&["host", "http_port"]) {
            Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap() as u16,
            _ => DEFAULT_HTTP_PORT,
        }
    }

    /// Sets the HTTP port of the remote-control server
    pub fn set_http_port(&self, port: u16) -> Result<()> {
        self.set_value(&["host", "http_port"], Value::Number(Number::from(port)))
    }
}

/// Returns the global configuration singleton
///
/// The configuration is loaded once on first access, from the directory
/// resolution order documented on [`Config::config_dir`].
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        // pour les scalaires ou séquences, on remplace
        (d, e) => *d = e.clone(),
    }
}
