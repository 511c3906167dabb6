//! Configuration loading and management.
//!
//! Lookup order, first found wins:
//! 1. `--config` or `TD_CONFIG_PATH` (must exist)
//! 2. `./td.yaml`
//! 3. `<user config dir>/td/config.yaml`
//! 4. built-in defaults
//!
//! Environment variables are applied on top of whichever file was used:
//! `TD_BACKEND`, `TD_DB_PATH`, `TD_JSON_PATH`, `TD_TIMESTAMPS`, `TD_STRICT`.

use crate::error::{TdError, TdResult};
use crate::format::TimestampStyle;
use crate::store::StoreKind;
use crate::store::json_file::DEFAULT_JSON_PATH;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const PROJECT_CONFIG_FILE: &str = "td.yaml";
pub const CONFIG_PATH_ENV: &str = "TD_CONFIG_PATH";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub display: DisplayConfig,

    /// Treat an unknown task id as a failure (non-zero exit).
    #[serde(default)]
    pub strict_not_found: bool,
}

/// Where tasks are kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StoreKind,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Path to the JSON task file.
    #[serde(default = "default_json_path")]
    pub json_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StoreKind::default(),
            db_path: default_db_path(),
            json_path: default_json_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("db.sqlite3")
}

fn default_json_path() -> PathBuf {
    PathBuf::from(DEFAULT_JSON_PATH)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub timestamps: TimestampStyle,
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> TdResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| TdError::io(path, e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| TdError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Resolve the config file to use, or `None` for defaults.
    pub fn locate(explicit: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = explicit {
            return Some(path.to_path_buf());
        }
        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            return Some(PathBuf::from(path));
        }

        let project = PathBuf::from(PROJECT_CONFIG_FILE);
        if project.is_file() {
            return Some(project);
        }

        dirs::config_dir()
            .map(|dir| dir.join("td").join("config.yaml"))
            .filter(|p| p.is_file())
    }

    /// Load from the located file (if any), then apply environment overrides.
    pub fn discover(explicit: Option<&Path>) -> TdResult<Self> {
        let mut config = match Self::locate(explicit) {
            Some(path) => {
                debug!(path = %path.display(), "Loading config");
                Self::load(&path)?
            }
            None => Self::default(),
        };
        config.apply_env_with(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup. Unparseable values are logged
    /// and ignored.
    pub fn apply_env_with<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = get("TD_BACKEND") {
            match StoreKind::from_str(&value) {
                Some(kind) => self.storage.backend = kind,
                None => warn!(value = %value, "Ignoring unknown TD_BACKEND"),
            }
        }

        if let Some(path) = get("TD_DB_PATH") {
            self.storage.db_path = PathBuf::from(path);
        }

        if let Some(path) = get("TD_JSON_PATH") {
            self.storage.json_path = PathBuf::from(path);
        }

        if let Some(value) = get("TD_TIMESTAMPS") {
            match TimestampStyle::from_str(&value) {
                Some(style) => self.display.timestamps = style,
                None => warn!(value = %value, "Ignoring unknown TD_TIMESTAMPS"),
            }
        }

        if let Some(value) = get("TD_STRICT") {
            match value.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.strict_not_found = true,
                "0" | "false" | "no" | "off" => self.strict_not_found = false,
                _ => warn!(value = %value, "Ignoring unknown TD_STRICT"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_use_relative_file_names() {
        let config = Config::default();
        assert_eq!(config.storage.backend, StoreKind::Sqlite);
        assert_eq!(config.storage.db_path, PathBuf::from("db.sqlite3"));
        assert_eq!(config.storage.json_path, PathBuf::from("tasks.json"));
        assert_eq!(config.display.timestamps, TimestampStyle::Relative);
        assert!(!config.strict_not_found);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("td.yaml");
        std::fs::write(
            &path,
            r#"
storage:
  backend: json
  json_path: /tmp/elsewhere.json
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.backend, StoreKind::Json);
        assert_eq!(config.storage.json_path, PathBuf::from("/tmp/elsewhere.json"));
        assert_eq!(config.storage.db_path, PathBuf::from("db.sqlite3"));
        assert_eq!(config.display.timestamps, TimestampStyle::Relative);
    }

    #[test]
    fn invalid_yaml_is_a_config_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("td.yaml");
        std::fs::write(&path, "storage: [unclosed").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, TdError::Config(_)));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.yaml");
        assert!(Config::discover(Some(missing.as_path())).is_err());
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = Config::default();
        config.apply_env_with(env(&[
            ("TD_BACKEND", "json"),
            ("TD_JSON_PATH", "list.json"),
            ("TD_TIMESTAMPS", "raw"),
            ("TD_STRICT", "yes"),
        ]));

        assert_eq!(config.storage.backend, StoreKind::Json);
        assert_eq!(config.storage.json_path, PathBuf::from("list.json"));
        assert_eq!(config.display.timestamps, TimestampStyle::Raw);
        assert!(config.strict_not_found);
    }

    #[test]
    fn bad_env_values_are_ignored() {
        let mut config = Config::default();
        config.apply_env_with(env(&[("TD_BACKEND", "postgres"), ("TD_STRICT", "maybe")]));
        assert_eq!(config, Config::default());
    }
}
