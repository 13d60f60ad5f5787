//! Configuration types and parsing for migrator.yml

use crate::error::{CoreError, CoreResult};
use crate::mode::RunMode;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Advisory lock key shared by every migrator instance unless overridden.
pub const DEFAULT_LOCK_KEY: i64 = 1581;

/// Default config file names, checked in order by [`Config::load_from_dir`].
const CONFIG_FILE_NAMES: [&str; 2] = ["migrator.yml", "migrator.yaml"];

/// Main configuration from migrator.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Logging verbosity for every run
    #[serde(default)]
    pub mode: RunMode,

    /// Named migration targets, run in name order
    pub datasources: BTreeMap<String, DatasourceConfig>,

    /// Directory the config was loaded from; relative folders resolve here
    #[serde(skip)]
    pub root: PathBuf,
}

/// One migration target: where its units live and how to reach its database.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatasourceConfig {
    /// Directory of `.sql` migration files
    pub folder: String,

    /// Postgres connection string (URL, key/value, or `jdbc:postgresql://...`)
    pub connection: String,

    /// User name; overrides any user embedded in `connection`
    #[serde(default)]
    pub user: String,

    /// Password; overrides any password embedded in `connection`
    #[serde(default)]
    pub password: String,

    /// Advisory lock key guarding concurrent runs
    #[serde(default = "default_lock_key")]
    pub lock_key: i64,
}

fn default_lock_key() -> i64 {
    DEFAULT_LOCK_KEY
}

impl DatasourceConfig {
    /// Resolve `folder` against `root` unless it is already absolute.
    pub fn folder_absolute(&self, root: &Path) -> PathBuf {
        let folder = Path::new(&self.folder);
        if folder.is_absolute() {
            folder.to_path_buf()
        } else {
            root.join(folder)
        }
    }
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a directory (looks for migrator.yml or migrator.yaml)
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Self::load(&path);
            }
        }
        Err(CoreError::ConfigNotFound {
            path: dir.join(CONFIG_FILE_NAMES[0]).display().to_string(),
        })
    }

    /// Check required fields that serde cannot express
    pub fn validate(&self) -> CoreResult<()> {
        if self.datasources.is_empty() {
            return Err(CoreError::ConfigInvalid {
                message: "at least one datasource is required".to_string(),
            });
        }
        for (name, ds) in &self.datasources {
            if ds.folder.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("datasource '{name}' has an empty 'folder'"),
                });
            }
            if ds.connection.trim().is_empty() {
                return Err(CoreError::ConfigInvalid {
                    message: format!("datasource '{name}' has an empty 'connection'"),
                });
            }
        }
        Ok(())
    }

    /// Look up a datasource by name
    pub fn datasource(&self, name: &str) -> CoreResult<&DatasourceConfig> {
        self.datasources
            .get(name)
            .ok_or_else(|| CoreError::DatasourceNotFound {
                name: name.to_string(),
                available: self.datasource_names().join(", "),
            })
    }

    /// Datasource names in run order
    pub fn datasource_names(&self) -> Vec<&str> {
        self.datasources.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
