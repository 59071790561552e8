// Configuration loaded from config.yaml

use crate::filter::Filter;
use crate::models::Priority;
use eyre::{Context, Result, eyre};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_DIR: &str = "todostore";
const CONFIG_FILE: &str = "config.yaml";
const SLOT_FILE: &str = "todos.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct Config {
    /// Where the todo list lives (default: `<data_dir>/todostore/todos.json`)
    pub store_path: Option<PathBuf>,
    /// Priority used by `add` when none is given
    pub default_priority: Priority,
    /// Filter used by `list` when none is given
    pub default_filter: Filter,
}

impl Config {
    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, `<config_dir>/todostore/config.yaml`
    /// is read if present and defaults are used otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path),
                _ => {
                    debug!("No config file found, using defaults");
                    Ok(Self::default())
                }
            },
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(path = ?path, "Loaded config");
        Ok(config)
    }

    /// Pick the slot file: `override_path`, then `store_path`, then the platform data dir
    pub fn resolve_store_path(&self, override_path: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.store_path {
            return Ok(path.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR).join(SLOT_FILE))
            .ok_or_else(|| eyre!("Could not determine a data directory; pass --store-path"))
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join(CONFIG_FILE))
}
