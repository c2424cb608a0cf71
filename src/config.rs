use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::pdf::DEFAULT_CELL_GAP;
use crate::syllabus::{Markers, Strategy};

const APP_DIR: &str = "syllabus-tracker";
const DEFAULT_DB_NAME: &str = "syllabus.db";
const CONFIG_FILE: &str = "config.toml";

pub const DB_ENV: &str = "SYLLABUS_DB";
pub const CONFIG_ENV: &str = "SYLLABUS_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file; defaults to the per-user config directory
    pub database: Option<PathBuf>,
    pub strategy: Strategy,
    pub module_prefix: String,
    pub summary_marker: String,
    pub cell_gap: f32,
}

impl Default for Config {
    fn default() -> Self {
        let markers = Markers::default();
        Self {
            database: None,
            strategy: Strategy::default(),
            module_prefix: markers.module_prefix,
            summary_marker: markers.summary_marker,
            cell_gap: DEFAULT_CELL_GAP,
        }
    }
}

impl Config {
    /// Loads the config file named by `SYLLABUS_CONFIG`, or the default one.
    ///
    /// A missing file is not an error.
    pub fn load() -> Result<Self> {
        let path = match std::env::var(CONFIG_ENV) {
            Ok(path) => PathBuf::from(path),
            Err(_) => app_dir().join(CONFIG_FILE),
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let config: Config = toml::from_str(&raw).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    pub fn markers(&self) -> Markers {
        Markers {
            module_prefix: self.module_prefix.clone(),
            summary_marker: self.summary_marker.clone(),
        }
    }

    /// `SYLLABUS_DB` wins over the config file, which wins over the default.
    pub fn db_path(&self) -> PathBuf {
        let from_env = std::env::var(DB_ENV).ok().map(PathBuf::from);
        let path = self.resolve_db_path(from_env, &app_dir());
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).ok();
        }
        path
    }

    fn resolve_db_path(&self, from_env: Option<PathBuf>, app_dir: &Path) -> PathBuf {
        from_env
            .or_else(|| self.database.clone())
            .unwrap_or_else(|| app_dir.join(DEFAULT_DB_NAME))
    }
}

fn app_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}
