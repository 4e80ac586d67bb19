//! Settings loaded from `--config` or `<config dir>/kpi-deck/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

pub const DEFAULT_COMPANY_NAME: &str = "Your Company";
pub const DEFAULT_ROWS_PER_SLIDE: usize = 12;
/// More rows than this run off the bottom of a 7.5in slide.
pub const MAX_ROWS_PER_SLIDE: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Shown in the deck title and the output file name
    pub company_name: String,
    /// KPI rows per status slide before a continuation slide starts
    pub rows_per_slide: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            company_name: DEFAULT_COMPANY_NAME.to_string(),
            rows_per_slide: DEFAULT_ROWS_PER_SLIDE,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kpi-deck").join("config.toml"))
    }

    /// An explicit path must exist and parse. Without one, the default
    /// location is used if present, otherwise built-in defaults apply.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let settings: Settings = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }

    /// Apply a command-line/env override; blank names are ignored.
    pub fn with_company_name(mut self, name: Option<String>) -> Self {
        if let Some(name) = name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()) {
            self.company_name = name;
        }
        self
    }

    pub fn company_name(&self) -> &str {
        match self.company_name.trim() {
            "" => DEFAULT_COMPANY_NAME,
            name => name,
        }
    }

    pub fn rows_per_slide(&self) -> usize {
        self.rows_per_slide.clamp(1, MAX_ROWS_PER_SLIDE)
    }
}
