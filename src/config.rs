use crate::search::cache::DEFAULT_CACHE_CAPACITY;
use crate::search::{
    BINARY_PROBE_SIZE, MAX_FILE_SIZE, MAX_LINE_LENGTH, MAX_RESULTS, SearchLimits, TIMEOUT_MS,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub cache: CacheConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub max_results: usize,
    pub max_file_size: u64,
    pub timeout_ms: u64,
    pub max_line_length: usize,
    pub binary_probe_size: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_results: MAX_RESULTS,
            max_file_size: MAX_FILE_SIZE,
            timeout_ms: TIMEOUT_MS,
            max_line_length: MAX_LINE_LENGTH,
            binary_probe_size: BINARY_PROBE_SIZE,
        }
    }
}

impl From<&SearchConfig> for SearchLimits {
    fn from(config: &SearchConfig) -> Self {
        SearchLimits {
            max_results: config.max_results,
            max_file_size: config.max_file_size,
            timeout_ms: config.timeout_ms,
            max_line_length: config.max_line_length,
            binary_probe_size: config.binary_probe_size,
        }
        .clamped()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Compiled include tokens kept per engine
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl Config {
    /// Loads `explicit` if given, otherwise the first config file found in
    /// the usual places, otherwise defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_path(),
        };
        match path {
            Some(path) => Self::from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn find_config_path() -> Option<PathBuf> {
        if let Some(xdg_config) = dirs::config_dir() {
            let xdg_path = xdg_config.join("codeseek/config.toml");
            if xdg_path.exists() {
                return Some(xdg_path);
            }
        }

        if let Some(home) = dirs::home_dir() {
            let home_path = home.join(".codeseek.toml");
            if home_path.exists() {
                return Some(home_path);
            }
        }

        let current_path = Path::new(".codeseek.toml");
        if current_path.exists() {
            return Some(current_path.to_path_buf());
        }

        None
    }

    pub fn limits(&self) -> SearchLimits {
        SearchLimits::from(&self.search)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }
}
