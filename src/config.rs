use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FAKEWKHTMLTOPDF_CONFIG";

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub renderer: RendererConfig,
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RendererConfig {
    /// Chromium binary; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
    pub headless: bool,
    pub sandbox: bool,
    /// Navigation timeout for the browser tab.
    pub timeout_secs: Option<u64>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            chrome_path: None,
            headless: true,
            sandbox: true,
            timeout_secs: None,
        }
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    pub enabled: bool,
    pub file: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            file: "~/.wkhtmltopdf.log".to_string(),
        }
    }
}

impl LogConfig {
    /// The invocation log path with a leading `~` expanded.
    pub fn path(&self) -> Option<PathBuf> {
        if !self.enabled || self.file.is_empty() {
            return None;
        }
        match self.file.strip_prefix("~/") {
            Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
            None => Some(PathBuf::from(&self.file)),
        }
    }
}

impl Config {
    /// The settings bundled with the binary.
    pub fn compiled_default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_default()
    }

    /// Where to look for a user config: the env override, then the platform config dir.
    pub fn default_path() -> Option<PathBuf> {
        std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|dir| dir.join("fakewkhtmltopdf").join("config.toml")))
    }

    /// Load config from a TOML file, or return defaults if not found.
    pub fn load(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| Error::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::compiled_default()),
            Err(e) => Err(Error::Config {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }),
        }
    }

    /// Load from `default_path`, falling back to the compiled default.
    pub fn discover() -> Result<Self> {
        match Self::default_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::compiled_default()),
        }
    }
}
