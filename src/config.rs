//! Configuration parsing for treelink
//!
//! A configuration names the two tree roots and the extension lists that
//! decide whether a source-only file is copied or symlinked into the
//! destination. Both JSON and TOML files are accepted.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::classify::ExtensionTable;

/// Default configuration file name, looked up in the current directory
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not open: {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse config file {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to parse config file {}: {source}", path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Could not resolve working directory: {0}")]
    WorkingDir(#[source] io::Error),
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// Root of the tree files are taken from
    pub source: PathBuf,

    /// Root of the tree files are materialized into
    pub destination: PathBuf,

    /// Extensions (without the leading dot) that are copied byte for byte
    #[serde(default)]
    pub copy: Vec<String>,

    /// Extensions (without the leading dot) that are linked to the source file
    #[serde(default)]
    pub symlink: Vec<String>,
}

impl Config {
    /// Load configuration from a file.
    ///
    /// Files ending in `.toml` are read as TOML, anything else as JSON.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content).map_err(|source| ConfigError::Toml {
                path: path.to_path_buf(),
                source,
            })
        } else {
            serde_json::from_str(&content).map_err(|source| ConfigError::Json {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    /// Path of the configuration file used when none is given
    pub fn default_path() -> PathBuf {
        PathBuf::from(".").join(CONFIG_FILE_NAME)
    }

    /// Absolute source and destination roots, relative ones resolved against `base`
    pub fn resolve_roots(&self, base: &Path) -> (PathBuf, PathBuf) {
        (
            absolutize(base, &self.source),
            absolutize(base, &self.destination),
        )
    }

    /// Same as [`Config::resolve_roots`] with the current working directory as base
    pub fn roots(&self) -> Result<(PathBuf, PathBuf), ConfigError> {
        let cwd = std::env::current_dir().map_err(ConfigError::WorkingDir)?;
        Ok(self.resolve_roots(&cwd))
    }

    pub fn extension_table(&self) -> ExtensionTable {
        ExtensionTable::new(self.copy.iter().cloned(), self.symlink.iter().cloned())
    }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
