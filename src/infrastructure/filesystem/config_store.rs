use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use validator::Validate;

use crate::domain::value_objects::identity::Identity;

/// Directory below the platform config dir holding the configuration file
pub const CONFIG_DIR_NAME: &str = "gitstat";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration store related errors
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    #[error("Configuration file not found at path: {0}")]
    ConfigFileNotFound(String),

    #[error("Configuration file read failed: {0}")]
    ReadFailed(String),

    #[error("YAML parsing failed: {0}")]
    YamlParsingFailed(String),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Runtime configuration of gitstat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AppConfig {
    /// Root path patterns scanned for working copies, in order
    #[validate(length(min = 1))]
    pub roots: Vec<String>,

    /// Depth bound for the marker search below each root
    #[validate(range(min = 1, max = 64))]
    pub max_depth: usize,

    /// Committer identity used for bulk commits
    #[validate(nested)]
    pub committer: Identity,

    /// Service account offered to the SSH agent
    #[validate(length(min = 1))]
    pub push_user: String,

    /// Remote that receives pushes
    #[validate(length(min = 1))]
    pub remote: String,

    /// Message used when no `--message` is given
    #[validate(length(min = 1))]
    pub commit_message: String,

    /// Worker pool size (number of CPUs when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1))]
    pub jobs: Option<usize>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            roots: [
                "~/scripts",
                "~/configuration",
                "~/development",
                "~/.password-store",
                "~/ansible",
                "~/vimwiki",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            max_depth: 6,
            committer: Identity::default_committer(),
            push_user: "git".to_string(),
            remote: "origin".to_string(),
            commit_message: "committed by gitstat".to_string(),
            jobs: None,
        }
    }
}

impl AppConfig {
    /// Effective worker count
    pub fn effective_jobs(&self) -> usize {
        self.jobs.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validate field constraints, including the committer identity
    pub fn check(&self) -> Result<(), ConfigStoreError> {
        self.validate()
            .map_err(|e| ConfigStoreError::ValidationFailed(e.to_string()))?;
        self.committer
            .check()
            .map_err(|e| ConfigStoreError::ValidationFailed(e.to_string()))
    }
}

/// Loads [`AppConfig`] from YAML
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    /// Overrides the platform config directory lookup
    config_dir: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `dir` instead of the platform config directory
    pub fn with_config_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            config_dir: Some(dir.into()),
        }
    }

    /// Location of the default configuration file, if a config dir is known
    pub fn default_config_path(&self) -> Option<PathBuf> {
        self.config_dir
            .clone()
            .or_else(|| dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME)))
            .map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration
    ///
    /// An explicit path must exist. Without one, the default file is read when
    /// present and built-in defaults are used otherwise.
    pub fn load(&self, explicit: Option<&Path>) -> Result<AppConfig, ConfigStoreError> {
        let config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigStoreError::ConfigFileNotFound(
                        path.display().to_string(),
                    ));
                }
                self.read_config(path)?
            }
            None => match self.default_config_path() {
                Some(path) if path.is_file() => self.read_config(&path)?,
                _ => {
                    debug!("No configuration file, using defaults");
                    AppConfig::default()
                }
            },
        };

        config.check()?;
        Ok(config)
    }

    /// Parse a configuration file without validating it
    pub fn read_config(&self, path: &Path) -> Result<AppConfig, ConfigStoreError> {
        debug!("Reading configuration from {}", path.display());
        let contents = fs::read_to_string(path)
            .map_err(|e| ConfigStoreError::ReadFailed(format!("{}: {}", path.display(), e)))?;
        if contents.trim().is_empty() {
            return Ok(AppConfig::default());
        }
        serde_yaml::from_str(&contents)
            .map_err(|e| ConfigStoreError::YamlParsingFailed(format!("{}: {}", path.display(), e)))
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_home(pattern: &str) -> String {
    if pattern == "~" || pattern.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}{}", home.display(), &pattern[1..]);
        }
    }
    pattern.to_string()
}
