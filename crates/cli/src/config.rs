// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `config.toml` under the user config directory
//! (`~/.config/olsync/` on Linux) and includes:
//! - `api_url`: Base URL of the outliner API
//! - `state_dir`: Optional override for where the database and log live
//! - `[queue]`: Retry timings of the job queue
//! - `[markers]`: Tags designating the inbox and bookmarks
//!
//! A missing file yields the defaults.

use ol_core::Markers;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

const APP_DIR_NAME: &str = "olsync";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "outline.db";
const LOG_FILE_NAME: &str = "olsync.log";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the remote API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Directory for the database and log (default: user state directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,
    /// Pause before the single retry of a rate-limited request (seconds).
    #[serde(default = "default_rate_limit_delay_secs")]
    pub rate_limit_delay_secs: u64,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub markers: Markers,
}

/// Retry timings of the job queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Base of the exponential backoff for mutation jobs (seconds).
    #[serde(default = "default_base_delay_secs")]
    pub base_delay_secs: u64,
    /// Attempts before a mutation job is cancelled.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Attempts a job may wait for its target to receive a remote identity.
    #[serde(default = "default_identify_attempts")]
    pub identify_attempts: u32,
    /// Fixed delay while the remote inbox is not configured (seconds).
    #[serde(default = "default_missing_resource_delay_secs")]
    pub missing_resource_delay_secs: u64,
    /// Delay after a network failure; not counted as an attempt (seconds).
    #[serde(default = "default_network_retry_delay_secs")]
    pub network_retry_delay_secs: u64,
    /// Minimum spacing of syncs forced by stuck jobs (seconds).
    #[serde(default = "default_sync_debounce_secs")]
    pub sync_debounce_secs: u64,
    /// Base backoff of the sync job (seconds).
    #[serde(default = "default_sync_base_delay_secs")]
    pub sync_base_delay_secs: u64,
    /// Attempts of the sync job.
    #[serde(default = "default_sync_max_attempts")]
    pub sync_max_attempts: u32,
}

fn default_api_url() -> String {
    "https://dynalist.io/api/v1".to_string()
}

fn default_rate_limit_delay_secs() -> u64 {
    60
}

fn default_base_delay_secs() -> u64 {
    10
}

fn default_max_attempts() -> u32 {
    13
}

fn default_identify_attempts() -> u32 {
    3
}

fn default_missing_resource_delay_secs() -> u64 {
    60
}

fn default_network_retry_delay_secs() -> u64 {
    5
}

fn default_sync_debounce_secs() -> u64 {
    30
}

fn default_sync_base_delay_secs() -> u64 {
    10
}

fn default_sync_max_attempts() -> u32 {
    2
}

impl Default for QueueConfig {
    fn default() -> Self {
        QueueConfig {
            base_delay_secs: default_base_delay_secs(),
            max_attempts: default_max_attempts(),
            identify_attempts: default_identify_attempts(),
            missing_resource_delay_secs: default_missing_resource_delay_secs(),
            network_retry_delay_secs: default_network_retry_delay_secs(),
            sync_debounce_secs: default_sync_debounce_secs(),
            sync_base_delay_secs: default_sync_base_delay_secs(),
            sync_max_attempts: default_sync_max_attempts(),
        }
    }
}

impl QueueConfig {
    pub fn network_retry_delay(&self) -> Duration {
        Duration::from_secs(self.network_retry_delay_secs)
    }

    pub fn sync_debounce(&self) -> Duration {
        Duration::from_secs(self.sync_debounce_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            state_dir: None,
            rate_limit_delay_secs: default_rate_limit_delay_secs(),
            queue: QueueConfig::default(),
            markers: Markers::default(),
        }
    }
}

impl Config {
    /// Loads configuration from a file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => return Err(Error::Config(format!("failed to read config: {}", e))),
        };
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))
    }

    /// Saves configuration to a file, creating its directory.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, content)?;
        Ok(())
    }

    /// Directory holding the database and log.
    pub fn state_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => dir.clone(),
            None => default_state_dir(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.state_dir().join(DB_FILE_NAME)
    }

    pub fn log_path(&self) -> PathBuf {
        self.state_dir().join(LOG_FILE_NAME)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_secs(self.rate_limit_delay_secs)
    }
}

/// Default location of `config.toml`.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
        .join(CONFIG_FILE_NAME)
}

/// Default state directory (`~/.local/state/olsync` on Linux).
pub fn default_state_dir() -> PathBuf {
    dirs::state_dir()
        .or_else(dirs::data_local_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR_NAME)
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
