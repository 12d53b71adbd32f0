// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Stored as TOML. Every field has a default, so an empty file is a valid
//! configuration:
//!
//! ```toml
//! credential_key = "WOBBLEAPI_APIKEY"
//! store_scope = "wobble"
//!
//! [reconnect]
//! base_delay_ms = 100
//! backoff_step_ms = 500
//! max_retry_steps = 10
//! probe_operation = "wobble.api_version"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::store::validate_scope;

/// Directory name under the platform data directory.
const APP_DIR_NAME: &str = "wobble";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Store key holding the credential.
    #[serde(default = "default_credential_key")]
    pub credential_key: String,
    /// Store scope (file stem) for persisted values.
    #[serde(default = "default_store_scope")]
    pub store_scope: String,
    /// Reconnection probing.
    #[serde(default)]
    pub reconnect: ReconnectConfig,
}

/// Backoff and probe settings for the connectivity guard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconnectConfig {
    /// Delay before the first probe (milliseconds).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Extra delay per failed probe (milliseconds).
    #[serde(default = "default_backoff_step_ms")]
    pub backoff_step_ms: u64,
    /// Number of steps after which the delay stops growing.
    #[serde(default = "default_max_retry_steps")]
    pub max_retry_steps: u32,
    /// No-op operation used to test the link.
    #[serde(default = "default_probe_operation")]
    pub probe_operation: String,
}

fn default_credential_key() -> String {
    "WOBBLEAPI_APIKEY".to_string()
}

fn default_store_scope() -> String {
    APP_DIR_NAME.to_string()
}

fn default_base_delay_ms() -> u64 {
    100
}

fn default_backoff_step_ms() -> u64 {
    500
}

fn default_max_retry_steps() -> u32 {
    10
}

fn default_probe_operation() -> String {
    "wobble.api_version".to_string()
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        ReconnectConfig {
            base_delay_ms: default_base_delay_ms(),
            backoff_step_ms: default_backoff_step_ms(),
            max_retry_steps: default_max_retry_steps(),
            probe_operation: default_probe_operation(),
        }
    }
}

impl ReconnectConfig {
    /// Delay before the first probe.
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }

    /// Extra delay added per failed probe.
    pub fn backoff_step(&self) -> Duration {
        Duration::from_millis(self.backoff_step_ms)
    }

    /// Longest delay between probes.
    pub fn max_delay(&self) -> Duration {
        self.base_delay() + self.backoff_step() * self.max_retry_steps
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            credential_key: default_credential_key(),
            store_scope: default_store_scope(),
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Parses configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Loads configuration, falling back to defaults when the file is missing.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Saves configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Checks values that would make the client unusable.
    pub fn validate(&self) -> Result<()> {
        if self.credential_key.trim().is_empty() {
            return Err(Error::Config("credential_key must not be empty".to_string()));
        }
        if !validate_scope(&self.store_scope) {
            return Err(Error::InvalidScope(self.store_scope.clone()));
        }
        if self.reconnect.probe_operation.trim().is_empty() {
            return Err(Error::Config("reconnect.probe_operation must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Default directory for persisted client state.
///
/// Resolution order:
/// 1. `$WOBBLE_STATE_DIR` if set
/// 2. `<platform data-local dir>/wobble`
/// 3. `./.wobble` when no data directory is known
pub fn default_store_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("WOBBLE_STATE_DIR") {
        if !dir.is_empty() {
            return PathBuf::from(dir);
        }
    }
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from(".wobble"))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
