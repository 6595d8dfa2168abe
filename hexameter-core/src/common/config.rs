/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::message::{HexameterError, DEFAULT_PORT};

/// Configuration for a Hexameter context.
///
/// Values are loaded from TOML and handed to the context explicitly at init time;
/// nothing reads a process-wide configuration behind the caller's back.
///
/// # Example Configuration File
///
/// ```toml
/// [transport]
/// default_port = 55555
/// socket_cache = 10
/// recv_tries = 100000
/// inbox_capacity = 255
/// header = "json"
///
/// [correlation]
/// policy = "retain"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HexameterConfig {
    /// Transport configuration.
    pub transport: TransportConfig,
    /// Request/response correlation configuration.
    pub correlation: CorrelationConfig,
}

/// Transport-related configuration values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Port used for addresses without a `:port` suffix.
    pub default_port: u16,
    /// Maximum number of cached outbound connections. `0` disables the cache.
    pub socket_cache: usize,
    /// Poll attempts used by `respond_default`.
    pub recv_tries: usize,
    /// Capacity of the inbound message queue filled by the listener.
    pub inbox_capacity: usize,
    /// Tag written before the blank line that precedes the JSON envelope.
    pub header: String,
}

/// Correlation-related configuration values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// What happens to an answered correlation entry once it has been read.
    pub policy: CorrelationPolicy,
}

/// Lifetime of answered `net.lust` registrations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationPolicy {
    /// Entries are never removed; repeated reads return the accumulated answer.
    #[default]
    Retain,
    /// Answered entries are removed when read; a repeated read yields nothing.
    Consume,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            default_port: DEFAULT_PORT,
            socket_cache: 10,
            recv_tries: 100_000,
            inbox_capacity: 255,
            header: "json".to_string(),
        }
    }
}

impl HexameterConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, HexameterError> {
        toml::from_str(text).map_err(|e| HexameterError::Serialization(e.to_string()))
    }

    /// Reads and parses a configuration file.
    pub fn load_from(path: &Path) -> Result<Self, HexameterError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Loads `hexameter/config.toml` from the XDG configuration directories.
    ///
    /// Returns the defaults when no file exists. A file that cannot be read or parsed
    /// is logged and also yields the defaults.
    pub fn load() -> Self {
        let xdg_dirs = match xdg::BaseDirectories::with_prefix("hexameter") {
            Ok(dirs) => dirs,
            Err(e) => {
                error!("Failed to initialize XDG directories: {}", e);
                return Self::default();
            }
        };

        let Some(path) = xdg_dirs.find_config_file("config.toml") else {
            info!("No configuration file found, using defaults");
            return Self::default();
        };

        info!("Loading configuration from: {}", path.display());
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load configuration file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
