//! TOML Configuration File Support
//!
//! This module provides static configuration for Sage, supporting a TOML
//! configuration file at `~/.config/sage/config.toml`.
//!
//! The assistant base URL and the identity-provider client id are fixed
//! values: they ship as compiled-in defaults and can be pinned by the config
//! file. They are deliberately not exposed as CLI flags or environment
//! variables.
//!
//! # XDG Base Directory Compliance
//!
//! The configuration file follows the XDG Base Directory specification:
//! - `$XDG_CONFIG_HOME/sage/config.toml` (typically `~/.config/sage/config.toml`)
//!
//! # Example Configuration
//!
//! ```toml
//! [assistant]
//! base_url = "http://127.0.0.1:8000"
//!
//! [identity]
//! client_id = "25036282439-u9ilcglhdef13u5a1b7g54krufmjuetm.apps.googleusercontent.com"
//!
//! [storage]
//! dir = "/home/user/.local/share/sage"
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default base URL of the assistant service.
pub const DEFAULT_ASSISTANT_URL: &str = "http://127.0.0.1:8000";

/// Default client id registered with the identity provider.
pub const DEFAULT_CLIENT_ID: &str =
    "25036282439-u9ilcglhdef13u5a1b7g54krufmjuetm.apps.googleusercontent.com";

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// Failed to parse TOML
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// No usable storage directory could be resolved
    #[error("No data directory available for session storage")]
    NoDataDir,
}

// =============================================================================
// Configuration Source Tracking
// =============================================================================

/// Tracks where the configuration came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Values from the TOML configuration file
    File,
    /// Compiled-in default values
    Default,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "config file"),
            Self::Default => write!(f, "default"),
        }
    }
}

// =============================================================================
// TOML Configuration Structures
// =============================================================================

/// Assistant section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantToml {
    /// Base URL of the assistant service
    pub base_url: Option<String>,
}

/// Identity provider section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityToml {
    /// Client id registered with the identity provider
    pub client_id: Option<String>,
}

/// Storage section of the TOML configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageToml {
    /// Directory holding the persisted session entries
    pub dir: Option<PathBuf>,
}

/// Top-level TOML configuration structure
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SageToml {
    /// Assistant configuration section
    pub assistant: AssistantToml,

    /// Identity provider configuration section
    pub identity: IdentityToml,

    /// Storage configuration section
    pub storage: StorageToml,
}

// =============================================================================
// Main Configuration Struct
// =============================================================================

/// Static configuration for Sage
///
/// Use [`Config::load`] to resolve defaults against the optional config
/// file. All values are fixed for the lifetime of the process.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the assistant service (requests go to `{base}/ask`)
    pub assistant_url: String,

    /// Client id handed to the identity provider during initialization
    pub client_id: String,

    /// Directory holding the persisted session entries
    pub storage_dir: PathBuf,

    /// Path to the config file that was loaded (if any)
    pub config_file_path: Option<PathBuf>,

    /// Source of configuration values
    source: ConfigSource,
}

impl Config {
    /// Load configuration from the default config file location
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed, or
    /// if no storage directory can be resolved. A missing config file is not
    /// an error (defaults are used).
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(default_config_path())
    }

    /// Load configuration from a specific path
    ///
    /// # Arguments
    ///
    /// * `path` - Optional path to the configuration file. If `None`, only
    ///   defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if the specified config file cannot be read or
    /// parsed, or if no storage directory can be resolved.
    pub fn load_from(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut assistant_url = DEFAULT_ASSISTANT_URL.to_string();
        let mut client_id = DEFAULT_CLIENT_ID.to_string();
        let mut storage_dir = default_storage_dir();
        let mut config_file_path = None;
        let mut source = ConfigSource::Default;

        // Try to load from file
        if let Some(ref config_path) = path {
            if config_path.exists() {
                let toml_content =
                    std::fs::read_to_string(config_path).map_err(|e| ConfigError::ReadError {
                        path: config_path.clone(),
                        source: e,
                    })?;

                let toml_config: SageToml = toml::from_str(&toml_content)?;
                if let Some(url) = toml_config.assistant.base_url {
                    assistant_url = url;
                }
                if let Some(id) = toml_config.identity.client_id {
                    client_id = id;
                }
                if toml_config.storage.dir.is_some() {
                    storage_dir = toml_config.storage.dir;
                }
                config_file_path = Some(config_path.clone());
                source = ConfigSource::File;

                tracing::info!(
                    path = %config_path.display(),
                    "Loaded configuration from file"
                );
            } else {
                tracing::debug!(
                    path = %config_path.display(),
                    "Config file not found, using defaults"
                );
            }
        }

        let storage_dir = storage_dir.ok_or(ConfigError::NoDataDir)?;

        Ok(Self {
            assistant_url,
            client_id,
            storage_dir,
            config_file_path,
            source,
        })
    }

    /// Get the source of this configuration
    #[must_use]
    pub fn source(&self) -> ConfigSource {
        self.source
    }
}

/// Get the default configuration file path
///
/// Returns `$XDG_CONFIG_HOME/sage/config.toml` or `~/.config/sage/config.toml`
/// if `XDG_CONFIG_HOME` is not set.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("sage").join("config.toml"))
}

/// Get the default storage directory for persisted session entries
///
/// Returns `$XDG_DATA_HOME/sage` or `~/.local/share/sage` if `XDG_DATA_HOME`
/// is not set.
#[must_use]
pub fn default_storage_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("sage"))
}

// =============================================================================
// Tests
// =============================================================================
