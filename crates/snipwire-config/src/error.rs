//! # Config Error Types
//!
//! ## Error Categories
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  ┌─────────────────┐  ┌─────────────────┐  ┌─────────────────────────┐ │
//! │  │      File       │  │     Format      │  │      Settings           │ │
//! │  │                 │  │                 │  │                         │ │
//! │  │  LoadFailed     │  │  Parse          │  │  InvalidValue           │ │
//! │  │  SaveFailed     │  │  Serialize      │  │  Core (catalog/shop)    │ │
//! │  │  NoConfigPath   │  │                 │  │                         │ │
//! │  └─────────────────┘  └─────────────────┘  └─────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use snipwire_core::CoreError;
use thiserror::Error;

/// Result type alias for config operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // =========================================================================
    // File Errors
    // =========================================================================
    /// Reading the config file failed.
    #[error("Failed to load config: {0}")]
    LoadFailed(String),

    /// Writing the config file failed.
    #[error("Failed to save config: {0}")]
    SaveFailed(String),

    /// No path was given and the platform has no config directory.
    #[error("No config path available")]
    NoConfigPath,

    // =========================================================================
    // Format Errors
    // =========================================================================
    /// The file is not valid TOML or not shaped as module tables.
    #[error("Invalid config file: {0}")]
    Parse(String),

    /// The settings cannot be written as TOML (e.g. a null value).
    #[error("Cannot serialize config: {0}")]
    Serialize(String),

    // =========================================================================
    // Settings Errors
    // =========================================================================
    /// A setting has a value the storefront cannot use.
    ///
    /// ## When This Occurs
    /// - An environment override does not parse (`SNIPWIRE_TAXES_INCLUDED=maybe`)
    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    /// The settings load but fail catalog or shop validation.
    #[error(transparent)]
    Core(#[from] CoreError),
}

// =============================================================================
// Error Conversions
// =============================================================================

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::LoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<toml::ser::Error> for ConfigError {
    fn from(err: toml::ser::Error) -> Self {
        ConfigError::Serialize(err.to_string())
    }
}
