//! # File Config Store
//!
//! Module settings kept in a TOML file, one table per module.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     SNIPWIRE_ENVIRONMENT=live                                          │
//! │     SNIPWIRE_CURRENCIES=eur,usd                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/snipwire/snipwire.toml (Linux)                           │
//! │     ~/Library/Application Support/com.snipwire.snipwire/... (macOS)   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     built into snipwire-core (EUR, 20% VAT, 65x65 thumbnails)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [SnipWire]
//! currencies = ["eur", "usd"]
//! taxes_included = true
//! product_templates = ["snipcart-product"]
//! api_key_test = "pk_test_..."
//!
//! [[SnipWire.currency_definitions]]
//! currency = "eur"
//! precision = 2
//! decimalSeparator = ","
//! thousandSeparator = "."
//! numberFormat = "%s %v"
//! negativeNumberFormat = "-%s %v"
//! currencySymbol = "€"
//!
//! [[SnipWire.taxes]]
//! name = "vat-20"
//! numberForInvoice = "20% VAT"
//! rate = 0.2
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use snipwire_core::config::{bool_from_value, keys, ConfigStore, Environment, MODULE_NAME};
use snipwire_core::{Catalog, ShopConfig};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult};

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "snipwire.toml";

/// Environment variables that override file settings, and the key each sets.
pub const ENV_OVERRIDES: [(&str, &str); 5] = [
    ("SNIPWIRE_API_KEY", keys::API_KEY),
    ("SNIPWIRE_API_KEY_TEST", keys::API_KEY_TEST),
    ("SNIPWIRE_ENVIRONMENT", keys::ENVIRONMENT),
    ("SNIPWIRE_CURRENCIES", keys::CURRENCIES),
    ("SNIPWIRE_TAXES_INCLUDED", keys::TAXES_INCLUDED),
];

/// Settings read from a TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileConfigStore {
    modules: BTreeMap<String, Map<String, Value>>,
}

impl FileConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads settings from file and environment.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (snipwire.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut store = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading SnipWire config from file");
                store = Self::read(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        store.apply_env_overrides()?;
        store.validate()?;

        Ok(store)
    }

    /// Loads settings or returns an empty store if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load SnipWire config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses settings from TOML text.
    pub fn from_toml_str(contents: &str) -> ConfigResult<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn read(path: &Path) -> ConfigResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Writes the settings as TOML, creating parent directories.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "SnipWire config saved");
        Ok(())
    }

    /// Checks that the settings produce a usable catalog and shop config.
    pub fn validate(&self) -> ConfigResult<()> {
        let catalog = Catalog::load(self)?;
        ShopConfig::build(self, Arc::new(catalog))?;
        Ok(())
    }

    pub fn set(&mut self, module: &str, key: &str, value: Value) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    /// Applies `SNIPWIRE_*` overrides from the process environment.
    fn apply_env_overrides(&mut self) -> ConfigResult<()> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from any variable source.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        for (var, key) in ENV_OVERRIDES {
            let Some(raw) = lookup(var) else {
                continue;
            };
            let value = override_value(key, &raw)?;
            debug!(variable = var, key = key, "Overriding setting from environment");
            self.set(MODULE_NAME, key, value);
        }
        Ok(())
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "snipwire", "snipwire")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}

impl ConfigStore for FileConfigStore {
    fn get(&self, module: &str, key: &str) -> Option<Value> {
        self.modules.get(module)?.get(key).cloned()
    }
}

/// Typed value for an override; bad values are rejected rather than stored.
fn override_value(key: &str, raw: &str) -> ConfigResult<Value> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        key: key.to_string(),
        reason,
    };

    if key == keys::TAXES_INCLUDED {
        return bool_from_value(&Value::String(raw.to_string()))
            .map(Value::Bool)
            .ok_or_else(|| invalid(format!("expected a boolean, got '{raw}'")));
    }
    if key == keys::ENVIRONMENT {
        raw.parse::<Environment>().map_err(|e| invalid(e.to_string()))?;
    }
    Ok(Value::String(raw.trim().to_string()))
}

// =============================================================================
// Unit Tests
// =============================================================================
