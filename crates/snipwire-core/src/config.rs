//! # Shop Configuration
//!
//! Typed, immutable view over the merchant's module configuration.
//!
//! ## Configuration Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Host storage (CMS module config, TOML file, ...)                      │
//! │       │                                                                 │
//! │       │  ConfigStore::get("SnipWire", "currencies")                     │
//! │       ▼                                                                 │
//! │  ShopConfig::from_store ──► ShopConfig (read-only, cheap to clone)      │
//! │       │                                                                 │
//! │       ├──► ProductAttributeBuilder                                      │
//! │       ├──► formatted_product_price                                      │
//! │       └──► render_anchor / render_resources                             │
//! │                                                                         │
//! │  A config change means building a new ShopConfig, never editing one.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};

/// Module name under which all settings are stored.
pub const MODULE_NAME: &str = "SnipWire";

/// Template that marks a page as a product when nothing else is configured.
pub const DEFAULT_PRODUCT_TEMPLATE: &str = "snipcart-product";

/// Config keys read by [`ShopConfig::from_store`] and [`Catalog::load`].
pub mod keys {
    pub const CURRENCIES: &str = "currencies";
    pub const CURRENCY_DEFINITIONS: &str = "currency_definitions";
    pub const TAXES: &str = "taxes";
    pub const TAXES_INCLUDED: &str = "taxes_included";
    pub const PRODUCT_TEMPLATES: &str = "product_templates";
    pub const PRODUCT_NAME_FIELD: &str = "product_name_field";
    pub const PRODUCT_CATEGORIES_FIELD: &str = "product_categories_field";
    pub const SINGLE_PAGE_SHOP_URL: &str = "single_page_shop_url";
    pub const CART_IMAGE_WIDTH: &str = "cart_image_width";
    pub const CART_IMAGE_HEIGHT: &str = "cart_image_height";
    pub const CART_IMAGE_CROPPING: &str = "cart_image_cropping";
    pub const CART_IMAGE_QUALITY: &str = "cart_image_quality";
    pub const CART_IMAGE_HIDPI: &str = "cart_image_hidpi";
    pub const CART_IMAGE_HIDPI_QUALITY: &str = "cart_image_hidpi_quality";
    pub const API_KEY: &str = "api_key";
    pub const API_KEY_TEST: &str = "api_key_test";
    pub const ENVIRONMENT: &str = "snipcart_environment";
    pub const SNIPCART_VERSION: &str = "snipcart_version";
    pub const INCLUDE_SNIPCART_CSS: &str = "include_snipcart_css";
    pub const ADD_PRODUCT_BEHAVIOR: &str = "add_product_behavior";
}

// =============================================================================
// Config Store
// =============================================================================

/// Read access to the host's module configuration.
///
/// Values are loosely typed JSON; [`ShopConfig`] does the typing. Returning
/// `None` means "not configured" and always selects the documented default.
pub trait ConfigStore {
    fn get(&self, module: &str, key: &str) -> Option<Value>;
}

impl<T: ConfigStore + ?Sized> ConfigStore for &T {
    fn get(&self, module: &str, key: &str) -> Option<Value> {
        (**self).get(module, key)
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    fn get(&self, module: &str, key: &str) -> Option<Value> {
        (**self).get(module, key)
    }
}

/// In-memory store, one JSON object per module.
///
/// ## Example
/// ```rust
/// use snipwire_core::config::{ConfigStore, MemoryConfigStore, MODULE_NAME};
///
/// let store = MemoryConfigStore::new()
///     .with(MODULE_NAME, "currencies", serde_json::json!(["eur", "usd"]));
/// assert!(store.get(MODULE_NAME, "currencies").is_some());
/// assert!(store.get(MODULE_NAME, "taxes").is_none());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryConfigStore {
    modules: BTreeMap<String, Map<String, Value>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`MemoryConfigStore::set`].
    pub fn with(mut self, module: &str, key: &str, value: Value) -> Self {
        self.set(module, key, value);
        self
    }

    pub fn set(&mut self, module: &str, key: &str, value: Value) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(key.to_string(), value);
    }

    pub fn remove(&mut self, module: &str, key: &str) -> Option<Value> {
        self.modules.get_mut(module)?.remove(key)
    }

    /// All settings of one module.
    pub fn module(&self, module: &str) -> Option<&Map<String, Value>> {
        self.modules.get(module)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn get(&self, module: &str, key: &str) -> Option<Value> {
        self.modules.get(module)?.get(key).cloned()
    }
}

// =============================================================================
// Value Readers
// =============================================================================

/// Reads a decimal from a JSON number or numeric text.
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    let text = match value {
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.trim().to_string(),
        _ => return None,
    };
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .ok()
}

/// Reads a boolean; the host stores checkboxes as `1`/`0` or `"1"`/`""`.
pub fn bool_from_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "1" | "true" | "on" | "yes" => Some(true),
            "" | "0" | "false" | "off" | "no" => Some(false),
            _ => None,
        },
        Value::Null => Some(false),
        _ => None,
    }
}

/// Reads a list from a JSON array or a comma separated string.
pub fn list_from_value(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.trim().to_string()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })
                .filter(|s| !s.is_empty())
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(|part| part.trim().to_string())
                .filter(|part| !part.is_empty())
                .collect(),
        ),
        _ => None,
    }
}

/// Deserializes a list of records stored either as a JSON array or as a
/// JSON document inside a string (how the module config UI saves them).
pub fn records_from_value<T: DeserializeOwned>(key: &str, value: Value) -> CoreResult<Vec<T>> {
    let value = match value {
        Value::String(s) if s.trim().is_empty() => return Ok(Vec::new()),
        Value::String(s) => serde_json::from_str(&s)
            .map_err(|e| CoreError::invalid_config(key, e.to_string()))?,
        Value::Null => return Ok(Vec::new()),
        other => other,
    };
    serde_json::from_value(value).map_err(|e| CoreError::invalid_config(key, e.to_string()))
}

fn read_string(store: &dyn ConfigStore, key: &str) -> Option<String> {
    match store.get(MODULE_NAME, key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_bool(store: &dyn ConfigStore, key: &str, default: bool) -> CoreResult<bool> {
    match store.get(MODULE_NAME, key) {
        None => Ok(default),
        Some(value) => bool_from_value(&value)
            .ok_or_else(|| CoreError::invalid_config(key, format!("expected a boolean, got {value}"))),
    }
}

fn read_u32(store: &dyn ConfigStore, key: &str, default: u32) -> CoreResult<u32> {
    match store.get(MODULE_NAME, key) {
        None | Some(Value::Null) => Ok(default),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(default),
        Some(value) => decimal_from_value(&value)
            .filter(|d| d.fract().is_zero() && !d.is_sign_negative())
            .and_then(|d| d.to_u32())
            .ok_or_else(|| {
                CoreError::invalid_config(key, format!("expected a non-negative integer, got {value}"))
            }),
    }
}

fn read_list(store: &dyn ConfigStore, key: &str) -> CoreResult<Option<Vec<String>>> {
    match store.get(MODULE_NAME, key) {
        None => Ok(None),
        Some(value) => list_from_value(&value)
            .map(Some)
            .ok_or_else(|| CoreError::invalid_config(key, format!("expected a list, got {value}"))),
    }
}

// =============================================================================
// Thumbnail Settings
// =============================================================================

/// Sizing of the product image shown in the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThumbnailSpec {
    pub width: u32,
    pub height: u32,
    pub crop: bool,
    pub quality: u32,
    /// Render a double-density variant for retina screens.
    pub hidpi: bool,
    pub hidpi_quality: u32,
}

impl Default for ThumbnailSpec {
    fn default() -> Self {
        ThumbnailSpec {
            width: 65,
            height: 65,
            crop: true,
            quality: 70,
            hidpi: true,
            hidpi_quality: 50,
        }
    }
}

impl ThumbnailSpec {
    fn from_store(store: &dyn ConfigStore) -> CoreResult<Self> {
        let defaults = ThumbnailSpec::default();
        Ok(ThumbnailSpec {
            width: read_u32(store, keys::CART_IMAGE_WIDTH, defaults.width)?,
            height: read_u32(store, keys::CART_IMAGE_HEIGHT, defaults.height)?,
            crop: read_bool(store, keys::CART_IMAGE_CROPPING, defaults.crop)?,
            quality: read_u32(store, keys::CART_IMAGE_QUALITY, defaults.quality)?.min(100),
            hidpi: read_bool(store, keys::CART_IMAGE_HIDPI, defaults.hidpi)?,
            hidpi_quality: read_u32(store, keys::CART_IMAGE_HIDPI_QUALITY, defaults.hidpi_quality)?
                .min(100),
        })
    }
}

// =============================================================================
// API Settings
// =============================================================================

/// Which Snipcart environment the storefront talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Environment {
    /// Test mode: orders are not charged.
    #[default]
    Test,
    Live,
}

impl FromStr for Environment {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "test" | "testing" | "0" | "" => Ok(Environment::Test),
            "live" | "production" | "1" => Ok(Environment::Live),
            other => Err(CoreError::invalid_config(
                keys::ENVIRONMENT,
                format!("unknown environment '{other}', expected test or live"),
            )),
        }
    }
}

/// Settings for the client-side script include.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Public API key for the live environment.
    pub api_key: Option<String>,
    /// Public API key for the test environment.
    pub api_key_test: Option<String>,
    pub environment: Environment,
    /// Snipcart theme version, e.g. `3.0`.
    pub version: String,
    pub include_css: bool,
    /// `data-config-add-product-behavior`, e.g. `none` to keep the cart closed.
    pub add_product_behavior: Option<String>,
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            api_key: None,
            api_key_test: None,
            environment: Environment::Test,
            version: "3.0".to_string(),
            include_css: true,
            add_product_behavior: None,
        }
    }
}

impl ApiSettings {
    fn from_store(store: &dyn ConfigStore) -> CoreResult<Self> {
        let defaults = ApiSettings::default();
        let environment = match read_string(store, keys::ENVIRONMENT) {
            Some(raw) => raw.parse()?,
            None => match store.get(MODULE_NAME, keys::ENVIRONMENT) {
                Some(Value::Bool(true)) => Environment::Live,
                _ => defaults.environment,
            },
        };

        Ok(ApiSettings {
            api_key: read_string(store, keys::API_KEY),
            api_key_test: read_string(store, keys::API_KEY_TEST),
            environment,
            version: read_string(store, keys::SNIPCART_VERSION).unwrap_or(defaults.version),
            include_css: read_bool(store, keys::INCLUDE_SNIPCART_CSS, defaults.include_css)?,
            add_product_behavior: read_string(store, keys::ADD_PRODUCT_BEHAVIOR),
        })
    }

    /// The public key for the active environment.
    pub fn active_key(&self) -> Option<&str> {
        match self.environment {
            Environment::Test => self.api_key_test.as_deref(),
            Environment::Live => self.api_key.as_deref(),
        }
    }
}

// =============================================================================
// Shop Config
// =============================================================================

/// Everything the render paths need, resolved once from a [`ConfigStore`].
#[derive(Debug, Clone)]
pub struct ShopConfig {
    /// Currency formats and taxes, shared process-wide.
    pub catalog: Arc<Catalog>,

    /// Selected currency codes; the first one is the default display currency.
    pub currencies: Vec<String>,

    /// Prices are entered with taxes included.
    pub taxes_included: bool,

    /// Templates whose pages are products.
    pub product_templates: Vec<String>,

    /// Field holding the product name; `title` when unset.
    pub name_field: Option<String>,

    /// Field holding the product categories.
    pub categories_field: Option<String>,

    pub thumbnail: ThumbnailSpec,

    /// When set, every product links to this one listing page.
    pub single_page_shop_url: Option<String>,

    pub api: ApiSettings,
}

impl ShopConfig {
    /// Builds the shop config using the process-wide memoized catalog.
    pub fn from_store(store: &dyn ConfigStore) -> CoreResult<Self> {
        Self::build(store, Catalog::shared(store))
    }

    /// Builds the shop config around an explicit catalog.
    pub fn build(store: &dyn ConfigStore, catalog: Arc<Catalog>) -> CoreResult<Self> {
        let currencies: Vec<String> = read_list(store, keys::CURRENCIES)?
            .unwrap_or_default()
            .into_iter()
            .map(|code| code.to_lowercase())
            .collect();
        let currencies = if currencies.is_empty() {
            vec![catalog.currencies.default_code().to_string()]
        } else {
            currencies
        };

        for code in &currencies {
            if catalog.currencies.get(code).is_none() {
                warn!(currency = %code, "Selected currency has no format definition");
            }
        }

        let product_templates = read_list(store, keys::PRODUCT_TEMPLATES)?
            .filter(|templates| !templates.is_empty())
            .unwrap_or_else(|| vec![DEFAULT_PRODUCT_TEMPLATE.to_string()]);

        let config = ShopConfig {
            catalog,
            currencies,
            taxes_included: read_bool(store, keys::TAXES_INCLUDED, false)?,
            product_templates,
            name_field: read_string(store, keys::PRODUCT_NAME_FIELD),
            categories_field: read_string(store, keys::PRODUCT_CATEGORIES_FIELD),
            thumbnail: ThumbnailSpec::from_store(store)?,
            single_page_shop_url: read_string(store, keys::SINGLE_PAGE_SHOP_URL),
            api: ApiSettings::from_store(store)?,
        };

        debug!(
            currencies = ?config.currencies,
            templates = ?config.product_templates,
            "Shop config built"
        );
        Ok(config)
    }

    /// The currency prices are shown in unless the caller asks for another.
    pub fn default_currency(&self) -> &str {
        self.currencies
            .first()
            .map(String::as_str)
            .unwrap_or_else(|| self.catalog.currencies.default_code())
    }

    /// More than one currency selected: prices travel as a JSON map.
    pub fn is_multi_currency(&self) -> bool {
        self.currencies.len() > 1
    }

    /// Whether pages with this template get checkout markup.
    pub fn is_product_template(&self, template: &str) -> bool {
        self.product_templates.iter().any(|t| t == template)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn build(store: &MemoryConfigStore) -> ShopConfig {
        let catalog = Catalog::load(store).unwrap();
        ShopConfig::build(store, Arc::new(catalog)).unwrap()
    }

    #[test]
    fn test_defaults_for_empty_store() {
        let config = build(&MemoryConfigStore::new());
        assert_eq!(config.currencies, vec!["eur"]);
        assert_eq!(config.default_currency(), "eur");
        assert!(!config.is_multi_currency());
        assert!(!config.taxes_included);
        assert_eq!(config.product_templates, vec![DEFAULT_PRODUCT_TEMPLATE]);
        assert_eq!(config.thumbnail, ThumbnailSpec::default());
        assert_eq!(config.api.environment, Environment::Test);
        assert_eq!(config.api.version, "3.0");
        assert!(config.single_page_shop_url.is_none());
    }

    #[test]
    fn test_reads_configured_values() {
        let store = MemoryConfigStore::new()
            .with(MODULE_NAME, keys::CURRENCIES, json!(["EUR", "usd"]))
            .with(MODULE_NAME, keys::TAXES_INCLUDED, json!(1))
            .with(MODULE_NAME, keys::PRODUCT_TEMPLATES, json!("product, bundle"))
            .with(MODULE_NAME, keys::PRODUCT_NAME_FIELD, json!("headline"))
            .with(MODULE_NAME, keys::CART_IMAGE_WIDTH, json!("120"))
            .with(MODULE_NAME, keys::CART_IMAGE_CROPPING, json!(""))
            .with(MODULE_NAME, keys::ENVIRONMENT, json!("live"))
            .with(MODULE_NAME, keys::API_KEY, json!("pk_live"));
        let config = build(&store);

        assert_eq!(config.currencies, vec!["eur", "usd"]);
        assert!(config.is_multi_currency());
        assert!(config.taxes_included);
        assert!(config.is_product_template("bundle"));
        assert!(!config.is_product_template("basic-page"));
        assert_eq!(config.name_field.as_deref(), Some("headline"));
        assert_eq!(config.thumbnail.width, 120);
        assert!(!config.thumbnail.crop);
        assert_eq!(config.api.active_key(), Some("pk_live"));
    }

    #[test]
    fn test_invalid_values_are_errors() {
        let store = MemoryConfigStore::new().with(MODULE_NAME, keys::TAXES_INCLUDED, json!("maybe"));
        let catalog = Arc::new(Catalog::default());
        assert!(matches!(
            ShopConfig::build(&store, catalog.clone()),
            Err(CoreError::InvalidConfig { .. })
        ));

        let store = MemoryConfigStore::new().with(MODULE_NAME, keys::CART_IMAGE_HEIGHT, json!(-5));
        assert!(ShopConfig::build(&store, catalog.clone()).is_err());

        let store = MemoryConfigStore::new().with(MODULE_NAME, keys::ENVIRONMENT, json!("staging"));
        assert!(ShopConfig::build(&store, catalog).is_err());
    }

    #[test]
    fn test_value_readers() {
        assert_eq!(decimal_from_value(&json!(0.2)), Some(dec!(0.2)));
        assert_eq!(decimal_from_value(&json!(" 19.99 ")), Some(dec!(19.99)));
        assert_eq!(decimal_from_value(&json!(true)), None);

        assert_eq!(bool_from_value(&json!("1")), Some(true));
        assert_eq!(bool_from_value(&json!(0)), Some(false));
        assert_eq!(bool_from_value(&json!("")), Some(false));
        assert_eq!(bool_from_value(&json!("sometimes")), None);

        assert_eq!(
            list_from_value(&json!("a, b,,c")),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string()])
        );
        assert_eq!(list_from_value(&json!({})), None);
    }

    #[test]
    fn test_records_from_json_string() {
        let value = json!(r#"[{"name":"vat","rate":0.2}]"#);
        let taxes: Vec<crate::tax::TaxDefinition> = records_from_value(keys::TAXES, value).unwrap();
        assert_eq!(taxes.len(), 1);
        assert_eq!(taxes[0].rate.fraction(), dec!(0.2));

        let empty: Vec<crate::tax::TaxDefinition> =
            records_from_value(keys::TAXES, json!("")).unwrap();
        assert!(empty.is_empty());

        let bad: CoreResult<Vec<crate::tax::TaxDefinition>> =
            records_from_value(keys::TAXES, json!("{not json"));
        assert!(bad.is_err());
    }
}
