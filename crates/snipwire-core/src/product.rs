//! # Product Attributes
//!
//! Assembles the `data-item-*` attributes the checkout script reads from an
//! add-to-cart element.
//!
//! ## Assembly Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  template in allow-list? ── no ──► (nothing)                            │
//! │        │ yes                                                            │
//! │        ▼                                                                │
//! │  always:    name, id, price, url                                        │
//! │  if set:    description, image, categories                              │
//! │  always:    metadata (JSON)                                             │
//! │  if > 0:    weight, width, length, height                               │
//! │  always:    quantity (1 when unset)                                     │
//! │  if > 0:    max-quantity, min-quantity, quantity-step                   │
//! │  always:    stackable, taxable  ("true" when field undefined)           │
//! │  if set:    taxes                                                       │
//! │  if shop:   has-taxes-included                                          │
//! │  always:    shippable           ("true" when field undefined)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Attribute names are part of the checkout service's contract and must not
//! change.

use rust_decimal::prelude::ToPrimitive;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::ShopConfig;
use crate::currency::Price;
use crate::pricing::product_price;
use crate::types::ContentRecord;
use crate::validation::{validate_quantity_rules, validate_sku};

/// Page field names the builder reads.
pub mod fields {
    pub const TITLE: &str = "title";
    pub const ID: &str = "snipcart_item_id";
    /// Followed by the lowercase currency code, e.g. `snipcart_item_price_eur`.
    pub const PRICE_PREFIX: &str = "snipcart_item_price_";
    pub const DESCRIPTION: &str = "snipcart_item_description";
    pub const IMAGE: &str = "snipcart_item_image";
    pub const WEIGHT: &str = "snipcart_item_weight";
    pub const WIDTH: &str = "snipcart_item_width";
    pub const LENGTH: &str = "snipcart_item_length";
    pub const HEIGHT: &str = "snipcart_item_height";
    pub const QUANTITY: &str = "snipcart_item_quantity";
    pub const MAX_QUANTITY: &str = "snipcart_item_max_quantity";
    pub const MIN_QUANTITY: &str = "snipcart_item_min_quantity";
    pub const QUANTITY_STEP: &str = "snipcart_item_quantity_step";
    pub const STACKABLE: &str = "snipcart_item_stackable";
    pub const TAXABLE: &str = "snipcart_item_taxable";
    pub const TAXES: &str = "snipcart_item_taxes";
    pub const SHIPPABLE: &str = "snipcart_item_shippable";

    /// Price field for a currency code.
    pub fn price(code: &str) -> String {
        format!("{PRICE_PREFIX}{}", code.to_lowercase())
    }
}

/// Attribute names of the checkout service.
pub mod attrs {
    pub const NAME: &str = "data-item-name";
    pub const ID: &str = "data-item-id";
    pub const PRICE: &str = "data-item-price";
    pub const URL: &str = "data-item-url";
    pub const DESCRIPTION: &str = "data-item-description";
    pub const IMAGE: &str = "data-item-image";
    pub const CATEGORIES: &str = "data-item-categories";
    pub const METADATA: &str = "data-item-metadata";
    pub const WEIGHT: &str = "data-item-weight";
    pub const WIDTH: &str = "data-item-width";
    pub const LENGTH: &str = "data-item-length";
    pub const HEIGHT: &str = "data-item-height";
    pub const QUANTITY: &str = "data-item-quantity";
    pub const MAX_QUANTITY: &str = "data-item-max-quantity";
    pub const MIN_QUANTITY: &str = "data-item-min-quantity";
    pub const QUANTITY_STEP: &str = "data-item-quantity-step";
    pub const STACKABLE: &str = "data-item-stackable";
    pub const TAXABLE: &str = "data-item-taxable";
    pub const TAXES: &str = "data-item-taxes";
    pub const HAS_TAXES_INCLUDED: &str = "data-item-has-taxes-included";
    pub const SHIPPABLE: &str = "data-item-shippable";
}

// =============================================================================
// Item Attributes
// =============================================================================

/// Ordered `(name, value)` pairs for one product.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemAttributes(Vec<(&'static str, String)>);

impl ItemAttributes {
    fn push(&mut self, name: &'static str, value: impl Into<String>) {
        self.0.push((name, value.into()));
    }

    /// Value of an attribute, if emitted.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Attribute names in emission order.
    pub fn names(&self) -> Vec<&'static str> {
        self.0.iter().map(|(n, _)| *n).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(n, v)| (*n, v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builds checkout attributes for product pages of one shop.
#[derive(Debug, Clone, Copy)]
pub struct ProductAttributeBuilder<'a> {
    shop: &'a ShopConfig,
}

impl<'a> ProductAttributeBuilder<'a> {
    pub fn new(shop: &'a ShopConfig) -> Self {
        ProductAttributeBuilder { shop }
    }

    /// Builds the attribute set; empty for pages that are not products.
    pub fn build(&self, record: &dyn ContentRecord) -> ItemAttributes {
        let mut out = ItemAttributes::default();

        if !self.shop.is_product_template(record.template()) {
            debug!(template = %record.template(), "Not a product template, no checkout attributes");
            return out;
        }

        let meta = record.meta();

        out.push(attrs::NAME, self.name(record));
        out.push(attrs::ID, self.sku(record, meta.id));
        out.push(attrs::PRICE, self.price(record));
        out.push(
            attrs::URL,
            self.shop
                .single_page_shop_url
                .clone()
                .unwrap_or_else(|| record.url()),
        );

        if let Some(description) = record.text(fields::DESCRIPTION) {
            out.push(attrs::DESCRIPTION, description);
        }
        if let Some(image) = record.thumbnail(fields::IMAGE, &self.shop.thumbnail) {
            out.push(attrs::IMAGE, image);
        }
        if let Some(categories) = self.categories(record) {
            out.push(attrs::CATEGORIES, categories);
        }

        match serde_json::to_string(&meta) {
            Ok(blob) => out.push(attrs::METADATA, blob),
            Err(e) => warn!(page = meta.id, "Cannot encode item metadata: {}", e),
        }

        for (field, attr) in [
            (fields::WEIGHT, attrs::WEIGHT),
            (fields::WIDTH, attrs::WIDTH),
            (fields::LENGTH, attrs::LENGTH),
            (fields::HEIGHT, attrs::HEIGHT),
        ] {
            if let Some(value) = positive_number(record, field) {
                out.push(attr, value);
            }
        }

        let quantity = positive_integer(record, fields::QUANTITY).unwrap_or(1);
        let max = positive_integer(record, fields::MAX_QUANTITY);
        let min = positive_integer(record, fields::MIN_QUANTITY);
        let step = positive_integer(record, fields::QUANTITY_STEP);
        if let Err(e) = validate_quantity_rules(quantity, min, max, step) {
            warn!(page = meta.id, "Inconsistent quantity rules: {}", e);
        }

        out.push(attrs::QUANTITY, quantity.to_string());
        for (attr, value) in [
            (attrs::MAX_QUANTITY, max),
            (attrs::MIN_QUANTITY, min),
            (attrs::QUANTITY_STEP, step),
        ] {
            if let Some(value) = value {
                out.push(attr, value.to_string());
            }
        }

        out.push(attrs::STACKABLE, bool_text(record.flag(fields::STACKABLE).unwrap_or(true)));
        out.push(attrs::TAXABLE, bool_text(record.flag(fields::TAXABLE).unwrap_or(true)));

        if let Some(tax) = self.tax(record) {
            out.push(attrs::TAXES, tax);
        }
        if self.shop.taxes_included {
            out.push(attrs::HAS_TAXES_INCLUDED, "true");
        }

        out.push(attrs::SHIPPABLE, bool_text(record.flag(fields::SHIPPABLE).unwrap_or(true)));

        out
    }

    /// Configured name field, else the page title.
    fn name(&self, record: &dyn ContentRecord) -> String {
        self.shop
            .name_field
            .as_deref()
            .and_then(|field| record.text(field))
            .or_else(|| record.text(fields::TITLE))
            .unwrap_or_default()
    }

    /// Page SKU; pages without a usable SKU are identified by page id.
    fn sku(&self, record: &dyn ContentRecord, page_id: u64) -> String {
        match record.text(fields::ID) {
            Some(sku) if validate_sku(&sku).is_ok() => sku,
            Some(sku) => {
                warn!(page = page_id, sku = %sku, "Invalid SKU, using page id");
                page_id.to_string()
            }
            None => page_id.to_string(),
        }
    }

    /// Bare number for one currency, JSON object for several.
    fn price(&self, record: &dyn ContentRecord) -> String {
        match product_price(record, self.shop) {
            Price::Single(amount) => amount.to_string(),
            Price::PerCurrency(entries) => {
                let map: Map<String, Value> = entries
                    .into_iter()
                    .map(|(code, amount)| (code, amount.to_json_number()))
                    .collect();
                Value::Object(map).to_string()
            }
        }
    }

    fn categories(&self, record: &dyn ContentRecord) -> Option<String> {
        let field = self.shop.categories_field.as_deref()?;
        let categories = record.get(field)?.as_list();
        (!categories.is_empty()).then(|| categories.join(","))
    }

    /// The product's tax name; only one tax per item is supported.
    fn tax(&self, record: &dyn ContentRecord) -> Option<String> {
        let name = record.get(fields::TAXES)?.as_list().into_iter().next()?;
        if self.shop.catalog.taxes.get(&name).is_none() {
            warn!(tax = %name, "Product references an unconfigured tax");
        }
        Some(name)
    }
}

fn bool_text(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// Numeric field as normalized text, when greater than zero.
fn positive_number(record: &dyn ContentRecord, field: &str) -> Option<String> {
    record
        .decimal(field)
        .filter(|d| d.is_sign_positive() && !d.is_zero())
        .map(|d| d.normalize().to_string())
}

/// Integer field, when greater than zero.
fn positive_integer(record: &dyn ContentRecord, field: &str) -> Option<i64> {
    record
        .decimal(field)
        .and_then(|d| d.trunc().to_i64())
        .filter(|n| *n > 0)
}

// =============================================================================
// Unit Tests
// =============================================================================
