//! # Markup
//!
//! HTML fragments handed back to page templates.
//!
//! ## Rendered Anchor
//! ```text
//! <button class="snipcart-add-item btn"      ← merged class list
//!         data-item-name="Mug"               ← ProductAttributeBuilder order
//!         ...
//!         data-item-shippable="true"
//!         title="Buy now">                   ← merged extra attributes
//!     Add to cart                            ← translated label
//! </button>
//! ```
//!
//! Every attribute value and the label go through `tera::escape_html`.

use tera::escape_html;
use tracing::{debug, warn};

use crate::config::ShopConfig;
use crate::i18n::Translator;
use crate::options::{AnchorKind, AnchorOptions, AnchorOverrides};
use crate::product::ProductAttributeBuilder;
use crate::types::ContentRecord;

const CDN_URL: &str = "https://cdn.snipcart.com";
const APP_URL: &str = "https://app.snipcart.com";

/// Renders the add-to-cart element for a product page.
///
/// Returns an empty string for pages that are not products.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use chrono::{TimeZone, Utc};
/// use snipwire_core::catalog::Catalog;
/// use snipwire_core::config::{MemoryConfigStore, ShopConfig};
/// use snipwire_core::i18n::DefaultTranslator;
/// use snipwire_core::markup::render_anchor;
/// use snipwire_core::options::AnchorOverrides;
/// use snipwire_core::types::{PageMeta, PageRecord};
///
/// let store = MemoryConfigStore::new();
/// let shop = ShopConfig::build(&store, Arc::new(Catalog::default())).unwrap();
/// let meta = PageMeta {
///     id: 1,
///     created: Utc.timestamp_opt(0, 0).unwrap(),
///     modified: Utc.timestamp_opt(0, 0).unwrap(),
///     published: None,
///     created_users_id: 1,
///     modified_users_id: 1,
/// };
/// let page = PageRecord::new(meta, "snipcart-product", "https://shop.example/mug/")
///     .with_value("title", json!("Mug"))
///     .with_value("snipcart_item_price_eur", json!(9.9));
///
/// let html = render_anchor(&page, &shop, AnchorOverrides::new(), &DefaultTranslator);
/// assert!(html.starts_with(r#"<button class="snipcart-add-item" data-item-name="Mug""#));
/// assert!(html.ends_with(">Add to cart</button>"));
/// ```
pub fn render_anchor(
    record: &dyn ContentRecord,
    shop: &ShopConfig,
    overrides: AnchorOverrides,
    translator: &dyn Translator,
) -> String {
    let attrs = ProductAttributeBuilder::new(shop).build(record);
    if attrs.is_empty() {
        return String::new();
    }

    let options = AnchorOptions::defaults(translator).merge(overrides);

    let mut html = String::with_capacity(1024);
    match options.kind {
        AnchorKind::Button => html.push_str("<button"),
        AnchorKind::Link => html.push_str(r##"<a href="#""##),
    }
    push_attribute(&mut html, "class", &options.class_attribute());

    for (name, value) in attrs.iter() {
        push_attribute(&mut html, name, value);
    }
    for (name, value) in &options.attributes {
        if !is_attribute_name(name) {
            warn!(attribute = %name, "Skipping invalid attribute name");
            continue;
        }
        push_attribute(&mut html, name, value);
    }

    html.push('>');
    html.push_str(&escape_html(&options.label));
    html.push_str(match options.kind {
        AnchorKind::Button => "</button>",
        AnchorKind::Link => "</a>",
    });

    debug!(page = record.meta().id, kind = ?options.kind, "Rendered checkout anchor");
    html
}

/// Renders the checkout client resources: preconnect hints, the optional
/// stylesheet, the script and the hidden `#snipcart` container.
///
/// ## Example
/// ```rust
/// use std::sync::Arc;
/// use serde_json::json;
/// use snipwire_core::catalog::Catalog;
/// use snipwire_core::config::{keys, MemoryConfigStore, ShopConfig, MODULE_NAME};
/// use snipwire_core::markup::render_resources;
///
/// let store = MemoryConfigStore::new().with(MODULE_NAME, keys::API_KEY_TEST, json!("pk_test_1"));
/// let shop = ShopConfig::build(&store, Arc::new(Catalog::default())).unwrap();
///
/// let html = render_resources(&shop);
/// assert!(html.contains(r#"data-api-key="pk_test_1""#));
/// assert!(html.contains("/themes/v3.0/default/snipcart.js"));
/// ```
pub fn render_resources(shop: &ShopConfig) -> String {
    let api = &shop.api;
    let theme = format!("{CDN_URL}/themes/v{}/default", escape_html(&api.version));

    let mut lines = vec![
        format!(r#"<link rel="preconnect" href="{APP_URL}">"#),
        format!(r#"<link rel="preconnect" href="{CDN_URL}">"#),
    ];
    if api.include_css {
        lines.push(format!(r#"<link rel="stylesheet" href="{theme}/snipcart.css">"#));
    }
    lines.push(format!(r#"<script async src="{theme}/snipcart.js"></script>"#));

    let key = api.active_key().unwrap_or_else(|| {
        warn!(environment = ?api.environment, "No public API key for the active environment");
        ""
    });

    let mut container = String::from(r#"<div hidden id="snipcart""#);
    push_attribute(&mut container, "data-api-key", key);
    push_attribute(&mut container, "data-currency", shop.default_currency());
    if let Some(behavior) = &api.add_product_behavior {
        push_attribute(&mut container, "data-config-add-product-behavior", behavior);
    }
    container.push_str("></div>");
    lines.push(container);

    lines.join("\n")
}

fn push_attribute(html: &mut String, name: &str, value: &str) {
    html.push(' ');
    html.push_str(name);
    html.push_str("=\"");
    html.push_str(&escape_html(value));
    html.push('"');
}

/// HTML attribute names: no whitespace, quotes, `=`, `<`, `>` or `/`.
fn is_attribute_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '/'))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::{keys, MemoryConfigStore, MODULE_NAME};
    use crate::i18n::{keys as label, DefaultTranslator};
    use crate::types::{PageMeta, PageRecord};
    use chrono::{TimeZone, Utc};
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn shop(store: MemoryConfigStore) -> ShopConfig {
        ShopConfig::build(&store, Arc::new(Catalog::load(&store).unwrap())).unwrap()
    }

    fn page(template: &str) -> PageRecord {
        let meta = PageMeta {
            id: 3,
            created: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            modified: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            published: None,
            created_users_id: 1,
            modified_users_id: 1,
        };
        PageRecord::new(meta, template, "https://shop.example/tea/")
            .with_value("title", json!("Tea & Biscuits"))
            .with_value("snipcart_item_id", json!("TEA-1"))
            .with_value("snipcart_item_price_eur", json!(4.5))
    }

    #[test]
    fn test_non_product_renders_nothing() {
        let shop = shop(MemoryConfigStore::new());
        let html = render_anchor(&page("basic-page"), &shop, AnchorOverrides::new(), &DefaultTranslator);
        assert_eq!(html, "");
    }

    #[test]
    fn test_button_attribute_order_and_escaping() {
        let shop = shop(MemoryConfigStore::new());
        let html = render_anchor(
            &page("snipcart-product"),
            &shop,
            AnchorOverrides::new().class("btn").attribute("title", "Buy \"now\""),
            &DefaultTranslator,
        );

        assert!(html.starts_with(
            r#"<button class="snipcart-add-item btn" data-item-name="Tea &amp; Biscuits" data-item-id="TEA-1" data-item-price="4.5""#
        ));
        let shippable = html.find("data-item-shippable").unwrap();
        let title = html.find("title=").unwrap();
        assert!(shippable < title);
        assert!(html.contains(r#"title="Buy &quot;now&quot;""#));
        assert!(html.contains("data-item-metadata=\"{&quot;id&quot;:3"));
        assert!(html.ends_with(">Add to cart</button>"));
    }

    #[test]
    fn test_link_with_translated_label() {
        let shop = shop(MemoryConfigStore::new());
        let mut labels = HashMap::new();
        labels.insert(label::ADD_TO_CART.to_string(), "In den Warenkorb".to_string());

        let html = render_anchor(
            &page("snipcart-product"),
            &shop,
            AnchorOverrides::new().kind(AnchorKind::Link),
            &labels,
        );
        assert!(html.starts_with(r##"<a href="#" class="snipcart-add-item""##));
        assert!(html.ends_with(">In den Warenkorb</a>"));
    }

    #[test]
    fn test_invalid_attribute_names_are_skipped() {
        let shop = shop(MemoryConfigStore::new());
        let html = render_anchor(
            &page("snipcart-product"),
            &shop,
            AnchorOverrides::new()
                .attribute("onclick=\"x\"", "1")
                .attribute("data-x", "2"),
            &DefaultTranslator,
        );
        assert!(!html.contains("onclick"));
        assert!(html.contains(r#"data-x="2""#));
    }

    #[test]
    fn test_resources_use_active_environment_key() {
        let store = MemoryConfigStore::new()
            .with(MODULE_NAME, keys::API_KEY, json!("pk_live"))
            .with(MODULE_NAME, keys::API_KEY_TEST, json!("pk_test"))
            .with(MODULE_NAME, keys::ENVIRONMENT, json!("live"))
            .with(MODULE_NAME, keys::INCLUDE_SNIPCART_CSS, json!(false))
            .with(MODULE_NAME, keys::ADD_PRODUCT_BEHAVIOR, json!("none"));
        let html = render_resources(&shop(store));

        assert!(html.contains(r#"data-api-key="pk_live""#));
        assert!(html.contains(r#"data-currency="eur""#));
        assert!(html.contains(r#"data-config-add-product-behavior="none""#));
        assert!(!html.contains("snipcart.css"));
        assert!(html.ends_with("></div>"));
    }

    #[test]
    fn test_resources_default_layout() {
        let html = render_resources(&shop(MemoryConfigStore::new()));
        let lines: Vec<&str> = html.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], r#"<link rel="preconnect" href="https://app.snipcart.com">"#);
        assert_eq!(
            lines[2],
            r#"<link rel="stylesheet" href="https://cdn.snipcart.com/themes/v3.0/default/snipcart.css">"#
        );
        assert_eq!(
            lines[4],
            r#"<div hidden id="snipcart" data-api-key="" data-currency="eur"></div>"#
        );
    }
}
