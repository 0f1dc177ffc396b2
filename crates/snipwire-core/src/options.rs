//! # Anchor Options
//!
//! Shape of the rendered checkout element and how caller options combine
//! with the defaults.
//!
//! ## Merge Rules
//! ```text
//! ┌──────────────┬──────────────────────────────────────────────────────────┐
//! │ field        │ rule                                                     │
//! ├──────────────┼──────────────────────────────────────────────────────────┤
//! │ kind         │ caller replaces default                                  │
//! │ label        │ caller replaces default                                  │
//! │ classes      │ default classes, then caller classes (duplicates kept)   │
//! │ attributes   │ union; caller wins on the same attribute name            │
//! └──────────────┴──────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::i18n::{keys as label, Translator};

/// Class the checkout script looks for on add-to-cart elements.
pub const ADD_ITEM_CLASS: &str = "snipcart-add-item";

/// Element used for the checkout action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum AnchorKind {
    #[default]
    Button,
    /// `<a href="#">`, for text links inside content.
    Link,
}

/// Fully resolved options for one rendered element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnchorOptions {
    pub kind: AnchorKind,
    pub classes: Vec<String>,
    /// Extra HTML attributes, rendered after the `data-item-*` ones.
    pub attributes: BTreeMap<String, String>,
    pub label: String,
}

impl AnchorOptions {
    /// Component defaults: a button with the add-item class and the
    /// translated "Add to cart" label.
    pub fn defaults(translator: &dyn Translator) -> Self {
        AnchorOptions {
            kind: AnchorKind::Button,
            classes: vec![ADD_ITEM_CLASS.to_string()],
            attributes: BTreeMap::new(),
            label: translator.translate(label::ADD_TO_CART),
        }
    }

    /// Applies caller overrides on top of these options.
    ///
    /// ## Example
    /// ```rust
    /// use snipwire_core::i18n::DefaultTranslator;
    /// use snipwire_core::options::{AnchorKind, AnchorOptions, AnchorOverrides};
    ///
    /// let merged = AnchorOptions::defaults(&DefaultTranslator).merge(
    ///     AnchorOverrides::new()
    ///         .kind(AnchorKind::Link)
    ///         .class("btn btn-primary")
    ///         .attribute("title", "Buy now"),
    /// );
    /// assert_eq!(merged.kind, AnchorKind::Link);
    /// assert_eq!(merged.class_attribute(), "snipcart-add-item btn btn-primary");
    /// assert_eq!(merged.label, "Add to cart");
    /// ```
    pub fn merge(mut self, overrides: AnchorOverrides) -> Self {
        if let Some(kind) = overrides.kind {
            self.kind = kind;
        }
        if let Some(label) = overrides.label {
            self.label = label;
        }
        self.classes.extend(overrides.classes);
        self.attributes.extend(overrides.attributes);
        self
    }

    /// Space-joined class list.
    pub fn class_attribute(&self) -> String {
        self.classes.join(" ")
    }
}

/// What a caller may change about the rendered element.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AnchorOverrides {
    #[serde(default)]
    pub kind: Option<AnchorKind>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl AnchorOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: AnchorKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Adds classes; a space separated string adds each class.
    pub fn class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    pub fn attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::DefaultTranslator;

    #[test]
    fn test_defaults() {
        let opts = AnchorOptions::defaults(&DefaultTranslator);
        assert_eq!(opts.kind, AnchorKind::Button);
        assert_eq!(opts.class_attribute(), ADD_ITEM_CLASS);
        assert!(opts.attributes.is_empty());
        assert_eq!(opts.label, "Add to cart");
    }

    #[test]
    fn test_classes_concatenate_with_duplicates() {
        let merged = AnchorOptions::defaults(&DefaultTranslator)
            .merge(AnchorOverrides::new().class("snipcart-add-item  large"));
        assert_eq!(
            merged.classes,
            vec!["snipcart-add-item", "snipcart-add-item", "large"]
        );
    }

    #[test]
    fn test_attributes_caller_wins() {
        let mut defaults = AnchorOptions::defaults(&DefaultTranslator);
        defaults
            .attributes
            .insert("title".to_string(), "Add".to_string());
        defaults
            .attributes
            .insert("aria-live".to_string(), "polite".to_string());

        let merged = defaults.merge(
            AnchorOverrides::new()
                .attribute("title", "Buy")
                .attribute("id", "buy-1"),
        );
        assert_eq!(merged.attributes.get("title").map(String::as_str), Some("Buy"));
        assert_eq!(merged.attributes.get("aria-live").map(String::as_str), Some("polite"));
        assert_eq!(merged.attributes.get("id").map(String::as_str), Some("buy-1"));
    }

    #[test]
    fn test_scalars_replaced_only_when_given() {
        let merged = AnchorOptions::defaults(&DefaultTranslator).merge(AnchorOverrides::new());
        assert_eq!(merged, AnchorOptions::defaults(&DefaultTranslator));

        let merged = AnchorOptions::defaults(&DefaultTranslator)
            .merge(AnchorOverrides::new().label("Buy").kind(AnchorKind::Link));
        assert_eq!(merged.label, "Buy");
        assert_eq!(merged.kind, AnchorKind::Link);
    }

    #[test]
    fn test_overrides_from_json() {
        let overrides: AnchorOverrides =
            serde_json::from_value(serde_json::json!({ "kind": "link", "classes": ["x"] })).unwrap();
        assert_eq!(overrides.kind, Some(AnchorKind::Link));
        assert!(overrides.label.is_none());
    }
}
