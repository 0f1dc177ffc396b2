//! Shopper-facing labels.
//!
//! The host supplies translations; anything it does not translate falls
//! back to the English defaults below.

use std::collections::{BTreeMap, HashMap};

/// Label keys used by the render paths.
pub mod keys {
    pub const ADD_TO_CART: &str = "add_to_cart";
    pub const CURRENCY_NOT_FOUND: &str = "currency_not_found";
}

pub trait Translator {
    fn translate(&self, key: &str) -> String;
}

/// English labels; unknown keys come back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTranslator;

impl Translator for DefaultTranslator {
    fn translate(&self, key: &str) -> String {
        match key {
            keys::ADD_TO_CART => "Add to cart".to_string(),
            keys::CURRENCY_NOT_FOUND => "currency not found".to_string(),
            other => other.to_string(),
        }
    }
}

impl Translator for HashMap<String, String> {
    fn translate(&self, key: &str) -> String {
        self.get(key)
            .cloned()
            .unwrap_or_else(|| DefaultTranslator.translate(key))
    }
}

impl Translator for BTreeMap<String, String> {
    fn translate(&self, key: &str) -> String {
        self.get(key)
            .cloned()
            .unwrap_or_else(|| DefaultTranslator.translate(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_falls_back_to_defaults() {
        let mut labels = BTreeMap::new();
        labels.insert(keys::ADD_TO_CART.to_string(), "In den Warenkorb".to_string());

        assert_eq!(labels.translate(keys::ADD_TO_CART), "In den Warenkorb");
        assert_eq!(labels.translate(keys::CURRENCY_NOT_FOUND), "currency not found");
        assert_eq!(DefaultTranslator.translate("unknown_key"), "unknown_key");
    }
}
