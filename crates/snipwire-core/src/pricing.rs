//! # Product Pricing
//!
//! Reads a product page's price fields and derives display strings and tax
//! splits from them.
//!
//! ## Tax Split
//! ```text
//! taxes_included = false           taxes_included = true
//! ──────────────────────           ─────────────────────
//! net   = price                    gross = price
//! tax   = price × rate             tax   = price − price / (1 + rate)
//! gross = net + tax                net   = gross − tax
//! ```
//!
//! The rate is the product's assigned tax, else the shop's first tax when
//! the product is taxable, else zero.

use serde::Serialize;
use tracing::debug;

use crate::config::ShopConfig;
use crate::currency::Price;
use crate::i18n::Translator;
use crate::money::Money;
use crate::product::fields;
use crate::tax::{TaxDefinition, TaxRate};
use crate::types::ContentRecord;

/// The product's price as entered on the page.
///
/// A shop with several currencies gets one entry per selected currency, in
/// selection order; unset fields count as zero.
pub fn product_price(record: &dyn ContentRecord, shop: &ShopConfig) -> Price {
    let read = |code: &str| {
        record
            .decimal(&fields::price(code))
            .map(Money::new)
            .unwrap_or_else(Money::zero)
    };

    if shop.is_multi_currency() {
        Price::per_currency(shop.currencies.iter().map(|code| (code.clone(), read(code))))
    } else {
        Price::Single(read(shop.default_currency()))
    }
}

/// Display price of a product page in `code`; empty for pages that are not
/// products or prices that cannot be formatted.
pub fn formatted_product_price(
    record: &dyn ContentRecord,
    shop: &ShopConfig,
    code: &str,
    translator: &dyn Translator,
) -> String {
    if !shop.is_product_template(record.template()) {
        return String::new();
    }
    let price = product_price(record, shop);
    shop.catalog.currencies.format_with(&price, code, translator)
}

// =============================================================================
// Price Breakdown
// =============================================================================

/// Net, tax and gross amounts of a product in one currency.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceBreakdown {
    pub currency: String,
    pub net: Money,
    pub tax: Money,
    pub gross: Money,
    /// Tax the split was computed with; `None` when untaxed.
    pub tax_name: Option<String>,
}

/// Splits a product's price in `code` into net, tax and gross.
///
/// `None` for non-product pages, currencies without a definition, and
/// multi-currency prices with no entry for `code`.
pub fn price_breakdown(
    record: &dyn ContentRecord,
    shop: &ShopConfig,
    code: &str,
) -> Option<PriceBreakdown> {
    if !shop.is_product_template(record.template()) {
        return None;
    }

    let code = code.trim().to_lowercase();
    let definition = shop.catalog.currencies.get(&code)?;
    let amount = product_price(record, shop).get(&code)?;

    let tax_def = applicable_tax(record, shop);
    let rate = tax_def.map_or(TaxRate::default(), |t| t.rate);
    let tax = amount.calculate_tax(rate, shop.taxes_included, definition.precision);

    let (net, gross) = if shop.taxes_included {
        (amount - tax, amount)
    } else {
        (amount, amount + tax)
    };

    debug!(
        currency = %code,
        net = %net,
        tax = %tax,
        gross = %gross,
        "Price breakdown"
    );

    Some(PriceBreakdown {
        currency: code,
        net,
        tax,
        gross,
        tax_name: tax_def.map(|t| t.name.clone()),
    })
}

fn applicable_tax<'a>(record: &dyn ContentRecord, shop: &'a ShopConfig) -> Option<&'a TaxDefinition> {
    if !record.flag(fields::TAXABLE).unwrap_or(true) {
        return None;
    }
    let assigned = record
        .get(fields::TAXES)
        .and_then(|value| value.as_list().into_iter().next());
    match assigned {
        Some(name) => shop.catalog.taxes.get(&name),
        None => shop.catalog.taxes.first(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::config::{keys, MemoryConfigStore, MODULE_NAME};
    use crate::i18n::DefaultTranslator;
    use crate::types::{PageMeta, PageRecord};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use std::sync::Arc;

    fn shop(store: MemoryConfigStore) -> ShopConfig {
        let catalog = Catalog::load(&store).unwrap();
        ShopConfig::build(&store, Arc::new(catalog)).unwrap()
    }

    fn page(template: &str) -> PageRecord {
        let meta = PageMeta {
            id: 7,
            created: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            modified: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            published: None,
            created_users_id: 1,
            modified_users_id: 1,
        };
        PageRecord::new(meta, template, "https://shop.example/p/")
    }

    fn two_currency_store() -> MemoryConfigStore {
        MemoryConfigStore::new()
            .with(MODULE_NAME, keys::CURRENCIES, json!("eur,usd"))
            .with(
                MODULE_NAME,
                keys::CURRENCY_DEFINITIONS,
                json!([
                    {"currency": "eur", "precision": 2, "decimalSeparator": ",", "thousandSeparator": ".",
                     "numberFormat": "%s %v", "negativeNumberFormat": "-%s %v", "currencySymbol": "€"},
                    {"currency": "usd", "precision": 2, "decimalSeparator": ".", "thousandSeparator": ",",
                     "numberFormat": "%s%v", "negativeNumberFormat": "-%s%v", "currencySymbol": "$"}
                ]),
            )
    }

    #[test]
    fn test_single_currency_price() {
        let shop = shop(MemoryConfigStore::new());
        let product = page("snipcart-product").with_value("snipcart_item_price_eur", json!(1199));
        assert_eq!(product_price(&product, &shop), Price::Single(Money::from(1199)));
        assert_eq!(
            formatted_product_price(&product, &shop, "eur", &DefaultTranslator),
            "€ 1.199,00"
        );
    }

    #[test]
    fn test_unset_price_is_zero() {
        let shop = shop(MemoryConfigStore::new());
        let product = page("snipcart-product").with_value("snipcart_item_price_eur", json!(""));
        assert_eq!(product_price(&product, &shop), Price::Single(Money::zero()));
        assert_eq!(
            formatted_product_price(&product, &shop, "eur", &DefaultTranslator),
            "€ 0,00"
        );
    }

    #[test]
    fn test_multi_currency_price() {
        let shop = shop(two_currency_store());
        let product = page("snipcart-product")
            .with_value("snipcart_item_price_eur", json!(10))
            .with_value("snipcart_item_price_usd", json!(12));

        assert_eq!(
            product_price(&product, &shop),
            Price::per_currency([("eur", Money::from(10)), ("usd", Money::from(12))])
        );
        assert_eq!(
            formatted_product_price(&product, &shop, "usd", &DefaultTranslator),
            "$12.00"
        );
        assert_eq!(
            formatted_product_price(&product, &shop, "gbp", &DefaultTranslator),
            "€ 10,00 (currency not found)"
        );
    }

    #[test]
    fn test_non_product_has_no_price() {
        let shop = shop(MemoryConfigStore::new());
        let about = page("basic-page").with_value("snipcart_item_price_eur", json!(5));
        assert_eq!(formatted_product_price(&about, &shop, "eur", &DefaultTranslator), "");
        assert!(price_breakdown(&about, &shop, "eur").is_none());
    }

    #[test]
    fn test_breakdown_taxes_added() {
        let shop = shop(MemoryConfigStore::new());
        let product = page("snipcart-product").with_value("snipcart_item_price_eur", json!(100));

        let split = price_breakdown(&product, &shop, "EUR").unwrap();
        assert_eq!(split.currency, "eur");
        assert_eq!(split.net.amount(), dec!(100));
        assert_eq!(split.tax.amount(), dec!(20));
        assert_eq!(split.gross.amount(), dec!(120));
        assert_eq!(split.tax_name.as_deref(), Some("20% VAT"));
    }

    #[test]
    fn test_breakdown_taxes_included() {
        let store = MemoryConfigStore::new().with(MODULE_NAME, keys::TAXES_INCLUDED, json!(true));
        let shop = shop(store);
        let product = page("snipcart-product").with_value("snipcart_item_price_eur", json!(119.99));

        let split = price_breakdown(&product, &shop, "eur").unwrap();
        assert_eq!(split.gross.amount(), dec!(119.99));
        assert_eq!(split.tax.amount(), dec!(20.00));
        assert_eq!(split.net.amount(), dec!(99.99));
    }

    #[test]
    fn test_breakdown_uses_assigned_tax_or_none() {
        let store = MemoryConfigStore::new().with(
            MODULE_NAME,
            keys::TAXES,
            json!([
                {"name": "vat-20", "numberForInvoice": "20% VAT", "rate": 0.2},
                {"name": "vat-10", "numberForInvoice": "10% VAT", "rate": 0.1}
            ]),
        );
        let shop = shop(store);

        let reduced = page("snipcart-product")
            .with_value("snipcart_item_price_eur", json!(50))
            .with_value("snipcart_item_taxes", json!("vat-10"));
        let split = price_breakdown(&reduced, &shop, "eur").unwrap();
        assert_eq!(split.tax.amount(), dec!(5));
        assert_eq!(split.tax_name.as_deref(), Some("vat-10"));

        let untaxed = page("snipcart-product")
            .with_value("snipcart_item_price_eur", json!(50))
            .with_value("snipcart_item_taxable", json!(false));
        let split = price_breakdown(&untaxed, &shop, "eur").unwrap();
        assert!(split.tax.is_zero());
        assert_eq!(split.gross.amount(), dec!(50));
        assert!(split.tax_name.is_none());
    }

    #[test]
    fn test_breakdown_unknown_currency() {
        let shop = shop(two_currency_store());
        let product = page("snipcart-product").with_value("snipcart_item_price_eur", json!(10));
        assert!(price_breakdown(&product, &shop, "gbp").is_none());
        assert!(price_breakdown(&product, &shop, "usd").is_some());
    }
}
