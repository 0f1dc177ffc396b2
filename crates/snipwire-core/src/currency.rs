//! # Currency Formatting
//!
//! Turns raw prices into display strings using merchant-defined rules.
//!
//! ## Formatting Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  -1199.5 (eur)                                                         │
//! │     │                                                                   │
//! │     ▼  sign split                                                       │
//! │  negative, 1199.5                                                       │
//! │     │                                                                   │
//! │     ▼  round to precision (2), group with "." / decimal ","             │
//! │  "1.199,50"                                                             │
//! │     │                                                                   │
//! │     ▼  negative template "-%s %v"   (%s = symbol, %v = number)          │
//! │  "-€ 1.199,50"                                                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Nothing here depends on a locale: separators, precision and templates are
//! all data from [`CurrencyDefinition`].

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, warn};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::i18n::{keys as label, DefaultTranslator, Translator};
use crate::money::Money;
use crate::validation::validate_currency_definition;

/// Template placeholder replaced by the currency symbol.
pub const SYMBOL_PLACEHOLDER: &str = "%s";

/// Template placeholder replaced by the formatted number.
pub const VALUE_PLACEHOLDER: &str = "%v";

/// Long spelling of [`SYMBOL_PLACEHOLDER`], also accepted in templates.
pub const SYMBOL_PLACEHOLDER_LONG: &str = "%symbol";

/// Long spelling of [`VALUE_PLACEHOLDER`], also accepted in templates.
pub const VALUE_PLACEHOLDER_LONG: &str = "%value";

// =============================================================================
// Currency Definition
// =============================================================================

/// Formatting rules for one currency.
///
/// Field names on the wire follow the checkout service's currency settings
/// (`currency`, `numberFormat`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CurrencyDefinition {
    /// Lowercase ISO code, e.g. `eur`.
    #[serde(rename = "currency")]
    pub code: String,

    /// Digits after the decimal separator.
    pub precision: u32,

    #[serde(rename = "decimalSeparator")]
    pub decimal_separator: String,

    #[serde(rename = "thousandSeparator")]
    pub thousand_separator: String,

    /// Template for zero and positive amounts.
    #[serde(rename = "numberFormat")]
    pub positive_format: String,

    /// Template for negative amounts, applied to the absolute value.
    #[serde(rename = "negativeNumberFormat")]
    pub negative_format: String,

    #[serde(rename = "currencySymbol")]
    pub symbol: String,
}

impl CurrencyDefinition {
    /// The built-in EUR definition used when nothing is configured.
    pub fn default_eur() -> Self {
        CurrencyDefinition {
            code: "eur".to_string(),
            precision: 2,
            decimal_separator: ",".to_string(),
            thousand_separator: ".".to_string(),
            positive_format: "%s %v".to_string(),
            negative_format: "-%s %v".to_string(),
            symbol: "€".to_string(),
        }
    }

    /// Formats an amount according to these rules.
    ///
    /// ## Example
    /// ```rust
    /// use snipwire_core::currency::CurrencyDefinition;
    /// use snipwire_core::money::Money;
    ///
    /// let eur = CurrencyDefinition::default_eur();
    /// assert_eq!(eur.format(Money::from(1199)), "€ 1.199,00");
    /// assert_eq!(eur.format(Money::from(-5)), "-€ 5,00");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let rounded = amount.round_to(self.precision);
        let number = self.format_number(rounded.abs());
        let template = if rounded.is_negative() {
            &self.negative_format
        } else {
            &self.positive_format
        };
        apply_template(template, &self.symbol, &number)
    }

    /// Groups and separates an already rounded, non-negative amount.
    fn format_number(&self, amount: Money) -> String {
        let text = amount.amount().to_string();
        let (integer, fraction) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text.as_str(), ""),
        };

        let mut out = group_thousands(integer, &self.thousand_separator);
        if self.precision > 0 {
            let precision = self.precision as usize;
            let mut digits: String = fraction.chars().take(precision).collect();
            while digits.len() < precision {
                digits.push('0');
            }
            out.push_str(&self.decimal_separator);
            out.push_str(&digits);
        }
        out
    }
}

/// Inserts `separator` between every group of three digits from the right.
fn group_thousands(digits: &str, separator: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3 * separator.len());
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(ch);
    }
    out
}

/// Substitutes the placeholders in a single left-to-right pass, so a symbol
/// that itself contains `%v` is never expanded twice.
///
/// Long spellings are matched before the short ones they start with.
fn apply_template(template: &str, symbol: &str, value: &str) -> String {
    let placeholders = [
        (SYMBOL_PLACEHOLDER_LONG, symbol),
        (VALUE_PLACEHOLDER_LONG, value),
        (SYMBOL_PLACEHOLDER, symbol),
        (VALUE_PLACEHOLDER, value),
    ];

    let mut out = String::with_capacity(template.len() + symbol.len() + value.len());
    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match placeholders.iter().find(|(p, _)| tail.starts_with(p)) {
            Some((placeholder, replacement)) => {
                out.push_str(replacement);
                rest = &tail[placeholder.len()..];
            }
            None => {
                out.push('%');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

// =============================================================================
// Price
// =============================================================================

/// A product price: one amount, or one amount per currency code.
#[derive(Debug, Clone, PartialEq)]
pub enum Price {
    /// Single-currency shop.
    Single(Money),
    /// Multi-currency shop; entries keep their configuration order.
    PerCurrency(Vec<(String, Money)>),
}

impl Price {
    /// Builds a per-currency price; codes are lowercased.
    pub fn per_currency<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Money)>,
        S: Into<String>,
    {
        Price::PerCurrency(
            entries
                .into_iter()
                .map(|(code, amount)| (code.into().to_lowercase(), amount))
                .collect(),
        )
    }

    /// Amount for a currency code, if the price has an entry for it.
    pub fn get(&self, code: &str) -> Option<Money> {
        match self {
            Price::Single(amount) => Some(*amount),
            Price::PerCurrency(entries) => entries
                .iter()
                .find(|(c, _)| c.eq_ignore_ascii_case(code))
                .map(|(_, amount)| *amount),
        }
    }
}

impl From<Money> for Price {
    fn from(amount: Money) -> Self {
        Price::Single(amount)
    }
}

// =============================================================================
// Formatted Price
// =============================================================================

/// Result of formatting a [`Price`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedPrice {
    /// The formatted amount, without any note.
    pub text: String,
    /// Currency the text was formatted in.
    pub currency: String,
    /// The requested currency was missing and another entry was used.
    pub fallback: bool,
}

impl FormattedPrice {
    /// Display text, with the translated "currency not found" note appended
    /// when the price fell back to another currency.
    pub fn render(&self, translator: &dyn Translator) -> String {
        if self.fallback {
            format!(
                "{} ({})",
                self.text,
                translator.translate(label::CURRENCY_NOT_FOUND)
            )
        } else {
            self.text.clone()
        }
    }
}

impl fmt::Display for FormattedPrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(&DefaultTranslator))
    }
}

// =============================================================================
// Currencies
// =============================================================================

/// The validated set of currency definitions, unique by code.
#[derive(Debug, Clone, PartialEq)]
pub struct Currencies {
    definitions: Vec<CurrencyDefinition>,
}

impl Currencies {
    /// Builds the set, normalizing codes to lowercase.
    ///
    /// An empty list yields the built-in EUR definition.
    pub fn new(definitions: Vec<CurrencyDefinition>) -> CoreResult<Self> {
        if definitions.is_empty() {
            return Ok(Currencies::default());
        }

        let mut normalized: Vec<CurrencyDefinition> = Vec::with_capacity(definitions.len());
        for mut def in definitions {
            def.code = def.code.trim().to_lowercase();
            validate_currency_definition(&def)?;
            if normalized.iter().any(|d| d.code == def.code) {
                return Err(ValidationError::Duplicate {
                    field: "currency".to_string(),
                    value: def.code,
                }
                .into());
            }
            normalized.push(def);
        }

        Ok(Currencies {
            definitions: normalized,
        })
    }

    /// Definition for a code (case-insensitive).
    pub fn get(&self, code: &str) -> Option<&CurrencyDefinition> {
        self.definitions
            .iter()
            .find(|d| d.code.eq_ignore_ascii_case(code.trim()))
    }

    /// Code of the first definition.
    pub fn default_code(&self) -> &str {
        self.definitions
            .first()
            .map(|d| d.code.as_str())
            .unwrap_or("eur")
    }

    pub fn codes(&self) -> Vec<&str> {
        self.definitions.iter().map(|d| d.code.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Formats a single amount; unknown codes are an error.
    pub fn format_amount(&self, amount: Money, code: &str) -> CoreResult<String> {
        self.get(code)
            .map(|def| def.format(amount))
            .ok_or_else(|| CoreError::CurrencyNotConfigured(code.to_string()))
    }

    /// Formats a price for display in `code`.
    ///
    /// ## Selection Rules
    /// ```text
    /// Single(x)           → x in `code`; unknown code → None
    /// PerCurrency, has code → that entry, fallback = false
    /// PerCurrency, no code  → first entry in its own currency, fallback = true
    /// PerCurrency, empty    → None
    /// ```
    pub fn format_price(&self, price: &Price, code: &str) -> Option<FormattedPrice> {
        let code = code.trim().to_lowercase();
        match price {
            Price::Single(amount) => match self.format_amount(*amount, &code) {
                Ok(text) => Some(FormattedPrice {
                    text,
                    currency: code,
                    fallback: false,
                }),
                Err(e) => {
                    warn!(currency = %code, "Cannot format price: {}", e);
                    None
                }
            },
            Price::PerCurrency(entries) => {
                let (currency, amount, fallback) = match price.get(&code) {
                    Some(amount) => (code, amount, false),
                    None => {
                        let (first, amount) = entries.first()?;
                        debug!(requested = %code, used = %first, "Currency not found in price, falling back");
                        (first.clone(), *amount, true)
                    }
                };
                match self.format_amount(amount, &currency) {
                    Ok(text) => Some(FormattedPrice {
                        text,
                        currency,
                        fallback,
                    }),
                    Err(e) => {
                        warn!(currency = %currency, "Cannot format price: {}", e);
                        None
                    }
                }
            }
        }
    }

    /// Display string for a price; empty when it cannot be formatted.
    ///
    /// ## Example
    /// ```rust
    /// use snipwire_core::currency::{Currencies, Price};
    /// use snipwire_core::money::Money;
    ///
    /// let currencies = Currencies::default();
    /// assert_eq!(currencies.format(&Price::Single(Money::from(1199)), "eur"), "€ 1.199,00");
    /// assert_eq!(currencies.format(&Price::Single(Money::from(1199)), "usd"), "");
    ///
    /// let price = Price::per_currency([("eur", Money::from(10))]);
    /// assert_eq!(currencies.format(&price, "usd"), "€ 10,00 (currency not found)");
    /// ```
    pub fn format(&self, price: &Price, code: &str) -> String {
        self.format_with(price, code, &DefaultTranslator)
    }

    /// [`Currencies::format`] with a caller-supplied translator for the note.
    pub fn format_with(&self, price: &Price, code: &str, translator: &dyn Translator) -> String {
        self.format_price(price, code)
            .map(|formatted| formatted.render(translator))
            .unwrap_or_default()
    }
}

impl Default for Currencies {
    fn default() -> Self {
        Currencies {
            definitions: vec![CurrencyDefinition::default_eur()],
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn usd() -> CurrencyDefinition {
        CurrencyDefinition {
            code: "USD".to_string(),
            precision: 2,
            decimal_separator: ".".to_string(),
            thousand_separator: ",".to_string(),
            positive_format: "%s%v".to_string(),
            negative_format: "(%s%v)".to_string(),
            symbol: "$".to_string(),
        }
    }

    fn chf() -> CurrencyDefinition {
        CurrencyDefinition {
            code: "chf".to_string(),
            precision: 3,
            decimal_separator: ".".to_string(),
            thousand_separator: "'".to_string(),
            positive_format: "%v %s".to_string(),
            negative_format: "%s -%v".to_string(),
            symbol: "CHF".to_string(),
        }
    }

    fn jpy() -> CurrencyDefinition {
        CurrencyDefinition {
            code: "jpy".to_string(),
            precision: 0,
            decimal_separator: ".".to_string(),
            thousand_separator: ",".to_string(),
            positive_format: "%s%v".to_string(),
            negative_format: "-%s%v".to_string(),
            symbol: "¥".to_string(),
        }
    }

    fn currencies() -> Currencies {
        Currencies::new(vec![CurrencyDefinition::default_eur(), usd(), chf(), jpy()]).unwrap()
    }

    #[test]
    fn test_scenario_eur_1199() {
        let eur = CurrencyDefinition::default_eur();
        assert_eq!(eur.format(Money::from(1199)), "€ 1.199,00");
    }

    #[test]
    fn test_precision_and_grouping() {
        let c = currencies();
        let amount = Money::new(dec!(1234567.891));
        assert_eq!(c.format_amount(amount, "eur").unwrap(), "€ 1.234.567,89");
        assert_eq!(c.format_amount(amount, "usd").unwrap(), "$1,234,567.89");
        assert_eq!(c.format_amount(amount, "chf").unwrap(), "1'234'567.891 CHF");
        assert_eq!(c.format_amount(amount, "jpy").unwrap(), "¥1,234,568");
    }

    #[test]
    fn test_exact_fraction_digits() {
        let c = currencies();
        for (code, sep, precision) in [("eur", ',', 2), ("usd", '.', 2), ("chf", '.', 3)] {
            for amount in [dec!(0), dec!(1), dec!(9.5), dec!(1000.125), dec!(0.0004)] {
                let text = c.format_amount(Money::new(amount), code).unwrap();
                let digits = text
                    .rsplit(sep)
                    .next()
                    .unwrap()
                    .chars()
                    .take_while(|ch| ch.is_ascii_digit())
                    .count();
                assert_eq!(digits, precision, "{code} {amount} → {text}");
            }
        }
        assert!(!c.format_amount(Money::from(7), "jpy").unwrap().contains('.'));
    }

    #[test]
    fn test_small_numbers_are_not_grouped() {
        let c = currencies();
        assert_eq!(c.format_amount(Money::from(0), "eur").unwrap(), "€ 0,00");
        assert_eq!(c.format_amount(Money::from(999), "usd").unwrap(), "$999.00");
        assert_eq!(c.format_amount(Money::from(1000), "usd").unwrap(), "$1,000.00");
    }

    #[test]
    fn test_negative_uses_negative_template() {
        let c = currencies();
        let amount = Money::new(dec!(-1234.5));
        assert_eq!(c.format_amount(amount, "usd").unwrap(), "($1,234.50)");
        assert_eq!(c.format_amount(amount, "chf").unwrap(), "CHF -1'234.500");
        assert_eq!(c.format_amount(amount, "eur").unwrap(), "-€ 1.234,50");

        // Positive template output with a "-" prepended is not what we want.
        let positive = c.format_amount(amount.abs(), "usd").unwrap();
        assert_ne!(c.format_amount(amount, "usd").unwrap(), format!("-{positive}"));
    }

    #[test]
    fn test_negative_rounding_to_zero_uses_positive_template() {
        let c = currencies();
        assert_eq!(c.format_amount(Money::new(dec!(-0.001)), "usd").unwrap(), "$0.00");
    }

    #[test]
    fn test_rounding() {
        let c = currencies();
        assert_eq!(c.format_amount(Money::new(dec!(2.345)), "usd").unwrap(), "$2.35");
        assert_eq!(c.format_amount(Money::new(dec!(999.995)), "usd").unwrap(), "$1,000.00");
    }

    #[test]
    fn test_template_single_pass() {
        assert_eq!(apply_template("%s%v", "%v", "1"), "%v1");
        assert_eq!(apply_template("100% %v", "$", "5"), "100% 5");
        assert_eq!(apply_template("%v%", "$", "5"), "5%");
    }

    #[test]
    fn test_long_placeholder_names() {
        let mut eur = CurrencyDefinition::default_eur();
        eur.positive_format = "%symbol%value".to_string();
        eur.negative_format = "-%symbol %value".to_string();
        assert!(validate_currency_definition(&eur).is_ok());

        assert_eq!(eur.format(Money::from(1199)), "€1.199,00");
        assert_eq!(eur.format(Money::from(-1199)), "-€ 1.199,00");
        assert_eq!(apply_template("%value %s", "$", "5"), "5 $");
        assert_eq!(apply_template("%symbolic", "$", "5"), "$ic");
    }

    #[test]
    fn test_codes_normalized_and_unique() {
        let c = currencies();
        assert!(c.get("USD").is_some());
        assert_eq!(c.codes(), vec!["eur", "usd", "chf", "jpy"]);

        let dup = Currencies::new(vec![usd(), usd()]);
        assert!(matches!(dup, Err(CoreError::Validation(ValidationError::Duplicate { .. }))));
    }

    #[test]
    fn test_empty_definitions_fall_back_to_eur() {
        let c = Currencies::new(Vec::new()).unwrap();
        assert_eq!(c.codes(), vec!["eur"]);
        assert_eq!(c.default_code(), "eur");
    }

    #[test]
    fn test_map_price_uses_requested_currency() {
        let c = currencies();
        let price = Price::per_currency([("eur", Money::from(10)), ("usd", Money::from(12))]);
        let formatted = c.format_price(&price, "usd").unwrap();
        assert!(!formatted.fallback);
        assert_eq!(formatted.currency, "usd");
        assert_eq!(c.format(&price, "usd"), "$12.00");
    }

    #[test]
    fn test_map_price_falls_back_to_first_entry() {
        let c = currencies();
        let price = Price::per_currency([("eur", Money::from(10))]);
        let formatted = c.format_price(&price, "usd").unwrap();
        assert!(formatted.fallback);
        assert_eq!(formatted.currency, "eur");
        assert_eq!(formatted.text, "€ 10,00");
        assert_eq!(formatted.to_string(), "€ 10,00 (currency not found)");
    }

    #[test]
    fn test_unformattable_prices_render_empty() {
        let c = currencies();
        assert_eq!(c.format(&Price::Single(Money::from(5)), "gbp"), "");
        assert_eq!(c.format(&Price::PerCurrency(Vec::new()), "eur"), "");
        // Entry present but its currency has no definition.
        let price = Price::per_currency([("gbp", Money::from(5))]);
        assert_eq!(c.format(&price, "gbp"), "");
    }

    #[test]
    fn test_note_is_translated() {
        let c = currencies();
        let mut labels = std::collections::HashMap::new();
        labels.insert(
            label::CURRENCY_NOT_FOUND.to_string(),
            "Währung nicht gefunden".to_string(),
        );
        let price = Price::per_currency([("eur", Money::from(1))]);
        assert_eq!(
            c.format_with(&price, "usd", &labels),
            "€ 1,00 (Währung nicht gefunden)"
        );
    }

    #[test]
    fn test_definition_deserializes_from_service_names() {
        let def: CurrencyDefinition = serde_json::from_value(serde_json::json!({
            "currency": "gbp",
            "precision": 2,
            "decimalSeparator": ".",
            "thousandSeparator": ",",
            "numberFormat": "%s%v",
            "negativeNumberFormat": "-%s%v",
            "currencySymbol": "£"
        }))
        .unwrap();
        assert_eq!(def.code, "gbp");
        assert_eq!(def.format(Money::new(dec!(-3.5))), "-£3.50");
    }
}
