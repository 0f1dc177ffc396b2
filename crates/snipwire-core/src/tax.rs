//! # Taxes
//!
//! Tax definitions configured by the merchant and looked up by name.
//!
//! A product references a tax by its `name` (the value of its
//! `snipcart_item_taxes` field). The checkout service receives the name in
//! `data-item-taxes` and resolves the rate on its side through the taxes
//! webhook, so the rate here only drives local price breakdowns.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::validation::validate_tax_definition;

// =============================================================================
// Tax Rate
// =============================================================================

/// A tax rate as a decimal fraction: `0.20` is 20%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TaxRate(Decimal);

impl TaxRate {
    #[inline]
    pub const fn new(fraction: Decimal) -> Self {
        TaxRate(fraction)
    }

    /// Returns the rate as a fraction (0.20).
    #[inline]
    pub const fn fraction(&self) -> Decimal {
        self.0
    }

    /// Returns the rate as a percentage (20), for labels only.
    pub fn percentage(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

// =============================================================================
// Tax Definition
// =============================================================================

/// One merchant-configured tax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxDefinition {
    /// Unique key, referenced from product pages.
    pub name: String,

    /// Label printed on invoices.
    #[serde(default, rename = "numberForInvoice")]
    pub number_for_invoice: String,

    /// Rate as a decimal fraction.
    #[serde(deserialize_with = "deserialize_rate")]
    #[ts(type = "number")]
    pub rate: TaxRate,

    /// Whether the checkout service also applies this tax to shipping.
    #[serde(default, rename = "appliesOnShipping")]
    pub applies_on_shipping: bool,
}

impl TaxDefinition {
    /// The built-in 20% VAT used when nothing is configured.
    pub fn default_vat() -> Self {
        TaxDefinition {
            name: "20% VAT".to_string(),
            number_for_invoice: "20% VAT".to_string(),
            rate: TaxRate::new(Decimal::new(20, 2)),
            applies_on_shipping: false,
        }
    }
}

/// Accepts the rate as a JSON number (`0.2`) or as text (`"0.20"`).
///
/// Numbers go through their shortest decimal text so `0.2` stays exactly
/// `0.2` instead of picking up binary float noise.
fn deserialize_rate<'de, D>(deserializer: D) -> Result<TaxRate, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    crate::config::decimal_from_value(&value)
        .map(TaxRate::new)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid tax rate: {value}")))
}

// =============================================================================
// Tax Catalog
// =============================================================================

/// The validated set of configured taxes, in configuration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Taxes {
    definitions: Vec<TaxDefinition>,
}

impl Taxes {
    /// Builds a catalog, rejecting invalid or duplicate definitions.
    ///
    /// An empty list yields the built-in 20% VAT.
    pub fn new(definitions: Vec<TaxDefinition>) -> CoreResult<Self> {
        if definitions.is_empty() {
            return Ok(Taxes::default());
        }

        let mut seen: Vec<&str> = Vec::with_capacity(definitions.len());
        for def in &definitions {
            validate_tax_definition(def)?;
            if seen.contains(&def.name.as_str()) {
                return Err(CoreError::Validation(
                    crate::error::ValidationError::Duplicate {
                        field: "tax".to_string(),
                        value: def.name.clone(),
                    },
                ));
            }
            seen.push(&def.name);
        }

        Ok(Taxes { definitions })
    }

    /// Looks up a tax by name.
    pub fn get(&self, name: &str) -> Option<&TaxDefinition> {
        self.definitions.iter().find(|t| t.name == name)
    }

    /// The first configured tax (the default selection in the admin UI).
    pub fn first(&self) -> Option<&TaxDefinition> {
        self.definitions.first()
    }

    /// All tax names, in configuration order.
    pub fn names(&self) -> Vec<&str> {
        self.definitions.iter().map(|t| t.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

impl Default for Taxes {
    fn default() -> Self {
        Taxes {
            definitions: vec![TaxDefinition::default_vat()],
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
