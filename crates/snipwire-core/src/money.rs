//! # Money Module
//!
//! Provides the `Money` type for exact monetary values.
//!
//! ## Why Decimal?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Currencies also disagree on precision: EUR has 2 digits, JPY has 0,   │
//! │  so a fixed "cents" unit does not fit every configured currency.       │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal                                             │
//! │    Exact base-10 values, rounded to the currency's precision only      │
//! │    when a value is displayed or a tax is computed.                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rust_decimal::Decimal;
//! use snipwire_core::money::Money;
//!
//! let price = Money::new(Decimal::new(1999, 2)); // 19.99
//! assert_eq!(price.to_string(), "19.99");
//! assert_eq!(price.round_to(0).to_string(), "20");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Neg, Sub};
use std::str::FromStr;

use crate::tax::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in major currency units (19.99 means 19 euros 99 cents).
///
/// ## Where Money is Used
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  page field snipcart_item_price_eur ──► Money ──┬──► data-item-price    │
/// │                                                 │                       │
/// │                                                 ├──► "€ 19,99" display  │
/// │                                                 │                       │
/// │                                                 └──► tax breakdown      │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Zero amount.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Parses an amount from its decimal text (`"19.99"`, `"1199"`).
    ///
    /// Scientific notation (`"1e3"`) is accepted as well.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        Decimal::from_str(text)
            .or_else(|_| Decimal::from_scientific(text))
            .ok()
            .map(Money)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Rounds to `precision` fractional digits, half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use snipwire_core::money::Money;
    ///
    /// let amount = Money::new(Decimal::new(1005, 3)); // 1.005
    /// assert_eq!(amount.round_to(2).to_string(), "1.01");
    /// ```
    pub fn round_to(&self, precision: u32) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(precision, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Calculates the tax portion of this amount.
    ///
    /// ## Tax Modes
    /// ```text
    /// included = false (price + tax):   tax = amount × rate
    /// included = true  (price has tax): tax = amount − amount / (1 + rate)
    /// ```
    ///
    /// The result is rounded to `precision` digits.
    ///
    /// ## Example
    /// ```rust
    /// use rust_decimal::Decimal;
    /// use snipwire_core::money::Money;
    /// use snipwire_core::tax::TaxRate;
    ///
    /// let rate = TaxRate::new(Decimal::new(20, 2)); // 20%
    /// let price = Money::new(Decimal::new(120, 0));
    ///
    /// assert_eq!(price.calculate_tax(rate, false, 2).to_string(), "24");
    /// assert_eq!(price.calculate_tax(rate, true, 2).to_string(), "20");
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate, included: bool, precision: u32) -> Money {
        let tax = if included {
            self.0 - self.0 / (Decimal::ONE + rate.fraction())
        } else {
            self.0 * rate.fraction()
        };
        Money(tax).round_to(precision)
    }

    /// Value as a JSON number, the shape the per-currency price map uses.
    pub fn to_json_number(&self) -> serde_json::Value {
        serde_json::Number::from_str(&self.to_string())
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain decimal text with trailing zeros trimmed (`19.9`, `1199`).
///
/// ## Note
/// This is the machine representation used in `data-item-*` attributes.
/// Use the currency formatter for anything a shopper reads.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl From<i64> for Money {
    fn from(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("19.99"), Some(Money::new(dec!(19.99))));
        assert_eq!(Money::parse(" 1199 "), Some(Money::from(1199)));
        assert_eq!(Money::parse("1e3"), Some(Money::from(1000)));
        assert_eq!(Money::parse("abc"), None);
    }

    #[test]
    fn test_display_is_normalized() {
        assert_eq!(Money::new(dec!(19.90)).to_string(), "19.9");
        assert_eq!(Money::new(dec!(1199.00)).to_string(), "1199");
        assert_eq!(Money::new(dec!(-5.50)).to_string(), "-5.5");
    }

    #[test]
    fn test_rounding_half_away_from_zero() {
        assert_eq!(Money::new(dec!(2.345)).round_to(2), Money::new(dec!(2.35)));
        assert_eq!(Money::new(dec!(-2.345)).round_to(2), Money::new(dec!(-2.35)));
        assert_eq!(Money::new(dec!(2.5)).round_to(0), Money::from(3));
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::new(dec!(-0.01)).is_negative());
        assert!(!Money::zero().is_negative());
        assert!(Money::zero().is_zero());
        assert_eq!(Money::new(dec!(-3)).abs(), Money::from(3));
        assert_eq!(-Money::from(3), Money::new(dec!(-3)));
    }

    #[test]
    fn test_tax_exclusive() {
        let rate = TaxRate::new(dec!(0.0825));
        let tax = Money::from(10).calculate_tax(rate, false, 2);
        // 10 × 8.25% = 0.825 → 0.83
        assert_eq!(tax, Money::new(dec!(0.83)));
    }

    #[test]
    fn test_tax_included() {
        let rate = TaxRate::new(dec!(0.19));
        let tax = Money::new(dec!(119)).calculate_tax(rate, true, 2);
        assert_eq!(tax, Money::from(19));
    }

    #[test]
    fn test_json_number() {
        assert_eq!(Money::new(dec!(12.50)).to_json_number(), serde_json::json!(12.5));
        assert_eq!(Money::from(10).to_json_number(), serde_json::json!(10));
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::new(dec!(10.00));
        let b = Money::new(dec!(2.50));
        assert_eq!(a + b, Money::new(dec!(12.5)));
        assert_eq!(a - b, Money::new(dec!(7.5)));
    }
}
