//! # Validation Module
//!
//! Rule checks for merchant-configured definitions and product fields.
//!
//! ## Where Validation Runs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Points                                  │
//! │                                                                         │
//! │  Catalog::load                                                         │
//! │  ├── validate_currency_definition  (every configured currency)         │
//! │  └── validate_tax_definition       (every configured tax)              │
//! │      → invalid config is an error; Catalog::shared falls back to       │
//! │        the built-in defaults and logs it                               │
//! │                                                                         │
//! │  ProductAttributeBuilder                                               │
//! │  ├── validate_sku                  (empty SKU → page id)               │
//! │  └── validate_quantity_rules       (logged, markup still rendered)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use snipwire_core::validation::{validate_currency_code, validate_sku};
//!
//! assert!(validate_currency_code("eur").is_ok());
//! assert!(validate_sku("TSHIRT-RED-M").is_ok());
//! ```

use rust_decimal::Decimal;

use crate::currency::{CurrencyDefinition, VALUE_PLACEHOLDER};
use crate::error::ValidationError;
use crate::tax::TaxDefinition;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Most fractional digits a currency may display.
pub const MAX_CURRENCY_PRECISION: u32 = 8;

/// Longest item id the checkout service accepts.
pub const MAX_SKU_LENGTH: usize = 100;

// =============================================================================
// Currency Validators
// =============================================================================

/// Validates a currency code.
///
/// ## Rules
/// - Exactly three ASCII letters, lowercase (`eur`, `usd`)
///
/// ## Example
/// ```rust
/// use snipwire_core::validation::validate_currency_code;
///
/// assert!(validate_currency_code("usd").is_ok());
/// assert!(validate_currency_code("USD").is_err());
/// assert!(validate_currency_code("euro").is_err());
/// ```
pub fn validate_currency_code(code: &str) -> ValidationResult<()> {
    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "currency".to_string(),
        });
    }

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_lowercase()) {
        return Err(ValidationError::InvalidFormat {
            field: "currency".to_string(),
            reason: format!("'{code}' must be three lowercase letters"),
        });
    }

    Ok(())
}

/// Validates a complete currency definition.
///
/// ## Rules
/// - Code passes [`validate_currency_code`]
/// - Precision at most [`MAX_CURRENCY_PRECISION`]
/// - Decimal separator set whenever precision > 0
/// - Both templates contain the `%v` (or `%value`) placeholder
pub fn validate_currency_definition(def: &CurrencyDefinition) -> ValidationResult<()> {
    validate_currency_code(&def.code)?;

    if def.precision > MAX_CURRENCY_PRECISION {
        return Err(ValidationError::OutOfRange {
            field: format!("{} precision", def.code),
            min: 0,
            max: MAX_CURRENCY_PRECISION as i64,
        });
    }

    if def.precision > 0 && def.decimal_separator.is_empty() {
        return Err(ValidationError::Required {
            field: format!("{} decimal separator", def.code),
        });
    }

    for (name, template) in [
        ("number format", &def.positive_format),
        ("negative number format", &def.negative_format),
    ] {
        if !template.contains(VALUE_PLACEHOLDER) {
            return Err(ValidationError::InvalidFormat {
                field: format!("{} {name}", def.code),
                reason: format!("'{template}' has no {VALUE_PLACEHOLDER} placeholder"),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Tax Validators
// =============================================================================

/// Validates a tax definition.
///
/// ## Rules
/// - Name must not be empty
/// - Rate between 0 and 1 (0% to 100%)
pub fn validate_tax_definition(def: &TaxDefinition) -> ValidationResult<()> {
    if def.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "tax name".to_string(),
        });
    }

    let rate = def.rate.fraction();
    if rate < Decimal::ZERO || rate > Decimal::ONE {
        return Err(ValidationError::OutOfRange {
            field: format!("{} rate", def.name),
            min: 0,
            max: 1,
        });
    }

    Ok(())
}

// =============================================================================
// Product Validators
// =============================================================================

/// Validates a product SKU (the checkout item id).
///
/// ## Rules
/// - Must not be empty
/// - At most [`MAX_SKU_LENGTH`] characters
/// - No whitespace
///
/// ## Example
/// ```rust
/// use snipwire_core::validation::validate_sku;
///
/// assert!(validate_sku("MUG-01").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("has space").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.chars().count() > MAX_SKU_LENGTH {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LENGTH,
        });
    }

    if sku.chars().any(char::is_whitespace) {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

/// Validates a product's quantity constraints.
///
/// ## Rules
/// - `min <= max` when both are set
/// - `step > 0` when set
/// - the default quantity lies within `min..=max`
pub fn validate_quantity_rules(
    default: i64,
    min: Option<i64>,
    max: Option<i64>,
    step: Option<i64>,
) -> ValidationResult<()> {
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(ValidationError::OutOfRange {
                field: "min quantity".to_string(),
                min: 1,
                max,
            });
        }
    }

    if let Some(step) = step {
        if step <= 0 {
            return Err(ValidationError::OutOfRange {
                field: "quantity step".to_string(),
                min: 1,
                max: i64::MAX,
            });
        }
    }

    let lower = min.unwrap_or(1);
    let upper = max.unwrap_or(i64::MAX);
    if default < lower || default > upper {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: lower,
            max: upper,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
