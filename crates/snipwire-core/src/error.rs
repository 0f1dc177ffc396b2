//! # Error Types
//!
//! Domain-specific error types for snipwire-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  snipwire-core errors (this file)                                      │
//! │  ├── CoreError        - Configuration failures                         │
//! │  └── ValidationError  - Currency/tax/product rule violations           │
//! │                                                                         │
//! │  snipwire-config errors (separate crate)                               │
//! │  └── ConfigError      - File, TOML and environment failures            │
//! │                                                                         │
//! │  Render paths never surface these: they degrade to empty output        │
//! │  or a marked fallback and log the cause.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised while building configuration.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No currency definition exists for the requested code.
    ///
    /// ## When This Occurs
    /// - A shop currency is selected but its format was never configured
    /// - A single-value price is formatted against an unknown code
    #[error("Currency not configured: {0}")]
    CurrencyNotConfigured(String),

    /// A configuration value exists but has the wrong shape.
    #[error("Invalid config value for {key}: {reason}")]
    InvalidConfig { key: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates an InvalidConfig error for a given key.
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for configured definitions and product fields.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., bad currency code, template without value).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., two definitions for one currency code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::CurrencyNotConfigured("usd".to_string());
        assert_eq!(err.to_string(), "Currency not configured: usd");

        let err = CoreError::invalid_config("currencies", "expected a list");
        assert_eq!(
            err.to_string(),
            "Invalid config value for currencies: expected a list"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Duplicate {
            field: "currency".to_string(),
            value: "eur".to_string(),
        };
        assert_eq!(err.to_string(), "currency 'eur' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "sku".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
