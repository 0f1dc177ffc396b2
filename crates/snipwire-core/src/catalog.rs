//! # Catalog
//!
//! Currency format and tax definitions, loaded once and shared read-only.
//!
//! ## Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  first Catalog::shared(store)                                          │
//! │       │                                                                 │
//! │       ├── Catalog::load(store) OK ────► memoize Arc<Catalog>            │
//! │       │                                                                 │
//! │       └── invalid definitions ────────► warn!, memoize built-in         │
//! │                                         EUR + 20% VAT                   │
//! │                                                                         │
//! │  later Catalog::shared(_) ─────────────► clone of the same Arc          │
//! │                                                                         │
//! │  Catalog::reload(store) ───────────────► new Arc swapped in whole;      │
//! │                                         readers holding the old Arc     │
//! │                                         keep a consistent snapshot      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Thread Safety
//! The catalog is never mutated after construction. The lock only guards
//! which `Arc` is current, so readers never observe a half-built catalog.

use std::sync::{Arc, RwLock};
use tracing::{debug, info, warn};

use crate::config::{keys, records_from_value, ConfigStore, MODULE_NAME};
use crate::currency::{CurrencyDefinition, Currencies};
use crate::error::CoreResult;
use crate::tax::{TaxDefinition, Taxes};

static SHARED: RwLock<Option<Arc<Catalog>>> = RwLock::new(None);

/// Currency and tax definitions of one shop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub currencies: Currencies,
    pub taxes: Taxes,
}

impl Catalog {
    /// Loads and validates the definitions from the store.
    ///
    /// Missing or empty sources fall back to the built-in EUR format and the
    /// built-in 20% VAT; malformed ones are errors.
    pub fn load(store: &dyn ConfigStore) -> CoreResult<Self> {
        let currency_defs: Vec<CurrencyDefinition> =
            match store.get(MODULE_NAME, keys::CURRENCY_DEFINITIONS) {
                Some(value) => records_from_value(keys::CURRENCY_DEFINITIONS, value)?,
                None => Vec::new(),
            };
        let tax_defs: Vec<TaxDefinition> = match store.get(MODULE_NAME, keys::TAXES) {
            Some(value) => records_from_value(keys::TAXES, value)?,
            None => Vec::new(),
        };

        if currency_defs.is_empty() {
            debug!("No currency definitions configured, using built-in EUR");
        }
        if tax_defs.is_empty() {
            debug!("No taxes configured, using built-in 20% VAT");
        }

        Ok(Catalog {
            currencies: Currencies::new(currency_defs)?,
            taxes: Taxes::new(tax_defs)?,
        })
    }

    /// Returns the process-wide catalog, loading it on first access.
    pub fn shared(store: &dyn ConfigStore) -> Arc<Catalog> {
        if let Some(catalog) = SHARED.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            return Arc::clone(catalog);
        }

        let mut slot = SHARED.write().unwrap_or_else(|e| e.into_inner());
        // Another caller may have loaded while we waited for the write lock.
        if let Some(catalog) = slot.as_ref() {
            return Arc::clone(catalog);
        }

        let catalog = Arc::new(Catalog::load(store).unwrap_or_else(|e| {
            warn!("Failed to load currency/tax catalog: {}. Using defaults.", e);
            Catalog::default()
        }));
        info!(
            currencies = catalog.currencies.len(),
            taxes = catalog.taxes.len(),
            "Catalog loaded"
        );
        *slot = Some(Arc::clone(&catalog));
        catalog
    }

    /// Reloads from the store and replaces the shared catalog.
    ///
    /// On error the current catalog stays in place.
    pub fn reload(store: &dyn ConfigStore) -> CoreResult<Arc<Catalog>> {
        let catalog = Arc::new(Catalog::load(store)?);
        *SHARED.write().unwrap_or_else(|e| e.into_inner()) = Some(Arc::clone(&catalog));
        info!(
            currencies = catalog.currencies.len(),
            taxes = catalog.taxes.len(),
            "Catalog reloaded"
        );
        Ok(catalog)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
