//! # snipwire-core: Storefront Logic for SnipWire
//!
//! Formats prices and assembles the checkout markup that page templates embed
//! for the Snipcart checkout script. No I/O happens here: configuration and
//! page data come in through the [`ConfigStore`] and [`ContentRecord`] traits.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SnipWire Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Host CMS page templates                         │   │
//! │  │     product page ──► price label ──► buy button ──► <head>      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ ContentRecord / ConfigStore            │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ snipwire-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ currency  │  │  product  │  │  pricing  │  │  markup   │  │   │
//! │  │   │ formatter │  │ attribute │  │ breakdown │  │  anchor   │  │   │
//! │  │   │   Price   │  │  builder  │  │   taxes   │  │ resources │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO FILES • NO DATABASE • NO NETWORK • PURE FUNCTIONS         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              snipwire-config (TOML file store, CLI)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`currency`] - Currency definitions, [`Price`], the formatter
//! - [`product`] - `data-item-*` attribute assembly
//! - [`pricing`] - Price fields of a page, display price, tax split
//! - [`markup`] - Add-to-cart element and checkout resources
//! - [`options`] - Anchor options and their merge rules
//! - [`config`] - Config store trait and the resolved [`ShopConfig`]
//! - [`catalog`] - Process-wide currency and tax definitions
//! - [`tax`] - Tax definitions and rates
//! - [`money`] - Exact decimal amounts
//! - [`types`] - Page view ([`ContentRecord`]) and field values
//! - [`i18n`] - Label translation
//! - [`validation`] - Rule checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use snipwire_core::currency::{Currencies, Price};
//! use snipwire_core::money::Money;
//!
//! let currencies = Currencies::default();
//! let price = Price::Single(Money::from(1199));
//! assert_eq!(currencies.format(&price, "eur"), "€ 1.199,00");
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod config;
pub mod currency;
pub mod error;
pub mod i18n;
pub mod markup;
pub mod money;
pub mod options;
pub mod pricing;
pub mod product;
pub mod tax;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use config::{ConfigStore, MemoryConfigStore, ShopConfig};
pub use currency::{Currencies, CurrencyDefinition, FormattedPrice, Price};
pub use error::{CoreError, CoreResult, ValidationError};
pub use i18n::{DefaultTranslator, Translator};
pub use markup::{render_anchor, render_resources};
pub use money::Money;
pub use options::{AnchorKind, AnchorOptions, AnchorOverrides};
pub use pricing::{formatted_product_price, price_breakdown, product_price, PriceBreakdown};
pub use product::{ItemAttributes, ProductAttributeBuilder};
pub use tax::{TaxDefinition, TaxRate, Taxes};
pub use types::{ContentRecord, FieldState, FieldValue, PageMeta, PageRecord};
