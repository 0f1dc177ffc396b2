//! # snipwire-config: File-Backed Settings for SnipWire
//!
//! Implements [`snipwire_core::ConfigStore`] over a TOML file with
//! `SNIPWIRE_*` environment overrides, and installs the tracing subscriber
//! used by the command-line tools.
//!
//! ## Example Usage
//!
//! ```rust
//! use snipwire_config::FileConfigStore;
//! use snipwire_core::ShopConfig;
//!
//! let store = FileConfigStore::from_toml_str(r#"
//! [SnipWire]
//! currencies = ["eur"]
//! taxes_included = true
//! "#).unwrap();
//!
//! let shop = ShopConfig::from_store(&store).unwrap();
//! assert!(shop.taxes_included);
//! ```

pub mod error;
pub mod store;

pub use error::{ConfigError, ConfigResult};
pub use store::{FileConfigStore, CONFIG_FILE_NAME};

use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber, filtered by `RUST_LOG`.
///
/// Falls back to `info,snipwire=debug`. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,snipwire=debug"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
