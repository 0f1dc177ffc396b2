//! # snipwire-render
//!
//! Renders checkout markup for a page snapshot, for previewing settings
//! without the host CMS.
//!
//! ## Usage
//! ```bash
//! # Buy button for a product snapshot, default config location
//! cargo run -p snipwire-config --bin snipwire-render -- --product mug.json
//!
//! # Price in another currency, explicit config file
//! cargo run -p snipwire-config --bin snipwire-render -- \
//!     --config ./snipwire.toml --product mug.json --currency usd
//!
//! # <head> resources only
//! cargo run -p snipwire-config --bin snipwire-render -- --resources
//! ```
//!
//! The product file is a JSON [`PageRecord`].

use std::env;
use std::path::PathBuf;

use snipwire_config::{init_tracing, FileConfigStore};
use snipwire_core::{
    formatted_product_price, price_breakdown, render_anchor, render_resources, AnchorKind,
    AnchorOverrides, DefaultTranslator, PageRecord, ProductAttributeBuilder, ShopConfig,
};
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut config_path: Option<PathBuf> = None;
    let mut product_path: Option<PathBuf> = None;
    let mut currency: Option<String> = None;
    let mut link = false;
    let mut resources = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--product" | "-p" => {
                if i + 1 < args.len() {
                    product_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--currency" => {
                if i + 1 < args.len() {
                    currency = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--link" => link = true,
            "--resources" | "-r" => resources = true,
            "--help" | "-h" => {
                println!("SnipWire markup renderer");
                println!();
                println!("Usage: snipwire-render [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("  -p, --product <PATH>   Page snapshot (JSON) to render");
                println!("      --currency <CODE>  Display currency (default: shop default)");
                println!("      --link             Render an <a> instead of a <button>");
                println!("  -r, --resources        Print the checkout <head> resources");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {other}"),
        }
        i += 1;
    }

    let store = FileConfigStore::load(config_path)?;
    let shop = ShopConfig::from_store(&store)?;
    info!(currencies = ?shop.currencies, "Shop config loaded");

    if resources {
        println!("{}", render_resources(&shop));
    }

    let Some(path) = product_path else {
        if !resources {
            eprintln!("Nothing to render: pass --product <PATH> or --resources");
        }
        return Ok(());
    };

    let page: PageRecord = serde_json::from_str(&std::fs::read_to_string(&path)?)?;
    let code = currency.unwrap_or_else(|| shop.default_currency().to_string());

    let attrs = ProductAttributeBuilder::new(&shop).build(&page);
    if attrs.is_empty() {
        println!("Template '{}' is not a product template.", page.template);
        return Ok(());
    }

    println!("Price:      {}", formatted_product_price(&page, &shop, &code, &DefaultTranslator));
    if let Some(split) = price_breakdown(&page, &shop, &code) {
        println!("Net:        {}", split.net);
        println!("Tax:        {} ({})", split.tax, split.tax_name.as_deref().unwrap_or("none"));
        println!("Gross:      {}", split.gross);
    }
    println!();
    for (name, value) in attrs.iter() {
        println!("{name:<32} {value}");
    }
    println!();

    let mut overrides = AnchorOverrides::new();
    if link {
        overrides = overrides.kind(AnchorKind::Link);
    }
    println!("{}", render_anchor(&page, &shop, overrides, &DefaultTranslator));

    Ok(())
}
