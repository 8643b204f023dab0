//! Store configuration loading from config.toml
//!
//! The store file carries the sample catalog used to seed an empty database and the
//! placeholder pricing rates used for checkout quotes. Every section is optional.

use crate::core::pricing::PricingRates;
use crate::errors::{Error, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::Path;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
pub struct StoreConfig {
    /// Placeholder tax and shipping rates
    #[serde(default)]
    pub pricing: PricingRates,
    /// Products inserted when the catalog is empty
    #[serde(default)]
    pub products: Vec<ProductSeed>,
}

/// Configuration for a single seeded product
#[derive(Debug, Deserialize, Clone)]
pub struct ProductSeed {
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Decimal,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Units on hand
    #[serde(default)]
    pub stock_quantity: i32,
    /// Optional category label
    #[serde(default)]
    pub category: Option<String>,
}

/// Loads store configuration from a TOML file
///
/// # Errors
/// Returns [`Error::Config`] if the file cannot be read or is not valid TOML for
/// [`StoreConfig`].
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<StoreConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load store configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path_ref.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Loads store configuration from `STOREFRONT_CONFIG`, falling back to ./config.toml
pub fn load_default_config() -> Result<StoreConfig> {
    let path =
        std::env::var("STOREFRONT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    load_config(path)
}
