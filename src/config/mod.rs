/// Database configuration and connection management
pub mod database;

/// Store configuration (catalog seed and pricing rates) from config.toml
pub mod store;
