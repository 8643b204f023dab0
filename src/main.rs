//! Storefront database initializer.
//!
//! Creates the schema, seeds the sample catalog from config.toml when the catalog is
//! empty, and reports what the database holds. Pass `reset` to drop all tables first.

use storefront::{
    config::{database, store},
    core::{catalog, order},
    errors::Result,
};
use dotenvy::dotenv;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    if dotenv().is_err() {
        info!("No .env file loaded, using process environment.");
    }

    // 3. Load the store configuration
    let store_config = store::load_default_config()
        .inspect_err(|e| error!("Failed to load store configuration: {}", e))?;
    info!(
        "Loaded store configuration with {} seed products.",
        store_config.products.len()
    );

    // 4. Connect and (re)create the schema
    let db = database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;

    if std::env::args().nth(1).as_deref() == Some("reset") {
        warn!("Dropping all storefront tables.");
        database::drop_tables(&db).await?;
    }

    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database tables ready."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 5. Seed the catalog if it is empty
    catalog::seed_catalog(&db, &store_config)
        .await
        .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;

    // 6. Summary
    let products = catalog::list_active_products(&db, None).await?;
    let categories = catalog::list_categories(&db).await?;
    let orders = order::count_orders(&db).await?;
    info!(
        "Database initialization complete: {} active products in {} categories, {} orders.",
        products.len(),
        categories.len(),
        orders
    );

    Ok(())
}
