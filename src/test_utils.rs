//! Shared test utilities for the storefront.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{catalog, checkout, identity::OwnerKey},
    entities,
    errors::Result,
};
use rust_decimal::Decimal;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};

/// Creates an in-memory `SQLite` database with all tables initialized.
///
/// The pool is pinned to a single connection: every connection to `sqlite::memory:`
/// would otherwise open its own empty database.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let db = Database::connect(options).await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Money helper: `price(2999)` is 29.99.
#[must_use]
pub fn price(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// Anonymous owner with a fixed session token.
#[must_use]
pub fn session_owner(token: &str) -> OwnerKey {
    OwnerKey::Session(token.to_string())
}

/// Creates an active test product in category "Test" with 10 units of stock.
pub async fn create_test_product(
    db: &DatabaseConnection,
    name: &str,
    unit_price: Decimal,
) -> Result<entities::product::Model> {
    catalog::create_product(
        db,
        name.to_string(),
        unit_price,
        None,
        10,
        Some("Test".to_string()),
    )
    .await
}

/// Customer details that pass checkout validation.
#[must_use]
pub fn sample_customer() -> checkout::CustomerData {
    checkout::CustomerData {
        name: "John Doe".to_string(),
        email: "john@example.com".to_string(),
        phone: Some("123-456-7890".to_string()),
        address: "123 Main St, City, State 12345".to_string(),
    }
}

/// Sets up a database with two products.
/// Returns (db, product A at 29.99, product B at 39.99).
pub async fn setup_with_products() -> Result<(
    DatabaseConnection,
    entities::product::Model,
    entities::product::Model,
)> {
    let db = setup_test_db().await?;
    let product_a = create_test_product(&db, "Test Product 1", price(2999)).await?;
    let product_b = create_test_product(&db, "Test Product 2", price(3999)).await?;
    Ok((db, product_a, product_b))
}

/// Sets up a database holding one pending order for A x2 + B x1 (total 99.97).
pub async fn setup_with_order() -> Result<(DatabaseConnection, entities::order::Model)> {
    let (db, product_a, product_b) = setup_with_products().await?;
    let owner = session_owner("order-fixture");
    crate::core::cart::add_item(&db, &owner, product_a.id, 2).await?;
    crate::core::cart::add_item(&db, &owner, product_b.id, 1).await?;
    let placed = checkout::create_order(&db, &owner, &sample_customer()).await?;
    Ok((db, placed.order))
}
