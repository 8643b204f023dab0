//! Database configuration module for the storefront.
//!
//! This module handles `SQLite` database connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the schema always matches the Rust structs. The one constraint the entity macros cannot
//! express, uniqueness of `(cart_id, product_id)` on cart lines, is added as a separate index.

use crate::entities::{Cart, CartItem, Order, OrderItem, Product, cart_item};
use crate::errors::Result;
use sea_orm::sea_query::{Alias, Index, Table};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityName, Schema};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/storefront.sqlite?mode=rwc";

/// Name of the unique index enforcing one line per product per cart.
pub const CART_PRODUCT_INDEX: &str = "idx_cart_items_cart_product";

/// Gets the database URL from the `DATABASE_URL` environment variable, or the default
/// local `SQLite` file when it is not set.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    tracing::debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all storefront tables (if missing) plus the cart line uniqueness index.
///
/// Products are created first since every other table references them.
pub async fn create_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut statements = vec![
        schema.create_table_from_entity(Product),
        schema.create_table_from_entity(Cart),
        schema.create_table_from_entity(CartItem),
        schema.create_table_from_entity(Order),
        schema.create_table_from_entity(OrderItem),
    ];
    for statement in &mut statements {
        statement.if_not_exists();
        db.execute(builder.build(&*statement)).await?;
    }

    let cart_product_index = Index::create()
        .name(CART_PRODUCT_INDEX)
        .table(CartItem)
        .col(cart_item::Column::CartId)
        .col(cart_item::Column::ProductId)
        .unique()
        .if_not_exists()
        .to_owned();
    db.execute(builder.build(&cart_product_index)).await?;

    Ok(())
}

/// Drops every storefront table, children before parents.
pub async fn drop_tables<C>(db: &C) -> Result<()>
where
    C: ConnectionTrait,
{
    let builder = db.get_database_backend();
    for table in [
        OrderItem.table_name(),
        Order.table_name(),
        CartItem.table_name(),
        Cart.table_name(),
        Product.table_name(),
    ] {
        let statement = Table::drop().table(Alias::new(table)).if_exists().to_owned();
        db.execute(builder.build(&statement)).await?;
    }
    Ok(())
}
