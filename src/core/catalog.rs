//! Catalog access - Product lookups the cart and checkout depend on.
//!
//! The catalog itself is administered elsewhere; this module provides the read side the
//! core needs (`get_product`) together with the small set of writes used for seeding and
//! for administrative price and availability changes. Products are soft-deleted through
//! `is_active` because carts and orders keep referencing them.

use crate::{
    config::store::StoreConfig,
    entities::{Product, product},
    errors::{Error, Result},
};
use rust_decimal::Decimal;
use sea_orm::{PaginatorTrait, QueryOrder, QuerySelect, Set, prelude::*};

/// Fetches an active product, failing with [`Error::ProductNotFound`] if it is missing
/// or has been deactivated.
///
/// Generic over the connection so checkout can re-read prices inside its transaction.
pub async fn get_product<C>(db: &C, product_id: i64) -> Result<product::Model>
where
    C: ConnectionTrait,
{
    find_product(db, product_id)
        .await?
        .filter(|product| product.is_active)
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// Finds a product by id regardless of its active flag.
pub async fn find_product<C>(db: &C, product_id: i64) -> Result<Option<product::Model>>
where
    C: ConnectionTrait,
{
    Product::find_by_id(product_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists active products ordered by name, optionally restricted to one category.
pub async fn list_active_products(
    db: &DatabaseConnection,
    category: Option<&str>,
) -> Result<Vec<product::Model>> {
    let mut query = Product::find().filter(product::Column::IsActive.eq(true));
    if let Some(category) = category {
        query = query.filter(product::Column::Category.eq(category));
    }
    query
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Distinct categories of active products, sorted alphabetically.
pub async fn list_categories(db: &DatabaseConnection) -> Result<Vec<String>> {
    let categories: Vec<Option<String>> = Product::find()
        .select_only()
        .column(product::Column::Category)
        .distinct()
        .filter(product::Column::IsActive.eq(true))
        .filter(product::Column::Category.is_not_null())
        .order_by_asc(product::Column::Category)
        .into_tuple()
        .all(db)
        .await?;

    Ok(categories
        .into_iter()
        .flatten()
        .filter(|category| !category.trim().is_empty())
        .collect())
}

/// Creates a new active product after validating its name and price.
///
/// # Errors
/// Returns an error if:
/// - The product name is empty or whitespace-only
/// - The price is negative
/// - The database insert fails
pub async fn create_product(
    db: &DatabaseConnection,
    name: String,
    price: Decimal,
    description: Option<String>,
    stock_quantity: i32,
    category: Option<String>,
) -> Result<product::Model> {
    if name.trim().is_empty() {
        return Err(Error::Config {
            message: "Product name cannot be empty".to_string(),
        });
    }

    if price.is_sign_negative() {
        return Err(Error::Config {
            message: format!("Product price cannot be negative: {price}"),
        });
    }

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        name: Set(name.trim().to_string()),
        description: Set(description),
        price: Set(price),
        stock_quantity: Set(stock_quantity),
        category: Set(category),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    product.insert(db).await.map_err(Into::into)
}

/// Changes a product's live price. Carts pick this up immediately; orders do not.
pub async fn update_price(
    db: &DatabaseConnection,
    product_id: i64,
    new_price: Decimal,
) -> Result<product::Model> {
    if new_price.is_sign_negative() {
        return Err(Error::Config {
            message: format!("Product price cannot be negative: {new_price}"),
        });
    }

    let mut product: product::ActiveModel = get_product(db, product_id).await?.into();
    product.price = Set(new_price);
    product.updated_at = Set(chrono::Utc::now());
    product.update(db).await.map_err(Into::into)
}

/// Soft deletes a product. It stays referenced by existing carts and orders but can no
/// longer be added or checked out.
pub async fn deactivate_product(db: &DatabaseConnection, product_id: i64) -> Result<product::Model> {
    let mut product: product::ActiveModel = get_product(db, product_id).await?.into();
    product.is_active = Set(false);
    product.updated_at = Set(chrono::Utc::now());
    product.update(db).await.map_err(Into::into)
}

/// Inserts the configured sample products when the catalog is empty.
///
/// Returns the number of products inserted; zero when products already exist.
pub async fn seed_catalog(db: &DatabaseConnection, config: &StoreConfig) -> Result<usize> {
    let existing = Product::find().count(db).await?;
    if existing > 0 {
        tracing::info!("Catalog already has {} products, skipping seed", existing);
        return Ok(0);
    }

    for seed in &config.products {
        create_product(
            db,
            seed.name.clone(),
            seed.price,
            seed.description.clone(),
            seed.stock_quantity,
            seed.category.clone(),
        )
        .await?;
    }

    tracing::info!("Seeded {} sample products", config.products.len());
    Ok(config.products.len())
}
