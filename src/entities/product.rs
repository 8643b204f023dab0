//! Product entity - Catalog items that can be placed in carts.
//!
//! Products are owned by the catalog. Carts and orders only hold references to them, so
//! products are never hard-deleted; retiring a product clears its `is_active` flag instead.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Canvas Tote Bag")
    pub name: String,
    /// Optional long-form description
    pub description: Option<String>,
    /// Current unit price
    // SQLite has no decimal type; stored as REAL and read back into `Decimal`
    #[sea_orm(column_type = "Double")]
    pub price: Decimal,
    /// Units on hand; informational only
    pub stock_quantity: i32,
    /// Optional category label used for browsing
    pub category: Option<String>,
    /// Soft delete flag - inactive products cannot be added to carts or ordered
    pub is_active: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A product can sit in many carts
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
    /// A product can appear on many orders
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
