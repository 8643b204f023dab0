//! Cart item entity - One product line within a cart.
//!
//! At most one row exists per `(cart_id, product_id)`; the unique index backing this is
//! created alongside the tables in [`crate::config::database::create_tables`].

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cart_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Cart this line belongs to
    pub cart_id: i64,
    /// Product referenced by this line
    pub product_id: i64,
    /// Number of units, always at least 1
    pub quantity: i32,
    /// When the line was first added
    pub created_at: DateTimeUtc,
    /// When the quantity last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `CartItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one cart
    #[sea_orm(
        belongs_to = "super::cart::Entity",
        from = "Column::CartId",
        to = "super::cart::Column::Id",
        on_delete = "Cascade"
    )]
    Cart,
    /// Each line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::cart::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Cart.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
