//! Order item entity - A priced, frozen line within an order.
//!
//! `price` is copied from the product at checkout and never follows later catalog changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order item database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_items")]
pub struct Model {
    /// Unique identifier for the line
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Order this line belongs to
    pub order_id: i64,
    /// Product that was ordered
    pub product_id: i64,
    /// Units ordered
    pub quantity: i32,
    /// Unit price snapshot taken at checkout
    #[sea_orm(column_type = "Double")]
    pub price: Decimal,
    /// When the line was written
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Frozen `price * quantity` for this line.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        crate::core::pricing::line_total(self.price, self.quantity)
    }
}

/// Defines relationships between `OrderItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// Each line references one product
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
