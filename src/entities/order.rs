//! Order entity - Immutable record of a completed checkout.
//!
//! Customer contact fields are a snapshot taken at checkout time. `status` is the only
//! column that changes after creation, and only through administrative transitions.

use sea_orm::entity::prelude::*;
use sea_orm::Iterable;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order lifecycle status.
///
/// `Pending -> Confirmed -> Shipped -> Delivered`, with `Cancelled` reachable from
/// `Pending` or `Confirmed`. `Delivered` and `Cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "Text")]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Initial status of every new order
    #[sea_orm(string_value = "pending")]
    Pending,
    /// Accepted by the store
    #[sea_orm(string_value = "confirmed")]
    Confirmed,
    /// Handed to the carrier
    #[sea_orm(string_value = "shipped")]
    Shipped,
    /// Received by the customer
    #[sea_orm(string_value = "delivered")]
    Delivered,
    /// Withdrawn before shipping
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl OrderStatus {
    /// The lowercase wire/storage name of this status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Parses a status name, returning None for anything outside the fixed set.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::iter().find(|status| status.as_str() == value)
    }

    /// Whether no further transitions are allowed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Whether an administrator may move an order from `self` to `next`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed | Self::Cancelled)
                | (Self::Confirmed, Self::Shipped | Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Order database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-facing reference, `ORD-YYYYMMDD-XXXXXXXX`
    #[sea_orm(unique)]
    pub order_number: String,
    /// Authenticated buyer, None for anonymous checkout
    pub user_id: Option<i64>,
    /// Customer name at checkout time
    pub customer_name: String,
    /// Customer email at checkout time
    pub customer_email: String,
    /// Optional customer phone at checkout time
    pub customer_phone: Option<String>,
    /// Shipping address at checkout time
    pub shipping_address: String,
    /// Sum of line price x quantity, frozen at checkout
    #[sea_orm(column_type = "Double")]
    pub total_amount: Decimal,
    /// Current lifecycle status
    pub status: OrderStatus,
    /// When the order was placed
    pub created_at: DateTimeUtc,
    /// When the status last changed
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One order has many lines
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
