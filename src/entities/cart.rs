//! Cart entity - One shopper's in-progress selection.
//!
//! A cart is owned by exactly one of an authenticated user id or an anonymous session token.
//! Both owner columns are unique so that lookup-or-create can be written as an upsert.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Cart database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "carts")]
pub struct Model {
    /// Unique identifier for the cart
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Authenticated owner, None for anonymous carts
    #[sea_orm(unique)]
    pub user_id: Option<i64>,
    /// Anonymous session token, None for user carts
    #[sea_orm(unique)]
    pub session_token: Option<String>,
    /// When the cart was first created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Cart and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One cart has many lines
    #[sea_orm(has_many = "super::cart_item::Entity")]
    CartItems,
}

impl Related<super::cart_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CartItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
