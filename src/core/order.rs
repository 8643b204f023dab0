//! Order business logic - Lookups and administrative status transitions.
//!
//! Orders are only ever created by checkout. After that the status column is the single
//! mutable field, and it may only move along the fixed lifecycle graph.

use crate::{
    core::checkout::is_valid_order_number,
    entities::{Order, OrderItem, OrderStatus, order, order_item},
    errors::{Error, Result},
};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Serialize;

/// Page size used by the admin order listing.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// One page of the admin order listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderPage {
    /// Orders on this page, newest first
    pub orders: Vec<order::Model>,
    /// 1-based page number that was fetched
    pub page: u64,
    /// Orders matching the filters across all pages
    pub total_orders: u64,
    /// Number of pages at the requested page size
    pub total_pages: u64,
}

/// Retrieves an order by id.
pub async fn get_order(db: &DatabaseConnection, order_id: i64) -> Result<order::Model> {
    Order::find_by_id(order_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            reference: order_id.to_string(),
        })
}

/// Retrieves an order by its human-facing number, e.g. for support lookups.
///
/// Malformed numbers are reported as not found without touching the database.
pub async fn get_order_by_number(db: &DatabaseConnection, order_number: &str) -> Result<order::Model> {
    let not_found = || Error::OrderNotFound {
        reference: order_number.to_string(),
    };
    if !is_valid_order_number(order_number) {
        return Err(not_found());
    }

    Order::find()
        .filter(order::Column::OrderNumber.eq(order_number))
        .one(db)
        .await?
        .ok_or_else(not_found)
}

/// Lines of an order in the order they were written.
pub async fn get_order_items(db: &DatabaseConnection, order_id: i64) -> Result<Vec<order_item::Model>> {
    OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an order together with its lines.
pub async fn get_order_with_items(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<(order::Model, Vec<order_item::Model>)> {
    let order = get_order(db, order_id).await?;
    let items = get_order_items(db, order.id).await?;
    Ok((order, items))
}

/// All orders placed with a customer email, newest first.
pub async fn orders_by_email(db: &DatabaseConnection, email: &str) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::CustomerEmail.eq(email.trim()))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// All orders placed by an authenticated user, newest first.
pub async fn orders_for_user(db: &DatabaseConnection, user_id: i64) -> Result<Vec<order::Model>> {
    Order::find()
        .filter(order::Column::UserId.eq(user_id))
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves an order only if it belongs to the given user.
///
/// Someone else's order is reported as not found, same as a missing one.
pub async fn get_user_order(
    db: &DatabaseConnection,
    user_id: i64,
    order_id: i64,
) -> Result<order::Model> {
    Order::find_by_id(order_id)
        .filter(order::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            reference: order_id.to_string(),
        })
}

/// Admin order listing, newest first.
///
/// `status` narrows to one status. `search` matches a substring of the order number,
/// customer name or customer email; a blank search is ignored. `page` is 1-based and a
/// page past the end comes back empty.
pub async fn list_orders(
    db: &DatabaseConnection,
    status: Option<OrderStatus>,
    search: Option<&str>,
    page: u64,
    per_page: u64,
) -> Result<OrderPage> {
    let mut query = Order::find();
    if let Some(status) = status {
        query = query.filter(order::Column::Status.eq(status));
    }
    if let Some(term) = search.map(str::trim).filter(|term| !term.is_empty()) {
        query = query.filter(
            Condition::any()
                .add(order::Column::OrderNumber.contains(term))
                .add(order::Column::CustomerName.contains(term))
                .add(order::Column::CustomerEmail.contains(term)),
        );
    }

    let page = page.max(1);
    let paginator = query
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .paginate(db, per_page.max(1));
    let totals = paginator.num_items_and_pages().await?;
    let orders = paginator.fetch_page(page - 1).await?;

    Ok(OrderPage {
        orders,
        page,
        total_orders: totals.number_of_items,
        total_pages: totals.number_of_pages,
    })
}

/// The most recent orders, for the dashboard.
pub async fn recent_orders(db: &DatabaseConnection, limit: u64) -> Result<Vec<order::Model>> {
    Order::find()
        .order_by_desc(order::Column::CreatedAt)
        .order_by_desc(order::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Number of orders currently in `status`.
pub async fn count_orders_by_status(db: &DatabaseConnection, status: OrderStatus) -> Result<u64> {
    Order::find()
        .filter(order::Column::Status.eq(status))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Total number of orders in the store.
pub async fn count_orders(db: &DatabaseConnection) -> Result<u64> {
    Order::find().count(db).await.map_err(Into::into)
}

/// Moves an order to a new status.
///
/// `new_status` must be one of `pending`, `confirmed`, `shipped`, `delivered` or
/// `cancelled`, and must be reachable from the current status. Re-applying the current
/// status is a no-op.
///
/// # Errors
/// - [`Error::InvalidStatus`] for text outside the fixed set
/// - [`Error::InvalidTransition`] for a known status that cannot follow the current one
/// - [`Error::OrderNotFound`] if the order does not exist
pub async fn set_status(
    db: &DatabaseConnection,
    order_id: i64,
    new_status: &str,
) -> Result<order::Model> {
    let next = OrderStatus::parse(new_status.trim()).ok_or_else(|| Error::InvalidStatus {
        status: new_status.to_string(),
    })?;

    let txn = db.begin().await?;

    let order = Order::find_by_id(order_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::OrderNotFound {
            reference: order_id.to_string(),
        })?;

    if order.status == next {
        txn.commit().await?;
        return Ok(order);
    }

    if !order.status.can_transition_to(next) {
        return Err(Error::InvalidTransition {
            from: order.status,
            to: next,
        });
    }

    let previous = order.status;
    let mut active: order::ActiveModel = order.into();
    active.status = Set(next);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        "Order {} moved from {} to {}",
        updated.order_number,
        previous,
        next
    );
    Ok(updated)
}
