//! Checkout - Converts a cart into an immutable, priced order.
//!
//! `create_order` runs as one transaction: resolve the cart, validate the customer, take a
//! price snapshot of every line (re-reading each product inside the transaction), write the
//! order and its lines, then clear the cart. Any failure rolls the whole transaction back,
//! leaving no order rows and the cart exactly as it was.

use crate::{
    core::{cart, catalog, identity::OwnerKey, pricing},
    entities::{OrderItem, OrderStatus, cart_item, order, order_item},
    errors::{Error, Result},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{DatabaseTransaction, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ORDER_NUMBER_PREFIX: &str = "ORD";
const ORDER_SUFFIX_LEN: usize = 8;

/// Contact and shipping details supplied at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    /// Customer's full name (required)
    pub name: String,
    /// Contact email (required)
    pub email: String,
    /// Contact phone (optional)
    #[serde(default)]
    pub phone: Option<String>,
    /// Shipping address (required)
    pub address: String,
}

impl CustomerData {
    /// Trims every field and checks that name, email and address are present.
    ///
    /// All missing fields are reported together. A blank phone becomes `None`.
    pub fn validated(&self) -> Result<Self> {
        let name = self.name.trim();
        let email = self.email.trim();
        let address = self.address.trim();

        let missing: Vec<&'static str> = [("name", name), ("email", email), ("address", address)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(field, _)| field)
            .collect();
        if !missing.is_empty() {
            return Err(Error::InvalidCustomerData { missing });
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
            phone: self
                .phone
                .as_deref()
                .map(str::trim)
                .filter(|phone| !phone.is_empty())
                .map(str::to_string),
            address: address.to_string(),
        })
    }
}

/// A freshly created order together with its lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedOrder {
    /// The order row
    pub order: order::Model,
    /// Its price-snapshotted lines
    pub items: Vec<order_item::Model>,
}

/// Generates an order number of the form `ORD-YYYYMMDD-XXXXXXXX`.
///
/// The suffix is the first eight hex digits of a random UUID, uppercased. No retry loop is
/// needed at this keyspace; the unique column on `orders.order_number` is the backstop.
#[must_use]
pub fn generate_order_number(placed_at: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(ORDER_SUFFIX_LEN)
        .collect();
    format!(
        "{ORDER_NUMBER_PREFIX}-{}-{}",
        placed_at.format("%Y%m%d"),
        suffix.to_ascii_uppercase()
    )
}

/// Checks that a string has the exact `ORD-YYYYMMDD-XXXXXXXX` shape.
#[must_use]
pub fn is_valid_order_number(value: &str) -> bool {
    let mut parts = value.split('-');
    let (Some(prefix), Some(date), Some(suffix), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };

    prefix == ORDER_NUMBER_PREFIX
        && date.len() == 8
        && date.chars().all(|c| c.is_ascii_digit())
        && chrono::NaiveDate::parse_from_str(date, "%Y%m%d").is_ok()
        && suffix.len() == ORDER_SUFFIX_LEN
        && suffix
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

/// Prices the owner's cart for the checkout page: live totals plus placeholder tax and
/// shipping. Informational only; the order total is the item subtotal.
pub async fn quote_checkout(
    db: &DatabaseConnection,
    owner: &OwnerKey,
    rates: &pricing::PricingRates,
) -> Result<(pricing::CartSummary, pricing::Quote)> {
    let summary = cart::summarize(db, owner).await?;
    let quote = pricing::quote(summary.total_price, rates);
    Ok((summary, quote))
}

/// Converts the owner's cart into an order.
///
/// # Errors
/// - [`Error::EmptyCart`] if the owner has no cart or it has no lines
/// - [`Error::InvalidCustomerData`] naming every missing required field
/// - [`Error::ProductNotFound`] if a product in the cart was removed or deactivated
/// - [`Error::CartChanged`] if the cart was modified concurrently
/// - [`Error::Database`] on storage failure
///
/// In every error case the transaction is rolled back and nothing is written.
pub async fn create_order(
    db: &DatabaseConnection,
    owner: &OwnerKey,
    customer: &CustomerData,
) -> Result<PlacedOrder> {
    let txn = db.begin().await?;

    match place_order(&txn, owner, customer).await {
        Ok(placed) => {
            txn.commit().await?;
            tracing::info!(
                "Placed order {} for {} ({} lines, total {})",
                placed.order.order_number,
                owner,
                placed.items.len(),
                placed.order.total_amount
            );
            Ok(placed)
        }
        Err(e) => {
            tracing::warn!("Checkout for {} aborted: {}", owner, e);
            if let Err(rollback_err) = txn.rollback().await {
                tracing::error!("Rollback of checkout for {} failed: {}", owner, rollback_err);
            }
            Err(e)
        }
    }
}

async fn place_order(
    txn: &DatabaseTransaction,
    owner: &OwnerKey,
    customer: &CustomerData,
) -> Result<PlacedOrder> {
    let source_cart = cart::find_cart(txn, owner).await?.ok_or(Error::EmptyCart)?;
    let lines = cart::cart_lines(txn, source_cart.id).await?;
    if lines.is_empty() {
        return Err(Error::EmptyCart);
    }

    let customer = customer.validated()?;

    let snapshot = snapshot_prices(txn, &lines).await?;
    let total_amount: Decimal = snapshot
        .iter()
        .map(|(line, price)| pricing::line_total(*price, line.quantity))
        .sum();

    let now = Utc::now();
    let order = order::ActiveModel {
        order_number: Set(generate_order_number(now)),
        user_id: Set(owner.user_id()),
        customer_name: Set(customer.name),
        customer_email: Set(customer.email),
        customer_phone: Set(customer.phone),
        shipping_address: Set(customer.address),
        total_amount: Set(total_amount),
        status: Set(OrderStatus::Pending),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let new_items = snapshot.iter().map(|(line, price)| order_item::ActiveModel {
        order_id: Set(order.id),
        product_id: Set(line.product_id),
        quantity: Set(line.quantity),
        price: Set(*price),
        created_at: Set(now),
        ..Default::default()
    });
    OrderItem::insert_many(new_items)
        .exec_without_returning(txn)
        .await?;

    let removed = cart::clear_cart_lines(txn, source_cart.id).await?;
    if usize::try_from(removed).ok() != Some(lines.len()) {
        return Err(Error::CartChanged {
            cart_id: source_cart.id,
        });
    }

    let items = OrderItem::find()
        .filter(order_item::Column::OrderId.eq(order.id))
        .all(txn)
        .await?;

    Ok(PlacedOrder { order, items })
}

/// Reads the current price of every line's product inside the checkout transaction.
///
/// A product that no longer exists or is inactive fails the whole checkout rather than
/// silently dropping the line.
async fn snapshot_prices<'a>(
    txn: &DatabaseTransaction,
    lines: &'a [cart_item::Model],
) -> Result<Vec<(&'a cart_item::Model, Decimal)>> {
    let mut snapshot = Vec::with_capacity(lines.len());
    for line in lines {
        let product = catalog::get_product(txn, line.product_id).await?;
        snapshot.push((line, product.price));
    }
    Ok(snapshot)
}
