//! Cart business logic - Lookup-or-create, line mutations, and summaries.
//!
//! Every mutation that touches more than one row runs in a single database transaction.
//! Cart resolution is an upsert against the unique owner columns, and adding a product is
//! an upsert against the unique `(cart_id, product_id)` index, so concurrent requests for
//! the same owner converge instead of creating duplicate carts or lines.

use crate::{
    core::{
        catalog,
        identity::OwnerKey,
        pricing::{CartLine, CartSummary},
    },
    entities::{Cart, CartItem, Product, cart, cart_item},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set, TransactionTrait,
    prelude::*,
    sea_query::{Expr, OnConflict},
};

/// Finds the cart for an owner without creating one.
pub async fn find_cart<C>(db: &C, owner: &OwnerKey) -> Result<Option<cart::Model>>
where
    C: ConnectionTrait,
{
    let query = match owner {
        OwnerKey::User(user_id) => Cart::find().filter(cart::Column::UserId.eq(*user_id)),
        OwnerKey::Session(token) => {
            Cart::find().filter(cart::Column::SessionToken.eq(token.as_str()))
        }
    };
    query.one(db).await.map_err(Into::into)
}

/// Returns the owner's cart, creating an empty one if none exists.
///
/// The insert uses `ON CONFLICT DO NOTHING` on the owner column followed by a lookup, so
/// two racing first requests both end up with the same row.
pub async fn get_or_create_cart<C>(db: &C, owner: &OwnerKey) -> Result<cart::Model>
where
    C: ConnectionTrait,
{
    if let Some(cart) = find_cart(db, owner).await? {
        return Ok(cart);
    }

    let (new_cart, conflict_column) = match owner {
        OwnerKey::User(user_id) => (
            cart::ActiveModel {
                user_id: Set(Some(*user_id)),
                session_token: Set(None),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            },
            cart::Column::UserId,
        ),
        OwnerKey::Session(token) => (
            cart::ActiveModel {
                user_id: Set(None),
                session_token: Set(Some(token.clone())),
                created_at: Set(chrono::Utc::now()),
                ..Default::default()
            },
            cart::Column::SessionToken,
        ),
    };

    let inserted = Cart::insert(new_cart)
        .on_conflict(OnConflict::column(conflict_column).do_nothing().to_owned())
        .exec_without_returning(db)
        .await?;
    if inserted > 0 {
        tracing::debug!("Created cart for {}", owner);
    }

    find_cart(db, owner)
        .await?
        .ok_or_else(|| Error::Database(DbErr::RecordNotFound(format!("cart for {owner}"))))
}

/// Adds `quantity` units of a product to the owner's cart.
///
/// Repeated adds accumulate: an existing line has its quantity increased rather than a
/// second line being created. The product must exist and be active.
pub async fn add_item(
    db: &DatabaseConnection,
    owner: &OwnerKey,
    product_id: i64,
    quantity: i32,
) -> Result<cart_item::Model> {
    if quantity < 1 {
        return Err(Error::InvalidQuantity { quantity });
    }

    let txn = db.begin().await?;

    let cart = get_or_create_cart(&txn, owner).await?;
    catalog::get_product(&txn, product_id).await?;

    // quantity + requested must still fit the column
    let existing = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?;
    if existing.is_some_and(|line| line.quantity.checked_add(quantity).is_none()) {
        return Err(Error::InvalidQuantity { quantity });
    }

    let now = chrono::Utc::now();
    let line = cart_item::ActiveModel {
        cart_id: Set(cart.id),
        product_id: Set(product_id),
        quantity: Set(quantity),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    // quantity = quantity + requested on an existing (cart, product) line
    CartItem::insert(line)
        .on_conflict(
            OnConflict::columns([cart_item::Column::CartId, cart_item::Column::ProductId])
                .value(
                    cart_item::Column::Quantity,
                    Expr::col(cart_item::Column::Quantity).add(quantity),
                )
                .value(cart_item::Column::UpdatedAt, Expr::value(now))
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let item = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .filter(cart_item::Column::ProductId.eq(product_id))
        .one(&txn)
        .await?
        .ok_or_else(|| {
            Error::Database(DbErr::RecordNotFound(format!(
                "cart item for product {product_id}"
            )))
        })?;

    txn.commit().await?;

    tracing::debug!(
        "Added {} x product {} to cart {} (now {})",
        quantity,
        product_id,
        cart.id,
        item.quantity
    );
    Ok(item)
}

/// Sets a line's quantity to an absolute value.
///
/// A quantity of zero or less removes the line and returns `None`; this is a removal
/// request, not an error.
pub async fn set_item_quantity(
    db: &DatabaseConnection,
    cart_item_id: i64,
    quantity: i32,
) -> Result<Option<cart_item::Model>> {
    let txn = db.begin().await?;

    let item = CartItem::find_by_id(cart_item_id)
        .one(&txn)
        .await?
        .ok_or(Error::CartItemNotFound { id: cart_item_id })?;

    let result = if quantity <= 0 {
        item.delete(&txn).await?;
        tracing::debug!("Removed cart item {} via zero quantity", cart_item_id);
        None
    } else {
        let mut active: cart_item::ActiveModel = item.into();
        active.quantity = Set(quantity);
        active.updated_at = Set(chrono::Utc::now());
        Some(active.update(&txn).await?)
    };

    txn.commit().await?;
    Ok(result)
}

/// Deletes a line. Removing the same line twice fails the second time.
pub async fn remove_item(db: &DatabaseConnection, cart_item_id: i64) -> Result<()> {
    let result = CartItem::delete_by_id(cart_item_id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(Error::CartItemNotFound { id: cart_item_id });
    }
    tracing::debug!("Removed cart item {}", cart_item_id);
    Ok(())
}

/// Deletes every line in a cart. The cart row itself is kept for reuse.
pub async fn clear_cart_lines<C>(db: &C, cart_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = CartItem::delete_many()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Empties the owner's cart, returning the number of lines removed.
///
/// An owner without a cart has nothing to clear; no cart is created.
pub async fn clear(db: &DatabaseConnection, owner: &OwnerKey) -> Result<u64> {
    let Some(cart) = find_cart(db, owner).await? else {
        return Ok(0);
    };
    let removed = clear_cart_lines(db, cart.id).await?;
    tracing::debug!("Cleared {} lines from cart {}", removed, cart.id);
    Ok(removed)
}

/// Lines of a cart in insertion order.
pub async fn cart_lines<C>(db: &C, cart_id: i64) -> Result<Vec<cart_item::Model>>
where
    C: ConnectionTrait,
{
    CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart_id))
        .order_by_asc(cart_item::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Raw lines of the owner's cart; empty when the owner has no cart.
pub async fn cart_items(db: &DatabaseConnection, owner: &OwnerKey) -> Result<Vec<cart_item::Model>> {
    match find_cart(db, owner).await? {
        Some(cart) => cart_lines(db, cart.id).await,
        None => Ok(Vec::new()),
    }
}

/// Priced projection of the owner's cart using live product prices.
pub async fn summarize(db: &DatabaseConnection, owner: &OwnerKey) -> Result<CartSummary> {
    let Some(cart) = find_cart(db, owner).await? else {
        return Ok(CartSummary::empty());
    };

    let rows = CartItem::find()
        .filter(cart_item::Column::CartId.eq(cart.id))
        .order_by_asc(cart_item::Column::Id)
        .find_also_related(Product)
        .all(db)
        .await?;

    let lines = rows
        .into_iter()
        .map(|(item, product)| -> Result<CartLine> {
            let product = product.ok_or(Error::ProductNotFound {
                id: item.product_id,
            })?;
            Ok(CartLine::new(
                item.id,
                product.id,
                product.name,
                product.price,
                item.quantity,
            ))
        })
        .collect::<Result<Vec<CartLine>>>()?;

    Ok(CartSummary::from_lines(lines))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_get_or_create_cart_is_idempotent() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = session_owner("test-session-1");

        let first = get_or_create_cart(&db, &owner).await?;
        let second = get_or_create_cart(&db, &owner).await?;

        assert_eq!(first, second);
        assert_eq!(first.session_token.as_deref(), Some("test-session-1"));
        assert!(first.user_id.is_none());
        assert_eq!(Cart::find().count(&db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_user_and_session_carts_are_distinct() -> Result<()> {
        let db = setup_test_db().await?;

        let user_cart = get_or_create_cart(&db, &OwnerKey::User(1)).await?;
        let session_cart = get_or_create_cart(&db, &session_owner("anon")).await?;

        assert_ne!(user_cart.id, session_cart.id);
        assert_eq!(user_cart.user_id, Some(1));
        assert!(user_cart.session_token.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_creates_line() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("test-session-123");

        let item = add_item(&db, &owner, product_a.id, 2).await?;

        assert_eq!(item.product_id, product_a.id);
        assert_eq!(item.quantity, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_repeated_add_accumulates_single_line() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("test-session-123");

        let first = add_item(&db, &owner, product_a.id, 2).await?;
        let second = add_item(&db, &owner, product_a.id, 1).await?;

        assert_eq!(first.id, second.id);
        assert_eq!(second.quantity, 3);
        let lines = cart_items(&db, &owner).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_item_rejects_non_positive_quantity() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("s");

        for quantity in [0, -3] {
            let result = add_item(&db, &owner, product_a.id, quantity).await;
            assert!(matches!(result, Err(Error::InvalidQuantity { .. })));
        }
        assert!(cart_items(&db, &owner).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_add_past_max_quantity_is_rejected() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("bulk");
        add_item(&db, &owner, product_a.id, i32::MAX).await?;

        let result = add_item(&db, &owner, product_a.id, 1).await;
        assert!(matches!(result, Err(Error::InvalidQuantity { quantity: 1 })));
        assert_eq!(result.unwrap_err().kind(), crate::errors::ErrorKind::InvalidQuantity);

        let lines = cart_items(&db, &owner).await?;
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].quantity, i32::MAX);
        Ok(())
    }

    #[tokio::test]
    async fn test_add_missing_or_inactive_product_fails() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("s");

        let result = add_item(&db, &owner, 999, 1).await;
        assert!(matches!(result, Err(Error::ProductNotFound { id: 999 })));

        catalog::deactivate_product(&db, product_a.id).await?;
        let result = add_item(&db, &owner, product_a.id, 1).await;
        assert!(matches!(result, Err(Error::ProductNotFound { .. })));

        // The failed transaction must not leave a freshly created cart behind
        assert!(find_cart(&db, &owner).await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_item_quantity_overwrites() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("test-session-789");
        let item = add_item(&db, &owner, product_a.id, 2).await?;

        let updated = set_item_quantity(&db, item.id, 5).await?.unwrap();
        assert_eq!(updated.quantity, 5);

        let updated = set_item_quantity(&db, item.id, 1).await?.unwrap();
        assert_eq!(updated.quantity, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_set_item_quantity_non_positive_removes() -> Result<()> {
        let (db, product_a, product_b) = setup_with_products().await?;
        let owner = session_owner("test-session-789");
        let a = add_item(&db, &owner, product_a.id, 2).await?;
        let b = add_item(&db, &owner, product_b.id, 2).await?;

        assert!(set_item_quantity(&db, a.id, 0).await?.is_none());
        assert!(set_item_quantity(&db, b.id, -4).await?.is_none());

        assert!(CartItem::find_by_id(a.id).one(&db).await?.is_none());
        assert!(CartItem::find_by_id(b.id).one(&db).await?.is_none());
        assert!(cart_items(&db, &owner).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_set_missing_item_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let result = set_item_quantity(&db, 42, 3).await;
        assert!(matches!(result, Err(Error::CartItemNotFound { id: 42 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_item_twice_fails_second_time() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = session_owner("test-session-101");
        let item = add_item(&db, &owner, product_a.id, 2).await?;

        remove_item(&db, item.id).await?;
        assert!(CartItem::find_by_id(item.id).one(&db).await?.is_none());

        let result = remove_item(&db, item.id).await;
        assert!(matches!(result, Err(Error::CartItemNotFound { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_keeps_cart_row() -> Result<()> {
        let (db, product_a, product_b) = setup_with_products().await?;
        let owner = session_owner("test-session-202");
        add_item(&db, &owner, product_a.id, 2).await?;
        add_item(&db, &owner, product_b.id, 1).await?;
        let cart = find_cart(&db, &owner).await?.unwrap();

        assert_eq!(clear(&db, &owner).await?, 2);

        let summary = summarize(&db, &owner).await?;
        assert_eq!(summary.total_items, 0);
        assert_eq!(summary.total_price, Decimal::ZERO);
        assert_eq!(find_cart(&db, &owner).await?, Some(cart));
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_without_cart_creates_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let owner = session_owner("never-seen");

        assert_eq!(clear(&db, &owner).await?, 0);
        assert_eq!(summarize(&db, &owner).await?, CartSummary::empty());
        assert_eq!(Cart::find().count(&db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_summarize_scenario() -> Result<()> {
        let (db, product_a, product_b) = setup_with_products().await?;
        let owner = session_owner("test-session-456");
        add_item(&db, &owner, product_a.id, 2).await?;
        add_item(&db, &owner, product_b.id, 1).await?;

        let summary = summarize(&db, &owner).await?;

        assert_eq!(summary.total_items, 3);
        assert_eq!(summary.total_price, price(9997));
        assert_eq!(summary.items.len(), 2);
        assert_eq!(summary.items[0].product_id, product_a.id);
        assert_eq!(summary.items[0].name, "Test Product 1");
        assert_eq!(summary.items[0].line_total, price(5998));
        Ok(())
    }

    #[tokio::test]
    async fn test_summarize_uses_live_prices() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let owner = OwnerKey::User(7);
        add_item(&db, &owner, product_a.id, 3).await?;
        assert_eq!(summarize(&db, &owner).await?.total_price, price(8997));

        catalog::update_price(&db, product_a.id, price(2500)).await?;

        let summary = summarize(&db, &owner).await?;
        assert_eq!(summary.items[0].unit_price, price(2500));
        assert_eq!(summary.total_price, price(7500));
        Ok(())
    }

    #[tokio::test]
    async fn test_owners_do_not_share_lines() -> Result<()> {
        let (db, product_a, _) = setup_with_products().await?;
        let anon = session_owner("anon");
        let user = OwnerKey::User(3);

        add_item(&db, &anon, product_a.id, 1).await?;
        add_item(&db, &user, product_a.id, 4).await?;

        assert_eq!(summarize(&db, &anon).await?.total_items, 1);
        assert_eq!(summarize(&db, &user).await?.total_items, 4);
        Ok(())
    }
}
