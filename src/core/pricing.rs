//! Pricing and totals.
//!
//! Pure functions over `(unit price, quantity)` pairs. Cart totals are always recomputed
//! from live product prices; only orders freeze prices. All money is `Decimal`, never
//! binary floating point.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// One priced line of a cart summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Cart item id, used to address `set_item_quantity` and `remove_item`
    pub id: i64,
    /// Referenced product
    pub product_id: i64,
    /// Product name at read time
    pub name: String,
    /// Live product price
    pub unit_price: Decimal,
    /// Units in the cart
    pub quantity: i32,
    /// `unit_price * quantity`
    pub line_total: Decimal,
}

impl CartLine {
    /// Builds a line and computes its total.
    #[must_use]
    pub fn new(id: i64, product_id: i64, name: String, unit_price: Decimal, quantity: i32) -> Self {
        Self {
            id,
            product_id,
            name,
            unit_price,
            quantity,
            line_total: line_total(unit_price, quantity),
        }
    }
}

/// Read-only projection of a cart with its totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    /// Sum of quantities across all lines
    pub total_items: i64,
    /// Sum of line totals
    pub total_price: Decimal,
    /// Lines in insertion order
    pub items: Vec<CartLine>,
}

impl CartSummary {
    /// Summary of a cart with no lines.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            total_items: 0,
            total_price: Decimal::ZERO,
            items: Vec::new(),
        }
    }

    /// Computes totals over the given lines.
    #[must_use]
    pub fn from_lines(items: Vec<CartLine>) -> Self {
        let total_items = items.iter().map(|line| i64::from(line.quantity)).sum();
        let total_price = items.iter().map(|line| line.line_total).sum();
        Self {
            total_items,
            total_price,
            items,
        }
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// `unit_price * quantity`, exact.
#[must_use]
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Placeholder tax and shipping rates. Real tax/shipping calculation is out of scope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PricingRates {
    /// Fraction of the subtotal charged as tax (0.08 = 8%)
    pub tax_rate: Decimal,
    /// Shipping charged below the free-shipping threshold
    pub flat_shipping: Decimal,
    /// Subtotal at or above which shipping is free
    pub free_shipping_threshold: Decimal,
}

impl Default for PricingRates {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            flat_shipping: Decimal::new(599, 2),
            free_shipping_threshold: Decimal::new(50, 0),
        }
    }
}

/// Informational price breakdown shown before checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Sum of line totals
    pub subtotal: Decimal,
    /// Tax at the placeholder rate, rounded to cents
    pub tax: Decimal,
    /// Flat shipping, or zero above the threshold
    pub shipping: Decimal,
    /// `subtotal + tax + shipping`
    pub grand_total: Decimal,
}

/// Tax on `amount`, rounded half away from zero to cents.
#[must_use]
pub fn tax_for(amount: Decimal, rates: &PricingRates) -> Decimal {
    (amount * rates.tax_rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Shipping for a subtotal. Empty carts ship for free.
#[must_use]
pub fn shipping_for(subtotal: Decimal, rates: &PricingRates) -> Decimal {
    if subtotal.is_zero() || subtotal >= rates.free_shipping_threshold {
        Decimal::ZERO
    } else {
        rates.flat_shipping
    }
}

/// Builds a quote for a subtotal.
#[must_use]
pub fn quote(subtotal: Decimal, rates: &PricingRates) -> Quote {
    let tax = tax_for(subtotal, rates);
    let shipping = shipping_for(subtotal, rates);
    Quote {
        subtotal,
        tax,
        shipping,
        grand_total: subtotal + tax + shipping,
    }
}
