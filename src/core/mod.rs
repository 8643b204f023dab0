//! Core business logic - framework-agnostic cart and order operations.
//!
//! Components, leaf first: catalog lookups, owner identity, the cart store, pricing,
//! checkout, and the order store.

/// Cart store: lookup-or-create, line mutations, summaries
pub mod cart;
/// Catalog accessor: product lookups, seeding, and admin price/availability changes
pub mod catalog;
/// Checkout orchestrator: atomic cart-to-order conversion
pub mod checkout;
/// Identity resolver: maps a request onto a cart owner key
pub mod identity;
/// Order store: lookups and administrative status transitions
pub mod order;
/// Pricing and totals engine
pub mod pricing;
