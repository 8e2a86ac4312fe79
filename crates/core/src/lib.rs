//! La Matera Core - Shared domain library.
//!
//! This crate provides the domain types and pure logic used across all
//! La Matera components:
//! - `storefront` - Public-facing catalog, cart, and checkout API
//! - `admin` - Back-office panel for products and orders
//! - `cli` - Command-line tools for seeding and diagnostics
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no async. This keeps it lightweight and allows it to be used
//! anywhere.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for type-safe IDs, slugs, emails, money,
//!   and the order status machine
//! - [`model`] - The persisted entities: products, categories, orders
//! - [`cart`] - The shopping cart state container
//! - [`stock`] - Backorder reconciliation math
//! - [`checkout`] - Operator message and WhatsApp handoff builders

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod checkout;
pub mod model;
pub mod stock;
pub mod types;

pub use cart::{CartError, CartLine, CartStore};
pub use checkout::DeliverySelection;
pub use model::*;
pub use stock::{StockReconciliation, reconcile};
pub use types::*;
