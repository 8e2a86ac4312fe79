//! Domain entities persisted by the storage backend.
//!
//! These are the typed records every storage row must map into. Conversions
//! from raw rows live in the service crates next to their clients; the types
//! here carry no I/O.

pub mod order;
pub mod product;

pub use order::{
    DeliveryMethod, Order, OrderDetailItem, OrderDetails, OrderItem, OrderMetadata,
    ShippingOption,
};
pub use product::{Category, Product};
