// storefront/src/models/mod.rs

//! Row types for the cart and order tables.

pub mod cart;
pub mod order;

pub use cart::CartItemRow;
pub use order::{OrderItemRow, OrderRow, OrderStatus};
