//! Purchase order domain module.
//!
//! This crate contains the order record type, its status lifecycle, and order
//! placement against an equipment record, implemented purely as deterministic
//! domain logic (no IO, no storage).

pub mod order;

pub use order::{NewOrder, Order, OrderStatus, ParseOrderStatusError};
