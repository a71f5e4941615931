//! `labstock-service`
//!
//! **Responsibility:** the service boundary the presentation layer talks to.
//!
//! [`InventoryService`] is a thin façade over the equipment and order stores.
//! The one cross-entity operation is [`InventoryService::mark_order_delivered`],
//! which stamps the order delivered and increments the equipment quantity in a
//! single transaction.

pub mod service;

pub use service::{DeliveryError, InventoryService, ServiceError};
