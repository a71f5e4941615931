//! `labstock-store`
//!
//! **Responsibility:** SQLite persistence for the inventory core.
//!
//! This crate provides:
//! - [`Database`]: an explicitly owned connection handle (schema bootstrap,
//!   best-effort sample-data seeding)
//! - [`EquipmentStore`] and [`OrderStore`]: the query/CRUD boundaries used by
//!   the service layer
//!
//! Every operation re-queries the database; there is no in-memory caching.
//! Row-not-found is reported as `Ok(None)` / `Ok(false)`, never as an error.

pub mod db;
pub mod equipment_store;
pub mod error;
pub mod order_store;
pub mod seed;

pub use db::Database;
pub use equipment_store::EquipmentStore;
pub use error::StoreError;
pub use order_store::OrderStore;
pub use seed::SAMPLE_DATA;
