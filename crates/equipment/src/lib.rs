//! Equipment domain module.
//!
//! This crate contains the equipment record type and its derived stock/expiry
//! predicates, implemented purely as deterministic domain logic (no IO, no
//! storage).

pub mod item;

pub use item::{Equipment, NewEquipment, NEAR_EXPIRY_WINDOW_DAYS};
