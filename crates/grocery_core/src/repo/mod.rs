//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable item collection contract used by services.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes call `GroceryItem::validate()` before persistence.
//! - A write that returns `Ok` is already committed to storage.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod item_repo;
