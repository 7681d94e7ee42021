//! Domain model for the grocery list.
//!
//! # Responsibility
//! - Define the canonical `GroceryItem` record and the closed `Category` set.
//! - Own the name normalization rule shared by every write path.
//!
//! # Invariants
//! - Every item is identified by a stable, non-nil `ItemId`.
//! - Deletion is a hard delete; no tombstones are kept.

pub mod grocery_item;
