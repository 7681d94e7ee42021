//! Read-side projections consumed by the presentation layer.
//!
//! # Responsibility
//! - Filter and group item collections for display.
//! - Package a post-mutation snapshot so callers re-render from one value.
//!
//! # Invariants
//! - Projections are pure; they never touch storage.

pub mod grouping;
pub mod snapshot;
