//! Flutter-facing FFI surface for the grocery list core.

pub mod api;
