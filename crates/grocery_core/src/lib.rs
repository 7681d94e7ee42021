//! Core domain logic for the grocery list.
//! This crate is the single source of truth for item invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod view;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::grocery_item::{
    normalize_name, Category, GroceryItem, ItemId, ItemValidationError,
};
pub use repo::item_repo::{
    ItemListQuery, ItemRepository, ItemSort, RepoError, RepoResult, SqliteItemRepository,
};
pub use service::list_service::{
    EmptyNamePolicy, ListService, ListServiceConfig, ListServiceError, ServiceResult,
};
pub use view::grouping::{filter_by_category, group_by_category, CategoryGroup};
pub use view::snapshot::ListSnapshot;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
