//! Grocery list use-case service.
//!
//! # Responsibility
//! - Provide add/delete/toggle/update entry points for presentation callers.
//! - Enforce the trimmed non-empty name rule before any write.
//! - Return a fresh `ListSnapshot` after every mutation.
//!
//! # Invariants
//! - The service holds no item state; the repository is the only owner.
//! - A caller's `&mut GroceryItem` is changed only after the store accepted
//!   the write, and is then replaced by the stored row.
//! - `id` and `created_at` are never modified after creation.

use crate::model::grocery_item::{
    normalize_name, Category, GroceryItem, ItemId, ItemValidationError,
};
use crate::repo::item_repo::{ItemListQuery, ItemRepository, RepoError};
use crate::view::snapshot::ListSnapshot;
use log::{debug, error, info};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ListServiceError>;

/// Service error for grocery list use-cases.
#[derive(Debug)]
pub enum ListServiceError {
    /// Input rejected before reaching storage.
    Validation(ItemValidationError),
    /// Target item no longer exists.
    NotFound(ItemId),
    /// Storage failed to read or durably write.
    Persistence(RepoError),
}

impl Display for ListServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::Persistence(err) => write!(f, "persistence failed: {err}"),
        }
    }
}

impl Error for ListServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::Persistence(err) => Some(err),
        }
    }
}

impl From<ItemValidationError> for ListServiceError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ListServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::Persistence(other),
        }
    }
}

/// What add/update do with a name that is empty after trimming.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyNamePolicy {
    /// Return `ListServiceError::Validation(EmptyName)`.
    #[default]
    Reject,
    /// Leave the store untouched and report success.
    Ignore,
}

impl EmptyNamePolicy {
    /// Parses `reject` / `ignore` (case-insensitive).
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reject" => Some(Self::Reject),
            "ignore" => Some(Self::Ignore),
            _ => None,
        }
    }
}

/// Tunables for `ListService`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(default)]
pub struct ListServiceConfig {
    pub empty_name_policy: EmptyNamePolicy,
}

/// Grocery list facade over repository implementations.
pub struct ListService<R: ItemRepository> {
    repo: R,
    config: ListServiceConfig,
    filter: Option<Category>,
}

impl<R: ItemRepository> ListService<R> {
    /// Creates a service with default configuration.
    pub fn new(repo: R) -> Self {
        Self::with_config(repo, ListServiceConfig::default())
    }

    pub fn with_config(repo: R, config: ListServiceConfig) -> Self {
        Self {
            repo,
            config,
            filter: None,
        }
    }

    pub fn config(&self) -> ListServiceConfig {
        self.config
    }

    /// Active category filter applied to snapshots.
    pub fn filter(&self) -> Option<Category> {
        self.filter
    }

    pub fn set_filter(&mut self, filter: Option<Category>) {
        self.filter = filter;
    }

    /// Returns the full collection, oldest first.
    pub fn query_all(&self) -> ServiceResult<Vec<GroceryItem>> {
        self.query(&ItemListQuery::default())
    }

    /// Returns items using explicit filter/sort options.
    pub fn query(&self, query: &ItemListQuery) -> ServiceResult<Vec<GroceryItem>> {
        Ok(self.repo.list_items(query)?)
    }

    pub fn get_item(&self, id: ItemId) -> ServiceResult<Option<GroceryItem>> {
        Ok(self.repo.get_item(id)?)
    }

    /// Re-reads the collection and projects it through the active filter.
    pub fn snapshot(&self) -> ServiceResult<ListSnapshot> {
        Ok(ListSnapshot::build(self.query_all()?, self.filter))
    }

    /// Adds a new incomplete item.
    ///
    /// # Contract
    /// - `name` is trimmed; an empty result follows `EmptyNamePolicy`.
    /// - The new item gets a fresh id and `created_at = now`.
    pub fn add_item(&self, name: &str, category: Category) -> ServiceResult<ListSnapshot> {
        let Some(name) = self.accept_name(name, "item_add")? else {
            return self.snapshot();
        };

        let item = GroceryItem::new(&name, category)?;
        self.repo
            .insert_item(&item)
            .map_err(|err| log_write_failure("item_add", item.id, err))?;
        info!(
            "event=item_add module=service status=ok item_id={} category={}",
            item.id, item.category
        );
        self.snapshot()
    }

    /// Permanently removes an item. Deleting an absent item is a no-op.
    pub fn delete_item(&self, item: &GroceryItem) -> ServiceResult<ListSnapshot> {
        let removed = self
            .repo
            .delete_item(item.id)
            .map_err(|err| log_write_failure("item_delete", item.id, err))?;
        if removed {
            info!(
                "event=item_delete module=service status=ok item_id={}",
                item.id
            );
        } else {
            debug!(
                "event=item_delete module=service status=noop reason=not_found item_id={}",
                item.id
            );
        }
        self.snapshot()
    }

    /// Flips the stored `is_completed` and refreshes `item` from storage.
    ///
    /// The flip is computed from the stored row, so a stale copy still
    /// toggles the current value.
    ///
    /// # Errors
    /// - `NotFound` when the item was deleted meanwhile; `item` is untouched.
    pub fn toggle_completion(&self, item: &mut GroceryItem) -> ServiceResult<ListSnapshot> {
        let stored = self
            .repo
            .toggle_item(item.id)
            .map_err(|err| log_write_failure("item_toggle", item.id, err))?;
        *item = stored;
        info!(
            "event=item_toggle module=service status=ok item_id={} completed={}",
            item.id, item.is_completed
        );
        self.snapshot()
    }

    /// Replaces `name` and `category`, then refreshes `item` from storage.
    ///
    /// # Contract
    /// - Same trimming/empty-name rule as `add_item`; on rejection or
    ///   ignore, `item` and the store are left unchanged.
    /// - `id`, `created_at` and the stored `is_completed` are preserved.
    pub fn update_item(
        &self,
        item: &mut GroceryItem,
        name: &str,
        category: Category,
    ) -> ServiceResult<ListSnapshot> {
        let Some(name) = self.accept_name(name, "item_update")? else {
            return self.snapshot();
        };

        let stored = self
            .repo
            .update_details(item.id, &name, category)
            .map_err(|err| log_write_failure("item_update", item.id, err))?;
        *item = stored;
        info!(
            "event=item_update module=service status=ok item_id={} category={}",
            item.id, item.category
        );
        self.snapshot()
    }

    /// Normalizes a name, returning `None` when the policy says to ignore it.
    fn accept_name(&self, raw: &str, event: &str) -> ServiceResult<Option<String>> {
        match normalize_name(raw) {
            Ok(name) => Ok(Some(name)),
            Err(err) => match self.config.empty_name_policy {
                EmptyNamePolicy::Ignore => {
                    debug!("event={event} module=service status=noop reason=empty_name");
                    Ok(None)
                }
                EmptyNamePolicy::Reject => {
                    debug!("event={event} module=service status=rejected reason=empty_name");
                    Err(err.into())
                }
            },
        }
    }
}

fn log_write_failure(event: &str, id: ItemId, err: RepoError) -> ListServiceError {
    let mapped = ListServiceError::from(err);
    match &mapped {
        ListServiceError::NotFound(_) => debug!(
            "event={event} module=service status=error error_code=not_found item_id={id}"
        ),
        _ => error!(
            "event={event} module=service status=error error_code=write_failed item_id={id} error={mapped}"
        ),
    }
    mapped
}
