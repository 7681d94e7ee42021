//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose grocery list use-cases to the mobile UI via FRB.
//! - Translate core errors into simple response envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Every mutation response carries the refreshed list so the UI re-renders
//!   from one value.

use grocery_core::db::open_db;
use grocery_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    Category, CategoryGroup, EmptyNamePolicy, GroceryItem, ListService, ListServiceConfig,
    ListServiceError, ListSnapshot, ServiceResult, SqliteItemRepository,
};
use log::warn;
use rusqlite::Connection;
use std::path::PathBuf;
use std::sync::OnceLock;
use uuid::Uuid;

const DB_FILE_NAME: &str = "grocery_list.sqlite3";
const DB_PATH_ENV: &str = "GROCERY_DB_PATH";
const EMPTY_NAME_POLICY_ENV: &str = "GROCERY_EMPTY_NAME_POLICY";
static DB_PATH: OnceLock<PathBuf> = OnceLock::new();
static SERVICE_CONFIG: OnceLock<ListServiceConfig> = OnceLock::new();

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Category labels in display order, for pickers and filter chips.
#[flutter_rust_bridge::frb(sync)]
pub fn grocery_categories() -> Vec<String> {
    Category::ALL
        .iter()
        .map(|category| category.as_str().to_string())
        .collect()
}

/// One list row as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroceryItemView {
    pub item_id: String,
    pub name: String,
    pub category: String,
    pub is_completed: bool,
    pub created_at: i64,
}

/// Items of one category section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroceryGroupView {
    pub category: String,
    pub items: Vec<GroceryItemView>,
}

/// Response envelope for list reads and mutations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroceryListResponse {
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Human-readable result for diagnostics/UI.
    pub message: String,
    /// Category sections of the visible items (empty on failure).
    pub groups: Vec<GroceryGroupView>,
    /// Visible item count under the requested filter.
    pub visible_count: u32,
    /// Completed items among the visible ones.
    pub completed_count: u32,
}

impl GroceryListResponse {
    fn success(message: impl Into<String>, snapshot: &ListSnapshot) -> Self {
        Self {
            ok: true,
            message: message.into(),
            groups: snapshot.groups.iter().map(to_group_view).collect(),
            visible_count: count_u32(snapshot.visible.len()),
            completed_count: count_u32(snapshot.completed_count()),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            groups: Vec::new(),
            visible_count: 0,
            completed_count: 0,
        }
    }
}

/// Loads the grouped list, optionally narrowed to one category label.
///
/// # FFI contract
/// - `filter = None` shows every category.
/// - Unknown filter labels fail instead of silently showing everything.
#[flutter_rust_bridge::frb(sync)]
pub fn grocery_list(filter: Option<String>) -> GroceryListResponse {
    respond("grocery_list", filter, "Loaded.", |service| service.snapshot())
}

/// Adds an item and returns the refreshed list.
#[flutter_rust_bridge::frb(sync)]
pub fn grocery_add(name: String, category: String, filter: Option<String>) -> GroceryListResponse {
    let category = match parse_category(&category) {
        Ok(category) => category,
        Err(message) => {
            return GroceryListResponse::failure(format!("grocery_add failed: {message}"))
        }
    };
    respond("grocery_add", filter, "Item added.", |service| {
        service.add_item(&name, category)
    })
}

/// Flips completion of one item and returns the refreshed list.
#[flutter_rust_bridge::frb(sync)]
pub fn grocery_toggle(item_id: String, filter: Option<String>) -> GroceryListResponse {
    respond_for_item("grocery_toggle", &item_id, filter, "Item updated.", |service, item| {
        service.toggle_completion(item)
    })
}

/// Renames/recategorizes one item and returns the refreshed list.
#[flutter_rust_bridge::frb(sync)]
pub fn grocery_update(
    item_id: String,
    name: String,
    category: String,
    filter: Option<String>,
) -> GroceryListResponse {
    let category = match parse_category(&category) {
        Ok(category) => category,
        Err(message) => {
            return GroceryListResponse::failure(format!("grocery_update failed: {message}"))
        }
    };
    respond_for_item("grocery_update", &item_id, filter, "Item updated.", |service, item| {
        service.update_item(item, &name, category)
    })
}

/// Deletes one item and returns the refreshed list.
///
/// Deleting an item that is already gone succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn grocery_delete(item_id: String, filter: Option<String>) -> GroceryListResponse {
    let id = match parse_item_id(&item_id) {
        Ok(id) => id,
        Err(message) => {
            return GroceryListResponse::failure(format!("grocery_delete failed: {message}"))
        }
    };
    respond("grocery_delete", filter, "Item deleted.", |service| {
        match service.get_item(id)? {
            Some(item) => service.delete_item(&item),
            None => service.snapshot(),
        }
    })
}

type Service<'conn> = ListService<SqliteItemRepository<'conn>>;

fn respond_for_item(
    op: &str,
    item_id: &str,
    filter: Option<String>,
    message: &'static str,
    f: impl FnOnce(&Service<'_>, &mut GroceryItem) -> ServiceResult<ListSnapshot>,
) -> GroceryListResponse {
    let id = match parse_item_id(item_id) {
        Ok(id) => id,
        Err(err) => return GroceryListResponse::failure(format!("{op} failed: {err}")),
    };
    respond(op, filter, message, |service| {
        match service.get_item(id)? {
            Some(mut item) => f(service, &mut item),
            None => Err(ListServiceError::NotFound(id)),
        }
    })
}

fn respond(
    op: &str,
    filter: Option<String>,
    message: &'static str,
    f: impl FnOnce(&Service<'_>) -> ServiceResult<ListSnapshot>,
) -> GroceryListResponse {
    let filter = match filter.as_deref().map(parse_category).transpose() {
        Ok(filter) => filter,
        Err(err) => return GroceryListResponse::failure(format!("{op} failed: {err}")),
    };

    match with_list_service(filter, |service| f(service).map_err(|err| err.to_string())) {
        Ok(snapshot) => GroceryListResponse::success(message, &snapshot),
        Err(err) => GroceryListResponse::failure(format!("{op} failed: {err}")),
    }
}

fn with_list_service<T>(
    filter: Option<Category>,
    f: impl FnOnce(&Service<'_>) -> Result<T, String>,
) -> Result<T, String> {
    let conn: Connection =
        open_db(resolve_db_path()).map_err(|err| format!("DB open failed: {err}"))?;
    let repo =
        SqliteItemRepository::try_new(&conn).map_err(|err| format!("repo init failed: {err}"))?;
    let mut service = ListService::with_config(repo, resolve_service_config());
    service.set_filter(filter);
    f(&service)
}

fn resolve_db_path() -> PathBuf {
    DB_PATH
        .get_or_init(|| {
            if let Ok(raw) = std::env::var(DB_PATH_ENV) {
                let trimmed = raw.trim();
                if !trimmed.is_empty() {
                    return PathBuf::from(trimmed);
                }
            }
            std::env::temp_dir().join(DB_FILE_NAME)
        })
        .clone()
}

fn resolve_service_config() -> ListServiceConfig {
    *SERVICE_CONFIG.get_or_init(|| {
        let empty_name_policy = match std::env::var(EMPTY_NAME_POLICY_ENV) {
            Ok(raw) => EmptyNamePolicy::parse(&raw).unwrap_or_else(|| {
                warn!(
                    "event=ffi_config module=ffi status=fallback key={} fallback=reject",
                    EMPTY_NAME_POLICY_ENV
                );
                EmptyNamePolicy::Reject
            }),
            Err(_) => EmptyNamePolicy::default(),
        };
        ListServiceConfig { empty_name_policy }
    })
}

fn parse_category(label: &str) -> Result<Category, String> {
    label.parse::<Category>().map_err(|err| err.to_string())
}

fn parse_item_id(raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("invalid item id `{raw}`"))
}

fn to_item_view(item: &GroceryItem) -> GroceryItemView {
    GroceryItemView {
        item_id: item.id.to_string(),
        name: item.name.clone(),
        category: item.category.as_str().to_string(),
        is_completed: item.is_completed,
        created_at: item.created_at,
    }
}

fn to_group_view(group: &CategoryGroup) -> GroceryGroupView {
    GroceryGroupView {
        category: group.category.as_str().to_string(),
        items: group.items.iter().map(to_item_view).collect(),
    }
}

fn count_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}
