//! Grocery item repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/toggle/update/delete/query APIs over `grocery_items` storage.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate their input before SQL mutations.
//! - Mutations derive the new row inside SQLite from the stored row, never
//!   from a caller-held copy, and never rewrite `id` or `created_at`.
//! - Listing order is `created_at` with insertion order breaking ties.
//! - Unknown category labels read back as `Category::Milk`.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::grocery_item::{
    normalize_name, Category, GroceryItem, ItemId, ItemValidationError,
};
use log::warn;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Params, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const ITEMS_TABLE: &str = "grocery_items";
const REQUIRED_ITEM_COLUMNS: &[&str] = &[
    "id",
    "name",
    "category",
    "is_completed",
    "created_at",
    "updated_at",
];

const ITEM_COLUMNS_SQL: &str = "id, name, category, is_completed, created_at";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    /// Connection was not opened through `open_db*` (migrations missing).
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Ordering applied by `list_items`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSort {
    /// Oldest first.
    #[default]
    CreatedAtAsc,
    /// Newest first.
    CreatedAtDesc,
}

/// Query options for listing items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemListQuery {
    /// Exact category filter. `None` returns every item.
    pub category: Option<Category>,
    pub sort: ItemSort,
}

/// Durable item collection contract.
pub trait ItemRepository {
    /// Inserts a new item and returns its id.
    fn insert_item(&self, item: &GroceryItem) -> RepoResult<ItemId>;
    /// Flips the stored `is_completed` flag and returns the stored item.
    fn toggle_item(&self, id: ItemId) -> RepoResult<GroceryItem>;
    /// Overwrites `name` and `category` only and returns the stored item.
    ///
    /// `name` is trimmed; an empty result is a validation error.
    fn update_details(
        &self,
        id: ItemId,
        name: &str,
        category: Category,
    ) -> RepoResult<GroceryItem>;
    /// Removes an item. Returns `false` when it was already absent.
    fn delete_item(&self, id: ItemId) -> RepoResult<bool>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<GroceryItem>>;
    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<GroceryItem>>;
    fn count_items(&self) -> RepoResult<u64>;
}

/// SQLite-backed item repository.
///
/// Each write is one autocommitted statement, so a successful return means
/// the change is durable.
pub struct SqliteItemRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteItemRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is not current.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema shape
    ///   does not match.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }

    /// Runs a single-row `UPDATE ... RETURNING` and parses the returned row.
    ///
    /// Rows are drained before returning so the statement completes and the
    /// autocommit lands.
    fn update_returning<P: Params>(
        &self,
        sql: &str,
        params: P,
        id: ItemId,
    ) -> RepoResult<GroceryItem> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let Some(row) = rows.next()? else {
            return Err(RepoError::NotFound(id));
        };
        let item = parse_item_row(row)?;
        while rows.next()?.is_some() {}
        Ok(item)
    }
}

impl ItemRepository for SqliteItemRepository<'_> {
    fn insert_item(&self, item: &GroceryItem) -> RepoResult<ItemId> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO grocery_items (
                id,
                name,
                category,
                is_completed,
                created_at,
                updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?5);",
            params![
                item.id.to_string(),
                item.name.as_str(),
                item.category.as_str(),
                bool_to_int(item.is_completed),
                item.created_at,
            ],
        )?;

        Ok(item.id)
    }

    fn toggle_item(&self, id: ItemId) -> RepoResult<GroceryItem> {
        self.update_returning(
            &format!(
                "UPDATE grocery_items
                 SET
                    is_completed = 1 - is_completed,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?1
                 RETURNING {ITEM_COLUMNS_SQL};"
            ),
            [id.to_string()],
            id,
        )
    }

    fn update_details(
        &self,
        id: ItemId,
        name: &str,
        category: Category,
    ) -> RepoResult<GroceryItem> {
        let name = normalize_name(name)?;

        self.update_returning(
            &format!(
                "UPDATE grocery_items
                 SET
                    name = ?1,
                    category = ?2,
                    updated_at = (strftime('%s', 'now') * 1000)
                 WHERE id = ?3
                 RETURNING {ITEM_COLUMNS_SQL};"
            ),
            params![name, category.as_str(), id.to_string()],
            id,
        )
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM grocery_items WHERE id = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<GroceryItem>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS_SQL} FROM grocery_items WHERE id = ?1;"
        ))?;

        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_item_row(row)?));
        }

        Ok(None)
    }

    fn list_items(&self, query: &ItemListQuery) -> RepoResult<Vec<GroceryItem>> {
        let mut sql = format!("SELECT {ITEM_COLUMNS_SQL} FROM grocery_items WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(category) = query.category {
            sql.push_str(" AND category = ?");
            bind_values.push(Value::Text(category.as_str().to_string()));
        }

        match query.sort {
            ItemSort::CreatedAtAsc => sql.push_str(" ORDER BY created_at ASC, rowid ASC"),
            ItemSort::CreatedAtDesc => sql.push_str(" ORDER BY created_at DESC, rowid DESC"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }

        Ok(items)
    }

    fn count_items(&self) -> RepoResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM grocery_items;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative item count `{count}`")))
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [ITEMS_TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(ITEMS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({ITEMS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_ITEM_COLUMNS {
        if !columns.iter().any(|existing| existing == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: ITEMS_TABLE,
                column,
            });
        }
    }

    Ok(())
}

fn parse_item_row(row: &Row<'_>) -> RepoResult<GroceryItem> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in grocery_items.id"))
    })?;

    let category_text: String = row.get("category")?;
    let category = match Category::parse(&category_text) {
        Some(category) => category,
        None => {
            warn!(
                "event=item_read module=repo status=fallback item_id={} field=category fallback={}",
                id,
                Category::default()
            );
            Category::default()
        }
    };

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid is_completed value `{other}` in grocery_items.is_completed"
            )));
        }
    };

    Ok(GroceryItem {
        id,
        name: row.get("name")?,
        category,
        is_completed,
        created_at: row.get("created_at")?,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
