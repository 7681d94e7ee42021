use grocery_core::db::migrations::latest_version;
use grocery_core::db::{open_db, open_db_in_memory};
use grocery_core::{
    Category, GroceryItem, ItemListQuery, ItemRepository, ItemSort, ItemValidationError,
    RepoError, SqliteItemRepository,
};
use rusqlite::Connection;
use uuid::Uuid;

#[test]
fn insert_and_get_roundtrip() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = GroceryItem::new("Carrots", Category::Vegetables).unwrap();
    let id = repo.insert_item(&item).unwrap();

    let loaded = repo.get_item(id).unwrap().unwrap();
    assert_eq!(loaded, item);
}

#[test]
fn get_missing_item_returns_none() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    assert!(repo.get_item(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn update_details_overwrites_name_and_category_only() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut original = fixed_item("00000000-0000-4000-8000-000000000001", "Ham", 100);
    original.is_completed = true;
    repo.insert_item(&original).unwrap();

    let stored = repo
        .update_details(original.id, "  Turkey ", Category::Meats)
        .unwrap();
    assert_eq!(stored.name, "Turkey");
    assert_eq!(stored.category, Category::Meats);
    assert!(stored.is_completed);
    assert_eq!(stored.created_at, 100);
    assert_eq!(repo.get_item(original.id).unwrap().unwrap(), stored);
}

#[test]
fn toggle_item_flips_the_stored_flag() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let item = fixed_item("00000000-0000-4000-8000-000000000002", "Rye", 7);
    repo.insert_item(&item).unwrap();

    assert!(repo.toggle_item(item.id).unwrap().is_completed);
    let stored = repo.toggle_item(item.id).unwrap();
    assert!(!stored.is_completed);
    assert_eq!(stored.name, "Rye");
    assert_eq!(stored.created_at, 7);
    assert!(!repo.get_item(item.id).unwrap().unwrap().is_completed);
}

#[test]
fn mutating_missing_item_returns_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let ghost = Uuid::new_v4();
    let err = repo.toggle_item(ghost).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost));
    let err = repo
        .update_details(ghost, "Ghost", Category::Milk)
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == ghost));
}

#[test]
fn writes_reject_invalid_items() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let mut item = GroceryItem::new("Pears", Category::Fruits).unwrap();
    item.name = "  ".to_string();
    let err = repo.insert_item(&item).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ItemValidationError::EmptyName)
    ));

    item.name = " Pears".to_string();
    let err = repo.insert_item(&item).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ItemValidationError::UntrimmedName)
    ));
    assert_eq!(repo.count_items().unwrap(), 0);

    item.name = "Pears".to_string();
    repo.insert_item(&item).unwrap();
    let err = repo
        .update_details(item.id, " \t ", Category::Fruits)
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ItemValidationError::EmptyName)
    ));
    assert_eq!(repo.get_item(item.id).unwrap().unwrap().name, "Pears");
}

#[test]
fn delete_is_idempotent_and_leaves_other_items() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let keep = GroceryItem::new("Bagels", Category::Breads).unwrap();
    let drop_me = GroceryItem::new("Rolls", Category::Breads).unwrap();
    repo.insert_item(&keep).unwrap();
    repo.insert_item(&drop_me).unwrap();

    assert!(repo.delete_item(drop_me.id).unwrap());
    assert!(!repo.delete_item(drop_me.id).unwrap());

    let remaining = repo.list_items(&ItemListQuery::default()).unwrap();
    assert_eq!(remaining, vec![keep]);
}

#[test]
fn list_orders_by_created_at_with_insertion_tiebreak() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    let late = fixed_item("00000000-0000-4000-8000-000000000003", "late", 300);
    let tie_b = fixed_item("00000000-0000-4000-8000-000000000002", "tie-b", 100);
    let tie_a = fixed_item("00000000-0000-4000-8000-000000000001", "tie-a", 100);
    repo.insert_item(&late).unwrap();
    repo.insert_item(&tie_b).unwrap();
    repo.insert_item(&tie_a).unwrap();

    let ascending_items = repo.list_items(&ItemListQuery::default()).unwrap();
    let ascending = names(&ascending_items);
    assert_eq!(ascending, ["tie-b", "tie-a", "late"]);

    let query = ItemListQuery {
        sort: ItemSort::CreatedAtDesc,
        ..ItemListQuery::default()
    };
    let descending_items = repo.list_items(&query).unwrap();
    let descending = names(&descending_items);
    assert_eq!(descending, ["late", "tie-a", "tie-b"]);
}

#[test]
fn list_filters_by_category() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    repo.insert_item(&GroceryItem::new("Milk", Category::Milk).unwrap())
        .unwrap();
    let kale = GroceryItem::new("Kale", Category::Vegetables).unwrap();
    repo.insert_item(&kale).unwrap();

    let query = ItemListQuery {
        category: Some(Category::Vegetables),
        ..ItemListQuery::default()
    };
    assert_eq!(repo.list_items(&query).unwrap(), vec![kale]);

    let fruit_query = ItemListQuery {
        category: Some(Category::Fruits),
        ..ItemListQuery::default()
    };
    assert!(repo.list_items(&fruit_query).unwrap().is_empty());
}

#[test]
fn unknown_persisted_category_reads_back_as_milk() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO grocery_items (id, name, category, is_completed, created_at)
         VALUES (?1, 'Mystery', 'Snacks', 0, 1);",
        ["00000000-0000-4000-8000-00000000000a"],
    )
    .unwrap();

    let items = repo.list_items(&ItemListQuery::default()).unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].category, Category::Milk);
}

#[test]
fn malformed_id_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();

    conn.execute(
        "INSERT INTO grocery_items (id, name, category, is_completed, created_at)
         VALUES ('not-a-uuid', 'Broken', 'Milk', 0, 1);",
        [],
    )
    .unwrap();

    let err = repo.list_items(&ItemListQuery::default()).unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(message) if message.contains("not-a-uuid")));
}

#[test]
fn items_survive_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("grocery.db");
    let item = GroceryItem::new("Baguette", Category::Breads).unwrap();

    {
        let conn = open_db(&path).unwrap();
        let repo = SqliteItemRepository::try_new(&conn).unwrap();
        repo.insert_item(&item).unwrap();
    }

    let conn = open_db(&path).unwrap();
    let repo = SqliteItemRepository::try_new(&conn).unwrap();
    assert_eq!(repo.get_item(item.id).unwrap(), Some(item));
    assert_eq!(repo.count_items().unwrap(), 1);
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteItemRepository::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_items_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("grocery_items"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE grocery_items (
            id TEXT PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteItemRepository::try_new(&conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "grocery_items",
            column: "is_completed"
        })
    ));
}

fn fixed_item(id: &str, name: &str, created_at: i64) -> GroceryItem {
    GroceryItem::with_id(Uuid::parse_str(id).unwrap(), name, Category::Milk, created_at).unwrap()
}

fn names(items: &[GroceryItem]) -> Vec<&str> {
    items.iter().map(|item| item.name.as_str()).collect()
}
