//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `grocery_core` linkage and print the grouped list of a database.
//!
//! Usage: `grocery_cli [DB_PATH]`. Without a path only the version check runs.

use grocery_core::db::open_db;
use grocery_core::{ListService, SqliteItemRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("grocery_core ping={}", grocery_core::ping());
    println!("grocery_core version={}", grocery_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match print_list(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("grocery_cli: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_list(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let service = ListService::new(SqliteItemRepository::try_new(&conn)?);
    let snapshot = service.snapshot()?;

    if snapshot.is_empty() {
        println!("Your grocery list is empty");
        return Ok(());
    }

    println!(
        "{} item(s), {} remaining",
        snapshot.visible.len(),
        snapshot.remaining_count()
    );
    for group in &snapshot.groups {
        println!("{}", group.category);
        for item in &group.items {
            let mark = if item.is_completed { 'x' } else { ' ' };
            println!("  [{mark}] {}", item.name);
        }
    }
    Ok(())
}
