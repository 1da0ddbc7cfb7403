//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `dailytodo_core` linkage.
//! - Optionally dump the task list stored in a database file.
//!
//! Usage: `dailytodo_cli [DB_PATH]`

use dailytodo_core::db::open_db;
use dailytodo_core::{format_deadline, SqliteKeyValueStore, TaskRepository, TaskStore};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("dailytodo_core ping={}", dailytodo_core::ping());
    println!("dailytodo_core version={}", dailytodo_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match print_tasks(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_tasks(db_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let conn = open_db(db_path)?;
    let store = TaskStore::new(SqliteKeyValueStore::try_new(&conn)?);
    let tasks = store.load_all()?;

    println!("tasks={}", tasks.len());
    for task in tasks {
        let deadline = task
            .deadline
            .as_ref()
            .map(format_deadline)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{}] {} {} estimate={}m deadline={}",
            if task.done { "x" } else { " " },
            task.id,
            task.name,
            task.time_estimate,
            deadline
        );
    }
    Ok(())
}
