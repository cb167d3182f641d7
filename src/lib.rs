pub mod config;
pub mod constants;
pub mod db;
pub mod detector;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod host;
pub mod models;
pub mod monitor;
pub mod platform;
pub mod policy;
#[cfg(test)]
mod test_utils;
pub mod tracker;
pub mod validation;

use crate::config::MonitorConfig;
use crate::db::{migrations, Database};
use crate::monitor::MonitorService;
use crate::platform::{EmptyTreeProvider, FocusEvent, LogNavigator, LogPresenter};
use crate::policy::PolicyStore;
use directories::ProjectDirs;
use log::warn;
use std::io::{self, BufRead};
use std::sync::{Arc, Mutex};

/// Error type for initialization failures
#[derive(Debug)]
pub enum InitError {
    NoProjectDirs,
    DataDirCreation(std::io::Error),
    DatabaseOpen(rusqlite::Error),
    Migration(rusqlite::Error),
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InitError::NoProjectDirs => write!(f, "Could not determine project directories"),
            InitError::DataDirCreation(e) => write!(f, "Could not create data directory: {}", e),
            InitError::DatabaseOpen(e) => write!(f, "Failed to open database: {}", e),
            InitError::Migration(e) => write!(f, "Failed to run database migrations: {}", e),
        }
    }
}

impl std::error::Error for InitError {}

pub fn get_db_path() -> Result<std::path::PathBuf, InitError> {
    let proj_dirs = ProjectDirs::from("com", "vigil", "Vigil")
        .ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("vigil.db"))
}

/// Open the shared database and bring the schema up to date.
pub fn open_database() -> Result<Database, InitError> {
    let db_path = get_db_path()?;
    let db = Database::open(&db_path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    Ok(db)
}

/// Wire the monitor with the stub platform seams and pump events from
/// stdin until it closes: one event per line, `focus <package>`,
/// `content <package>` or `tap <package>` — the same signals a native
/// event source would deliver.
pub fn run() -> Result<(), InitError> {
    let db = Arc::new(Mutex::new(open_database()?));
    let policy = Arc::new(PolicyStore::new(db));
    let config = Arc::new(MonitorConfig::default());

    let mut monitor = MonitorService::new(
        config,
        policy,
        Arc::new(LogPresenter::default()),
        Arc::new(LogNavigator),
        Arc::new(EmptyTreeProvider),
    );
    monitor.start();
    let events = monitor.events();

    for line in io::stdin().lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        let mut parts = line.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("focus"), Some(package)) => events.deliver(FocusEvent::focus(package)),
            (Some("content"), Some(package)) => events.deliver(FocusEvent::content(package)),
            (Some("tap"), Some(package)) => events.deliver(FocusEvent::interaction(package)),
            (None, _) => {}
            _ => warn!("unrecognized input line: {}", line),
        }
    }

    monitor.stop();
    Ok(())
}
