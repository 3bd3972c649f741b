pub mod constants;
pub mod controller;
pub mod db;
pub mod error;
pub mod host;
pub mod models;
pub mod notify;
pub mod platform;
pub mod relocator;
pub mod sanitize;
pub mod service;
pub mod session;
#[cfg(test)]
mod test_utils;
#[cfg(feature = "tray")]
mod tray;
pub mod validation;

use crate::db::{migrations, Database};
use directories::ProjectDirs;
use log::warn;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[cfg(feature = "tray")]
pub use tray::run;

/// Error type for AutoReplay initialization failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,

    #[error("Could not create data directory: {0}")]
    DataDirCreation(std::io::Error),

    #[error("Failed to open database: {0}")]
    DatabaseOpen(rusqlite::Error),

    #[error("Failed to run database migrations: {0}")]
    Migration(rusqlite::Error),

    #[error("Failed to load settings: {0}")]
    Settings(rusqlite::Error),
}

/// Default database location in the platform data directory.
pub fn get_db_path() -> Result<PathBuf, InitError> {
    let proj_dirs =
        ProjectDirs::from("com", "autoreplay", "AutoReplay").ok_or(InitError::NoProjectDirs)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(InitError::DataDirCreation)?;
    Ok(data_dir.join("autoreplay.db"))
}

/// Open the database at `path` and bring its schema up to date.
pub fn open_database(path: &Path) -> Result<Database, InitError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(InitError::DataDirCreation)?;
    }
    let db = Database::open(path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    Ok(db)
}

/// Lock a mutex, recovering from poisoning if necessary
pub fn safe_lock<'a, T>(mutex: &'a Mutex<T>, context: &str) -> MutexGuard<'a, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("{context} mutex was poisoned, recovering");
            poisoned.into_inner()
        }
    }
}
