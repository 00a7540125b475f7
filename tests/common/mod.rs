#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;

use agency_books::{
    book::Book,
    config::{Config, ConfigManager},
    currency::CurrencyCode,
    storage::JsonStorage,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Fresh directory that outlives the calling test.
pub fn temp_home() -> PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    base
}

/// Creates isolated storage and config managers backed by a unique directory.
pub fn setup_test_env() -> (JsonStorage, ConfigManager, PathBuf) {
    let base = temp_home();
    let storage = JsonStorage::new(Some(base.clone()), Some(3)).expect("create json storage");
    let config = ConfigManager::with_base_dir(base.clone()).expect("create config manager");
    (storage, config, base)
}

pub fn seeded_book() -> Book {
    Book::seeded("Test Agency")
}

pub fn well_known() -> Vec<CurrencyCode> {
    Config::default().well_known_codes()
}
