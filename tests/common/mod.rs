use std::sync::Mutex;

use chrono::{NaiveDate, NaiveDateTime};
use mybudget_core::{
    config::ConfigManager,
    engine::{CatchUpOptions, Engine},
    storage::JsonStateStore,
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Engine and config manager backed by a fresh directory.
#[allow(dead_code)]
pub fn setup_test_env() -> (Engine, ConfigManager, std::path::PathBuf) {
    let temp = TempDir::new().expect("create temp dir");
    let base = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);

    let engine = Engine::new(
        Box::new(JsonStateStore::in_dir(&base)),
        CatchUpOptions::default(),
    );
    let config_manager =
        ConfigManager::with_base_dir(base.clone()).expect("create config manager for temp dir");

    (engine, config_manager, base)
}

#[allow(dead_code)]
pub fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, 0, 0)
        .unwrap()
}
