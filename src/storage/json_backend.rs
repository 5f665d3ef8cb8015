use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use serde_json::Value;
use tracing::{debug, warn};

use super::{decode_state, encode_state, StateStore};
use crate::{
    engine::AppState,
    errors::Result,
    utils::{paths, persistence::write_atomic},
};

/// Keeps the whole state in a single pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store rooted in the application data directory.
    pub fn new_default() -> Self {
        Self::in_dir(&paths::app_data_dir())
    }

    pub fn in_dir(base: &Path) -> Self {
        Self::new(paths::state_file_in(base))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<AppState> {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no saved state, starting fresh");
                return Ok(AppState::default());
            }
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state file unreadable, starting fresh");
                return Ok(AppState::default());
            }
        };
        match serde_json::from_str::<Value>(&data) {
            Ok(value) => Ok(decode_state(&value)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "state file is not valid JSON, starting fresh");
                Ok(AppState::default())
            }
        }
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let json = serde_json::to_string_pretty(&encode_state(state)?)?;
        write_atomic(&self.path, &json)?;
        debug!(path = %self.path.display(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_loads_default_state() {
        let dir = tempdir().unwrap();
        let store = JsonStateStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), AppState::default());
    }

    #[test]
    fn garbage_file_loads_default_state() {
        let dir = tempdir().unwrap();
        let store = JsonStateStore::in_dir(dir.path());
        fs::write(store.path(), "{ definitely not json").unwrap();
        assert_eq!(store.load().unwrap(), AppState::default());
    }
}
