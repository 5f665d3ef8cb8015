use std::sync::Mutex;

use serde_json::Value;

use super::{decode_state, encode_state, StateStore};
use crate::{
    engine::AppState,
    errors::{BudgetError, Result},
};

/// In-process store holding the encoded key-value object; used by tests and
/// by embedders that persist elsewhere.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    slot: Mutex<Option<Value>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_raw(value: Value) -> Self {
        Self {
            slot: Mutex::new(Some(value)),
        }
    }

    pub fn raw(&self) -> Option<Value> {
        self.slot.lock().ok().and_then(|guard| guard.clone())
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<AppState> {
        let guard = self
            .slot
            .lock()
            .map_err(|_| BudgetError::Storage("memory store lock poisoned".into()))?;
        Ok(guard.as_ref().map(decode_state).unwrap_or_default())
    }

    fn save(&self, state: &AppState) -> Result<()> {
        let encoded = encode_state(state)?;
        let mut guard = self
            .slot
            .lock()
            .map_err(|_| BudgetError::Storage("memory store lock poisoned".into()))?;
        *guard = Some(encoded);
        Ok(())
    }
}
