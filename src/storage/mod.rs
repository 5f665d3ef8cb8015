//! Flat key-value persistence for [`AppState`].
//!
//! State is stored as one JSON object whose keys mirror the settings store the
//! app historically used. Each key decodes on its own: a corrupt value falls
//! back to its default with a warning instead of failing the whole load.

pub mod json_backend;
pub mod memory;

use chrono::NaiveDateTime;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    engine::AppState,
    errors::Result,
    ledger::{BalanceLedger, TransactionRecord},
};

pub use json_backend::JsonStateStore;
pub use memory::MemoryStateStore;

pub const KEY_EXPENSES: &str = "expenses";
pub const KEY_INCOMES: &str = "incomes";
pub const KEY_BALANCE: &str = "balance";
pub const KEY_NEXT_MONTH_BUDGET: &str = "nextMonthBudget";
pub const KEY_LAST_OPENED: &str = "lastOpenedDate";
pub const KEY_LAST_RESET_MONTH: &str = "lastResetMonth";
pub const KEY_HAS_LAUNCHED: &str = "hasLaunchedBefore";

/// Load/save boundary between the engine and wherever state lives.
pub trait StateStore: Send + Sync {
    fn load(&self) -> Result<AppState>;
    fn save(&self, state: &AppState) -> Result<()>;
}

pub fn encode_state(state: &AppState) -> Result<Value> {
    let mut map = Map::new();
    map.insert(KEY_EXPENSES.into(), serde_json::to_value(&state.expenses)?);
    map.insert(KEY_INCOMES.into(), serde_json::to_value(&state.incomes)?);
    map.insert(KEY_BALANCE.into(), serde_json::to_value(state.ledger.balance())?);
    if let Some(budget) = state.ledger.pending_next_month_budget {
        map.insert(KEY_NEXT_MONTH_BUDGET.into(), serde_json::to_value(budget)?);
    }
    if let Some(last) = state.ledger.last_activation {
        map.insert(KEY_LAST_OPENED.into(), serde_json::to_value(last)?);
    }
    map.insert(
        KEY_LAST_RESET_MONTH.into(),
        Value::from(state.ledger.last_budget_reset_month),
    );
    map.insert(
        KEY_HAS_LAUNCHED.into(),
        Value::from(state.ledger.has_completed_first_launch),
    );
    Ok(Value::Object(map))
}

/// Rebuilds state from a stored object; anything missing or malformed becomes
/// its default.
pub fn decode_state(value: &Value) -> AppState {
    let Some(map) = value.as_object() else {
        warn!("persisted state is not an object, starting fresh");
        return AppState::default();
    };

    let expenses: Vec<TransactionRecord> = decode_key(map, KEY_EXPENSES).unwrap_or_default();
    let incomes: Vec<TransactionRecord> = decode_key(map, KEY_INCOMES).unwrap_or_default();

    let mut ledger = BalanceLedger::with_balance(decode_key(map, KEY_BALANCE).unwrap_or(0.0));
    ledger.pending_next_month_budget = decode_key(map, KEY_NEXT_MONTH_BUDGET);
    ledger.last_activation = decode_key::<NaiveDateTime>(map, KEY_LAST_OPENED);
    ledger.last_budget_reset_month = decode_key::<u32>(map, KEY_LAST_RESET_MONTH)
        .filter(|month| *month <= 12)
        .unwrap_or(0);
    ledger.has_completed_first_launch = decode_key(map, KEY_HAS_LAUNCHED).unwrap_or(false);

    AppState {
        expenses,
        incomes,
        ledger,
    }
}

fn decode_key<T: DeserializeOwned>(map: &Map<String, Value>, key: &str) -> Option<T> {
    let raw = map.get(key)?;
    if raw.is_null() {
        return None;
    }
    match serde_json::from_value(raw.clone()) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, error = %err, "discarding undecodable persisted value");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Category, ExpenseCategory, Recurrence};
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn encoded_state_uses_flat_keys() {
        let now = NaiveDate::from_ymd_opt(2024, 6, 1)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap();
        let mut state = AppState::default();
        state.ledger.set_balance(42.5);
        state.ledger.pending_next_month_budget = Some(900.0);
        state.ledger.last_activation = Some(now);
        state.ledger.last_budget_reset_month = 6;
        state.ledger.has_completed_first_launch = true;
        state.expenses.push(TransactionRecord::new(
            "Rent",
            Category::Expense(ExpenseCategory::Bills),
            700.0,
            Recurrence::Monthly,
            now,
        ));

        let value = encode_state(&state).unwrap();

        assert_eq!(value[KEY_BALANCE], json!(42.5));
        assert_eq!(value[KEY_NEXT_MONTH_BUDGET], json!(900.0));
        assert_eq!(value[KEY_LAST_RESET_MONTH], json!(6));
        assert_eq!(value[KEY_HAS_LAUNCHED], json!(true));
        assert_eq!(value[KEY_EXPENSES].as_array().map(Vec::len), Some(1));
        assert_eq!(decode_state(&value), state);
    }

    #[test]
    fn corrupt_key_falls_back_without_poisoning_others() {
        let value = json!({
            "expenses": "not a list",
            "incomes": [],
            "balance": 12.0,
            "lastResetMonth": 44,
            "hasLaunchedBefore": true
        });

        let state = decode_state(&value);

        assert!(state.expenses.is_empty());
        assert_eq!(state.balance(), 12.0);
        assert_eq!(state.ledger.last_budget_reset_month, 0);
        assert!(state.ledger.has_completed_first_launch);
        assert!(state.ledger.pending_next_month_budget.is_none());
    }

    #[test]
    fn non_object_payload_starts_fresh() {
        assert_eq!(decode_state(&json!([1, 2, 3])), AppState::default());
    }
}
