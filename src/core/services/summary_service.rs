use std::collections::BTreeMap;

use crate::engine::AppState;
use crate::ledger::{Category, TransactionKind, TransactionRecord};

/// Figures the main screen shows: balance, budget and per-category totals.
#[derive(Debug, Clone, PartialEq)]
pub struct Overview {
    pub balance: f64,
    pub pending_budget: Option<f64>,
    pub income_by_category: BTreeMap<Category, f64>,
    pub expense_by_category: BTreeMap<Category, f64>,
    pub total_income: f64,
    pub total_expense: f64,
}

pub struct SummaryService;

impl SummaryService {
    /// Sums amounts per category, ignoring archived records.
    pub fn totals_by_category(records: &[TransactionRecord]) -> BTreeMap<Category, f64> {
        let mut totals = BTreeMap::new();
        for record in records.iter().filter(|record| !record.is_archived) {
            *totals.entry(record.category).or_insert(0.0) += record.amount;
        }
        totals
    }

    pub fn overview(state: &AppState) -> Overview {
        let income_by_category = Self::totals_by_category(&state.incomes);
        let expense_by_category = Self::totals_by_category(&state.expenses);
        Overview {
            balance: state.balance(),
            pending_budget: state.ledger.pending_next_month_budget,
            total_income: income_by_category.values().sum(),
            total_expense: expense_by_category.values().sum(),
            income_by_category,
            expense_by_category,
        }
    }

    /// Non-archived records of `kind`, newest first.
    pub fn history(state: &AppState, kind: TransactionKind) -> Vec<&TransactionRecord> {
        state
            .records(kind)
            .iter()
            .rev()
            .filter(|record| !record.is_archived)
            .collect()
    }
}
