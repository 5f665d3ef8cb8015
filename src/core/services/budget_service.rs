use chrono::NaiveDateTime;
use tracing::info;

use crate::engine::{budget_record, AppState};

use super::{transaction_service::parse_amount, ServiceError, ServiceResult};

pub struct BudgetService;

impl BudgetService {
    /// Sets the monthly budget.
    ///
    /// The very first budget also becomes the current balance and is recorded
    /// as this month's budget entry. After that the amount is only remembered
    /// and takes effect when the next month starts.
    pub fn set_monthly_budget(
        state: &mut AppState,
        amount: f64,
        now: NaiveDateTime,
    ) -> ServiceResult<()> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ServiceError::Invalid(format!(
                "budget must be a non-negative number, got {amount}"
            )));
        }

        state.ledger.pending_next_month_budget = Some(amount);
        if state.ledger.has_completed_first_launch {
            info!(amount, "next month's budget updated");
            return Ok(());
        }

        state.ledger.set_balance(amount);
        state.ledger.has_completed_first_launch = true;
        state.incomes.push(budget_record(amount, now));
        info!(amount, "initial budget set");
        Ok(())
    }

    /// Same as [`BudgetService::set_monthly_budget`] for user-typed text.
    pub fn set_monthly_budget_from_text(
        state: &mut AppState,
        raw: &str,
        now: NaiveDateTime,
    ) -> ServiceResult<()> {
        let amount = parse_amount(raw)?;
        Self::set_monthly_budget(state, amount, now)
    }

    pub fn pending_budget(state: &AppState) -> Option<f64> {
        state.ledger.pending_next_month_budget
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 7, 4)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    #[test]
    fn first_budget_sets_balance_and_records_entry() {
        let mut state = AppState::default();

        BudgetService::set_monthly_budget(&mut state, 1800.0, now()).unwrap();

        assert_eq!(state.balance(), 1800.0);
        assert!(state.ledger.has_completed_first_launch);
        assert_eq!(BudgetService::pending_budget(&state), Some(1800.0));
        assert_eq!(state.incomes.len(), 1);
        assert_eq!(state.incomes[0].name, "Budget for July");
    }

    #[test]
    fn later_budget_only_changes_next_month() {
        let mut state = AppState::default();
        BudgetService::set_monthly_budget(&mut state, 1800.0, now()).unwrap();
        state.ledger.adjust(-300.0);

        BudgetService::set_monthly_budget_from_text(&mut state, "2100,00", now()).unwrap();

        assert_eq!(state.balance(), 1500.0);
        assert_eq!(state.incomes.len(), 1);
        assert_eq!(BudgetService::pending_budget(&state), Some(2100.0));
    }

    #[test]
    fn rejects_bad_text() {
        let mut state = AppState::default();
        assert!(BudgetService::set_monthly_budget_from_text(&mut state, "lots", now()).is_err());
        assert!(BudgetService::set_monthly_budget(&mut state, f64::INFINITY, now()).is_err());
        assert!(!state.ledger.has_completed_first_launch);
    }
}
