use chrono::{Datelike, NaiveDateTime};
use tracing::{debug, info};

use super::{
    catch_up::{run_catch_up, CatchUpOptions, CatchUpOutcome},
    state::AppState,
};
use crate::ledger::{
    recurrence::same_month, Category, IncomeCategory, Recurrence, TransactionRecord,
};

/// What an activation changed, for logging and for the UI to react to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivationReport {
    pub rolled_over: bool,
    pub budget_applied: Option<f64>,
    pub purged_expenses: usize,
    pub purged_incomes: usize,
    pub fired_expenses: usize,
    pub fired_incomes: usize,
    pub backfilled: usize,
    pub balance_delta: f64,
    pub balance: f64,
    /// No budget has ever been set; the UI should ask for one.
    pub needs_initial_budget: bool,
}

impl ActivationReport {
    fn absorb(&mut self, expenses: &CatchUpOutcome, incomes: &CatchUpOutcome) {
        self.fired_expenses += expenses.fired();
        self.fired_incomes += incomes.fired();
        self.balance_delta += expenses.balance_delta + incomes.balance_delta;
    }
}

/// Brings `state` up to date with `now`.
///
/// Within the same month this is a plain catch-up over the live lists. When a
/// month boundary was crossed the pending budget (if any) replaces the balance,
/// records created outside the current month are purged from the live lists,
/// and catch-up runs over a snapshot taken before the purge so recurring
/// records from the previous month still fire for the days of the new one.
pub fn on_activation(
    state: &mut AppState,
    now: NaiveDateTime,
    options: &CatchUpOptions,
) -> ActivationReport {
    let last = state.ledger.last_activation.unwrap_or(now);
    let mut report = ActivationReport::default();

    if same_month(last, now) {
        debug!(last = %last, now = %now, "activation within the same month");
        let expenses = run_catch_up(&state.expenses, last, now, options);
        let incomes = run_catch_up(&state.incomes, last, now, options);
        report.absorb(&expenses, &incomes);
        expenses.apply_to(&mut state.expenses, &mut state.ledger);
        incomes.apply_to(&mut state.incomes, &mut state.ledger);
    } else {
        info!(last = %last, now = %now, "calendar month changed since last activation");
        report.rolled_over = true;

        let snapshot = state.clone();
        report.budget_applied = apply_pending_budget(state, now);
        report.purged_expenses = purge_outside_month(&mut state.expenses, now);
        report.purged_incomes = purge_outside_month(&mut state.incomes, now);

        let expenses = run_catch_up(&snapshot.expenses, last, now, options);
        let incomes = run_catch_up(&snapshot.incomes, last, now, options);
        report.absorb(&expenses, &incomes);
        expenses.apply_to(&mut state.expenses, &mut state.ledger);
        incomes.apply_to(&mut state.incomes, &mut state.ledger);
    }

    report.backfilled =
        backfill_due_dates(&mut state.expenses, now) + backfill_due_dates(&mut state.incomes, now);
    state.ledger.last_activation = Some(now);
    report.balance = state.ledger.balance();
    report.needs_initial_budget = !state.ledger.has_completed_first_launch;

    info!(
        rolled_over = report.rolled_over,
        fired_expenses = report.fired_expenses,
        fired_incomes = report.fired_incomes,
        balance = report.balance,
        "activation complete"
    );
    report
}

/// The income record that documents a budget being applied for `now`'s month.
pub fn budget_record(amount: f64, now: NaiveDateTime) -> TransactionRecord {
    TransactionRecord::new(
        format!("Budget for {}", now.format("%B")),
        Category::Income(IncomeCategory::MonthlyBudget),
        amount,
        Recurrence::OneTime,
        now,
    )
}

fn apply_pending_budget(state: &mut AppState, now: NaiveDateTime) -> Option<f64> {
    if state.ledger.last_budget_reset_month == now.month() {
        return None;
    }
    let budget = state.ledger.pending_next_month_budget?;
    state.ledger.set_balance(budget);
    state.ledger.last_budget_reset_month = now.month();
    state.ledger.has_completed_first_launch = true;
    state.incomes.push(budget_record(budget, now));
    info!(budget, month = now.month(), "monthly budget applied");
    Some(budget)
}

fn purge_outside_month(records: &mut Vec<TransactionRecord>, now: NaiveDateTime) -> usize {
    let before = records.len();
    records.retain(|record| same_month(record.created_at, now));
    before - records.len()
}

fn backfill_due_dates(records: &mut [TransactionRecord], now: NaiveDateTime) -> usize {
    let mut filled = 0;
    for record in records
        .iter_mut()
        .filter(|record| record.recurrence.is_recurring() && record.next_due_date.is_none())
    {
        record.next_due_date = record.compute_next_due(now);
        filled += 1;
    }
    filled
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{BalanceLedger, CustomInterval, ExpenseCategory, IncomeCategory};
    use chrono::NaiveDate;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn state_last_opened(last: NaiveDateTime, balance: f64) -> AppState {
        let mut ledger = BalanceLedger::with_balance(balance);
        ledger.last_activation = Some(last);
        ledger.has_completed_first_launch = true;
        AppState {
            ledger,
            ..AppState::default()
        }
    }

    #[test]
    fn first_activation_treats_now_as_last_opened() {
        let now = at(2024, 5, 2, 10);
        let mut state = AppState::default();
        state.expenses.push(
            TransactionRecord::new(
                "Coffee",
                Category::Expense(ExpenseCategory::Food),
                3.0,
                Recurrence::Daily,
                at(2024, 4, 1, 10),
            )
            .with_next_due(Some(at(2024, 4, 2, 10))),
        );

        let report = on_activation(&mut state, now, &CatchUpOptions::default());

        assert!(!report.rolled_over);
        assert_eq!(report.fired_expenses, 0);
        assert!(report.needs_initial_budget);
        assert_eq!(state.ledger.last_activation, Some(now));
    }

    #[test]
    fn rollover_applies_pending_budget_exactly() {
        let mut state = state_last_opened(at(2024, 1, 5, 9), -120.0);
        state.ledger.pending_next_month_budget = Some(2000.0);
        state.ledger.last_budget_reset_month = 1;

        let report = on_activation(&mut state, at(2024, 4, 20, 9), &CatchUpOptions::default());

        assert!(report.rolled_over);
        assert_eq!(report.budget_applied, Some(2000.0));
        assert_eq!(state.ledger.balance(), 2000.0);
        assert_eq!(state.ledger.last_budget_reset_month, 4);
        let budgets: Vec<_> = state
            .incomes
            .iter()
            .filter(|record| record.category.is_monthly_budget())
            .collect();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "Budget for April");
        assert_eq!(budgets[0].amount, 2000.0);
        assert_eq!(budgets[0].recurrence, Recurrence::OneTime);
        assert!(budgets[0].next_due_date.is_none());
    }

    #[test]
    fn rollover_without_pending_budget_keeps_balance() {
        let mut state = state_last_opened(at(2024, 1, 5, 9), 340.0);

        let report = on_activation(&mut state, at(2024, 2, 1, 9), &CatchUpOptions::default());

        assert!(report.rolled_over);
        assert_eq!(report.budget_applied, None);
        assert_eq!(state.ledger.balance(), 340.0);
        assert!(state.incomes.is_empty());
    }

    #[test]
    fn budget_not_reapplied_in_month_already_reset() {
        let mut state = state_last_opened(at(2024, 1, 5, 9), 75.0);
        state.ledger.pending_next_month_budget = Some(1500.0);
        state.ledger.last_budget_reset_month = 2;

        let report = on_activation(&mut state, at(2024, 2, 3, 9), &CatchUpOptions::default());

        assert_eq!(report.budget_applied, None);
        assert_eq!(state.ledger.balance(), 75.0);
    }

    #[test]
    fn rollover_purges_old_history_but_fires_from_snapshot() {
        let last = at(2024, 1, 28, 9);
        let now = at(2024, 2, 3, 9);
        let mut state = state_last_opened(last, 500.0);
        state.ledger.pending_next_month_budget = Some(1000.0);

        let rent = TransactionRecord::new(
            "Rent",
            Category::Expense(ExpenseCategory::Bills),
            400.0,
            Recurrence::Monthly,
            at(2024, 1, 1, 9),
        );
        let lunch = TransactionRecord::new(
            "Lunch",
            Category::Expense(ExpenseCategory::Food),
            12.0,
            Recurrence::OneTime,
            at(2024, 1, 15, 13),
        );
        state.expenses = vec![rent.clone(), lunch];

        let report = on_activation(&mut state, now, &CatchUpOptions::default());

        assert_eq!(report.purged_expenses, 2);
        assert_eq!(report.fired_expenses, 1);
        // Rent was due Feb 1 09:00 and fires on Feb 2 against the fresh budget.
        assert_eq!(state.ledger.balance(), 600.0);
        assert_eq!(state.expenses.len(), 1);
        let fired = &state.expenses[0];
        assert_eq!(fired.name, "Rent");
        assert_ne!(fired.id, rent.id);
        assert_eq!(fired.created_at.date(), NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        assert_eq!(fired.next_due_date, Some(at(2024, 3, 1, 9)));
        assert_eq!(state.incomes.len(), 1);
    }

    #[test]
    fn copy_of_custom_template_fires_daily_after_purge() {
        let last = at(2024, 1, 28, 9);
        let mut state = state_last_opened(last, 500.0);
        let every_ten_days = Recurrence::Custom(CustomInterval::new(0, 0, 10));
        state.expenses.push(TransactionRecord::new(
            "Water",
            Category::Expense(ExpenseCategory::Bills),
            5.0,
            every_ten_days,
            at(2024, 1, 22, 9),
        ));

        let report = on_activation(&mut state, at(2024, 2, 3, 9), &CatchUpOptions::default());
        assert_eq!(report.purged_expenses, 1);
        assert_eq!(report.fired_expenses, 1);
        assert_eq!(state.expenses.len(), 1);
        let copy = &state.expenses[0];
        assert_eq!(copy.recurrence, Recurrence::Custom(CustomInterval::default()));
        assert_eq!(copy.next_due_date, Some(at(2024, 2, 11, 9)));

        // With the interval cleared the copy is due on every day after Feb 11.
        let report = on_activation(&mut state, at(2024, 2, 14, 9), &CatchUpOptions::default());
        assert_eq!(report.fired_expenses, 3);
        assert_eq!(state.ledger.balance(), 500.0 - 5.0 * 4.0);
    }

    #[test]
    fn same_month_activation_updates_templates_in_place() {
        let last = at(2024, 3, 10, 9);
        let now = at(2024, 3, 13, 9);
        let mut state = state_last_opened(last, 100.0);
        let salary = TransactionRecord::new(
            "Tutoring",
            Category::Income(IncomeCategory::Work),
            25.0,
            Recurrence::Daily,
            at(2024, 3, 9, 9),
        );
        state.incomes.push(salary.clone());

        let report = on_activation(&mut state, now, &CatchUpOptions::default());

        assert!(!report.rolled_over);
        assert_eq!(report.fired_incomes, 3);
        assert_eq!(report.balance_delta, 75.0);
        assert_eq!(state.ledger.balance(), 175.0);
        assert_eq!(state.incomes.len(), 4);
        assert_eq!(state.incomes[0].id, salary.id);
        assert_eq!(state.incomes[0].next_due_date, Some(at(2024, 3, 13, 9)));
    }

    #[test]
    fn second_activation_at_same_instant_changes_nothing() {
        let now = at(2024, 3, 13, 9);
        let mut state = state_last_opened(at(2024, 3, 10, 9), 100.0);
        state.expenses.push(TransactionRecord::new(
            "Bus",
            Category::Expense(ExpenseCategory::Travel),
            2.0,
            Recurrence::Daily,
            at(2024, 3, 9, 9),
        ));

        on_activation(&mut state, now, &CatchUpOptions::default());
        let settled = state.clone();
        let report = on_activation(&mut state, now, &CatchUpOptions::default());

        assert_eq!(report.fired_expenses, 0);
        assert_eq!(report.balance_delta, 0.0);
        assert_eq!(state, settled);
    }

    #[test]
    fn backfills_missing_due_dates() {
        let now = at(2024, 3, 13, 9);
        let mut state = state_last_opened(now, 0.0);
        let mut record = TransactionRecord::new(
            "Phone",
            Category::Expense(ExpenseCategory::Bills),
            30.0,
            Recurrence::Monthly,
            at(2024, 3, 1, 9),
        );
        record.next_due_date = None;
        state.expenses.push(record);

        let report = on_activation(&mut state, now, &CatchUpOptions::default());

        assert_eq!(report.backfilled, 1);
        assert_eq!(state.expenses[0].next_due_date, Some(at(2024, 4, 13, 9)));
    }
}
