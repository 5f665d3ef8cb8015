use chrono::NaiveDateTime;
use tracing::info;
use uuid::Uuid;

use crate::engine::AppState;
use crate::ledger::{Category, CustomInterval, Recurrence, TransactionKind, TransactionRecord};

use super::{ServiceError, ServiceResult};

/// Upper bounds for custom cadences entered by hand: years, months, days.
pub const MAX_CUSTOM_INTERVAL: CustomInterval = CustomInterval {
    years: 20,
    months: 11,
    days: 30,
};

/// User-entered data for a new income or expense.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub name: String,
    pub category: Category,
    pub amount: f64,
    pub recurrence: Recurrence,
}

impl NewTransaction {
    pub fn new(
        name: impl Into<String>,
        category: Category,
        amount: f64,
        recurrence: Recurrence,
    ) -> Self {
        Self {
            name: name.into(),
            category,
            amount,
            recurrence,
        }
    }

    fn validate(&self) -> ServiceResult<()> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::Invalid("name must not be empty".into()));
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ServiceError::Invalid(format!(
                "amount must be a positive number, got {}",
                self.amount
            )));
        }
        if self.category.is_monthly_budget() {
            return Err(ServiceError::Invalid(
                "the monthly budget category is reserved for budget entries".into(),
            ));
        }
        if let Recurrence::Custom(interval) = self.recurrence {
            let max = MAX_CUSTOM_INTERVAL;
            if interval.years > max.years || interval.months > max.months || interval.days > max.days
            {
                return Err(ServiceError::Invalid(format!(
                    "custom frequency allows at most {} years, {} months and {} days",
                    max.years, max.months, max.days
                )));
            }
        }
        Ok(())
    }
}

/// Parses a user-typed amount, accepting either `,` or `.` as the decimal mark.
pub fn parse_amount(raw: &str) -> ServiceResult<f64> {
    let normalized = raw.trim().replace(',', ".");
    let amount: f64 = normalized
        .parse()
        .map_err(|_| ServiceError::Invalid(format!("`{}` is not a number", raw.trim())))?;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(ServiceError::Invalid(format!(
            "amount must be greater than zero, got `{}`",
            raw.trim()
        )));
    }
    Ok(amount)
}

pub struct TransactionService;

impl TransactionService {
    /// Records a new entry, applies it to the balance right away and schedules
    /// its first recurrence from `now`.
    pub fn create(
        state: &mut AppState,
        input: NewTransaction,
        now: NaiveDateTime,
    ) -> ServiceResult<TransactionRecord> {
        input.validate()?;
        let record = TransactionRecord::new(
            input.name.trim(),
            input.category,
            input.amount,
            input.recurrence,
            now,
        );
        state.ledger.adjust(record.signed_amount());
        state.records_mut(record.kind).push(record.clone());
        info!(
            kind = %record.kind,
            name = %record.name,
            amount = record.amount,
            recurrence = %record.recurrence,
            "transaction recorded"
        );
        Ok(record)
    }

    /// Removes one record and undoes its balance effect.
    pub fn delete(
        state: &mut AppState,
        kind: TransactionKind,
        id: Uuid,
    ) -> ServiceResult<TransactionRecord> {
        let records = state.records_mut(kind);
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or(ServiceError::RecordNotFound(id))?;
        let removed = records.remove(index);
        state.ledger.adjust(reversal(&removed));
        info!(kind = %kind, name = %removed.name, "transaction deleted");
        Ok(removed)
    }

    /// Removes every record of `kind` matching `predicate`, undoing their balance
    /// effects. Returns how many were removed.
    pub fn delete_where<F>(state: &mut AppState, kind: TransactionKind, predicate: F) -> usize
    where
        F: Fn(&TransactionRecord) -> bool,
    {
        let records = state.records_mut(kind);
        let mut removed = Vec::new();
        records.retain(|record| {
            if predicate(record) {
                removed.push(record.clone());
                false
            } else {
                true
            }
        });
        let delta: f64 = removed.iter().map(reversal).sum();
        state.ledger.adjust(delta);
        if !removed.is_empty() {
            info!(kind = %kind, count = removed.len(), delta, "transactions deleted");
        }
        removed.len()
    }

    /// Clears the visible history: every non-archived record, except budget
    /// entries which stay as the month's reference.
    pub fn delete_all(state: &mut AppState, kind: TransactionKind) -> usize {
        Self::delete_where(state, kind, |record| {
            !record.is_archived && !record.category.is_monthly_budget()
        })
    }

    pub fn set_archived(
        state: &mut AppState,
        kind: TransactionKind,
        id: Uuid,
        archived: bool,
    ) -> ServiceResult<()> {
        let record = state
            .records_mut(kind)
            .iter_mut()
            .find(|record| record.id == id)
            .ok_or(ServiceError::RecordNotFound(id))?;
        record.is_archived = archived;
        Ok(())
    }
}

/// Balance change that undoes a record. Budget entries only document a reset,
/// so removing them leaves the balance alone.
fn reversal(record: &TransactionRecord) -> f64 {
    if record.category.is_monthly_budget() {
        0.0
    } else {
        -record.signed_amount()
    }
}
