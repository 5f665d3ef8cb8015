use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::recurrence::{CustomInterval, Recurrence};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// Signed balance effect of a record of this kind with the given amount.
    pub fn signed(&self, amount: f64) -> f64 {
        match self {
            TransactionKind::Income => amount,
            TransactionKind::Expense => -amount,
        }
    }

    pub fn parse(raw: &str) -> Option<TransactionKind> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "income" | "incomes" => Some(TransactionKind::Income),
            "expense" | "expenses" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::Income => f.write_str("income"),
            TransactionKind::Expense => f.write_str("expense"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IncomeCategory {
    Work,
    Gifts,
    Other,
    /// Reserved for budget records created by the engine; never auto-fired.
    MonthlyBudget,
}

impl IncomeCategory {
    /// Categories a user may pick when entering an income by hand.
    pub const SELECTABLE: [IncomeCategory; 3] =
        [IncomeCategory::Work, IncomeCategory::Gifts, IncomeCategory::Other];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExpenseCategory {
    Personal,
    Food,
    Work,
    Health,
    Travel,
    Bills,
    Gifts,
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 8] = [
        ExpenseCategory::Personal,
        ExpenseCategory::Food,
        ExpenseCategory::Work,
        ExpenseCategory::Health,
        ExpenseCategory::Travel,
        ExpenseCategory::Bills,
        ExpenseCategory::Gifts,
        ExpenseCategory::Other,
    ];
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Income(IncomeCategory),
    Expense(ExpenseCategory),
}

impl Category {
    pub fn kind(&self) -> TransactionKind {
        match self {
            Category::Income(_) => TransactionKind::Income,
            Category::Expense(_) => TransactionKind::Expense,
        }
    }

    pub fn is_monthly_budget(&self) -> bool {
        matches!(self, Category::Income(IncomeCategory::MonthlyBudget))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Category::Income(IncomeCategory::Work) => "Work",
            Category::Income(IncomeCategory::Gifts) => "Gifts",
            Category::Income(IncomeCategory::Other) => "Other",
            Category::Income(IncomeCategory::MonthlyBudget) => "Monthly budget",
            Category::Expense(ExpenseCategory::Personal) => "Personal",
            Category::Expense(ExpenseCategory::Food) => "Food",
            Category::Expense(ExpenseCategory::Work) => "Work",
            Category::Expense(ExpenseCategory::Health) => "Health",
            Category::Expense(ExpenseCategory::Travel) => "Travel",
            Category::Expense(ExpenseCategory::Bills) => "Bills",
            Category::Expense(ExpenseCategory::Gifts) => "Gifts",
            Category::Expense(ExpenseCategory::Other) => "Other",
        }
    }

    /// Resolves a category name within the set that belongs to `kind`.
    pub fn parse(kind: TransactionKind, raw: &str) -> Option<Category> {
        let needle = raw.trim();
        match kind {
            TransactionKind::Income => IncomeCategory::SELECTABLE
                .into_iter()
                .chain(std::iter::once(IncomeCategory::MonthlyBudget))
                .map(Category::Income)
                .find(|category| category.name().eq_ignore_ascii_case(needle)),
            TransactionKind::Expense => ExpenseCategory::ALL
                .into_iter()
                .map(Category::Expense)
                .find(|category| category.name().eq_ignore_ascii_case(needle)),
        }
    }

    pub fn default_for(kind: TransactionKind) -> Category {
        match kind {
            TransactionKind::Income => Category::Income(IncomeCategory::Work),
            TransactionKind::Expense => Category::Expense(ExpenseCategory::Personal),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single income or expense entry.
///
/// Recurring records double as templates: when one comes due the engine
/// advances its `next_due_date` and appends a materialized copy with a fresh id
/// to history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub kind: TransactionKind,
    pub name: String,
    pub category: Category,
    pub amount: f64,
    #[serde(default)]
    pub recurrence: Recurrence,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default)]
    pub next_due_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    #[serde(default = "TransactionRecord::default_series_id")]
    pub series_id: Uuid,
}

impl TransactionRecord {
    /// Builds a record created at `created_at`, scheduling its first recurrence
    /// relative to that moment.
    pub fn new(
        name: impl Into<String>,
        category: Category,
        amount: f64,
        recurrence: Recurrence,
        created_at: NaiveDateTime,
    ) -> Self {
        let id = Uuid::new_v4();
        Self {
            id,
            kind: category.kind(),
            name: name.into(),
            category,
            amount,
            recurrence,
            is_archived: false,
            next_due_date: recurrence.next_due_date(created_at),
            created_at,
            series_id: id,
        }
    }

    pub fn with_next_due(mut self, next_due_date: Option<NaiveDateTime>) -> Self {
        self.next_due_date = next_due_date;
        self
    }

    pub fn compute_next_due(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        self.recurrence.next_due_date(reference)
    }

    /// Effect of this record on the running balance.
    pub fn signed_amount(&self) -> f64 {
        self.kind.signed(self.amount)
    }

    /// Series the record belongs to; records persisted before series tracking
    /// fall back to their own id.
    pub fn series(&self) -> Uuid {
        if self.series_id.is_nil() {
            self.id
        } else {
            self.series_id
        }
    }

    /// New history entry for an occurrence that fired at `fired_at`. A custom
    /// cadence is copied with its interval cleared, so a copy that outlives its
    /// template comes due every day.
    pub fn materialize(&self, fired_at: NaiveDateTime) -> TransactionRecord {
        TransactionRecord {
            id: Uuid::new_v4(),
            kind: self.kind,
            name: self.name.clone(),
            category: self.category,
            amount: self.amount,
            recurrence: match self.recurrence {
                Recurrence::Custom(_) => Recurrence::Custom(CustomInterval::default()),
                other => other,
            },
            is_archived: false,
            next_due_date: self.next_due_date,
            created_at: fired_at,
            series_id: self.series(),
        }
    }

    pub fn default_series_id() -> Uuid {
        Uuid::nil()
    }
}
