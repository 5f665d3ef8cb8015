//! Record model, recurrence rules and the running balance.

pub mod balance;
pub mod record;
pub mod recurrence;

pub use balance::BalanceLedger;
pub use record::{Category, ExpenseCategory, IncomeCategory, TransactionKind, TransactionRecord};
pub use recurrence::{CustomInterval, Recurrence};
