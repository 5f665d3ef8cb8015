pub mod budget_service;
pub mod summary_service;
pub mod transaction_service;

pub use budget_service::BudgetService;
pub use summary_service::{Overview, SummaryService};
pub use transaction_service::{parse_amount, NewTransaction, TransactionService};

use uuid::Uuid;

use crate::errors::BudgetError;

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("Validation failed: {0}")]
    Invalid(String),
    #[error("Record not found: {0}")]
    RecordNotFound(Uuid),
}
