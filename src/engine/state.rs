use crate::ledger::{BalanceLedger, TransactionKind, TransactionRecord};

/// Everything the engine reads and writes on an activation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub expenses: Vec<TransactionRecord>,
    pub incomes: Vec<TransactionRecord>,
    pub ledger: BalanceLedger,
}

impl AppState {
    pub fn records(&self, kind: TransactionKind) -> &[TransactionRecord] {
        match kind {
            TransactionKind::Expense => &self.expenses,
            TransactionKind::Income => &self.incomes,
        }
    }

    pub fn records_mut(&mut self, kind: TransactionKind) -> &mut Vec<TransactionRecord> {
        match kind {
            TransactionKind::Expense => &mut self.expenses,
            TransactionKind::Income => &mut self.incomes,
        }
    }

    pub fn balance(&self) -> f64 {
        self.ledger.balance()
    }
}
