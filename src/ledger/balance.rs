use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Running balance plus the bookkeeping the monthly rollover needs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BalanceLedger {
    balance: f64,
    /// Budget to apply when the next calendar month starts.
    pub pending_next_month_budget: Option<f64>,
    pub last_activation: Option<NaiveDateTime>,
    /// Month (1-12) of the last budget reset, 0 when none happened yet.
    pub last_budget_reset_month: u32,
    pub has_completed_first_launch: bool,
}

impl BalanceLedger {
    pub fn with_balance(balance: f64) -> Self {
        Self {
            balance,
            ..Self::default()
        }
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn set_balance(&mut self, value: f64) {
        self.balance = value;
    }

    pub fn adjust(&mut self, delta: f64) {
        self.balance += delta;
    }

    pub fn is_overdrawn(&self) -> bool {
        self.balance < 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjust_allows_negative_balance() {
        let mut ledger = BalanceLedger::with_balance(20.0);
        ledger.adjust(-35.5);
        assert_eq!(ledger.balance(), -15.5);
        assert!(ledger.is_overdrawn());
        ledger.set_balance(100.0);
        assert_eq!(ledger.balance(), 100.0);
        assert!(!ledger.is_overdrawn());
    }
}
