use std::collections::HashSet;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::ledger::{
    recurrence::{same_month, start_of_month},
    BalanceLedger, TransactionRecord,
};

pub const DEFAULT_MAX_CATCH_UP_DAYS: u32 = 400;

/// Identity used to make sure a record fires at most once per catch-up day.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DedupKey {
    /// Records sharing a name collapse into one per day. A template and its
    /// materialized copies share a name, so only the first one listed fires.
    #[default]
    Name,
    /// Records collapse per recurring series (the originating record's id), so
    /// unrelated records that happen to share a name fire independently.
    Series,
}

impl DedupKey {
    fn token(&self, record: &TransactionRecord) -> String {
        match self {
            DedupKey::Name => record.name.clone(),
            DedupKey::Series => record.series().to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatchUpOptions {
    pub dedup: DedupKey,
    pub max_days: u32,
}

impl Default for CatchUpOptions {
    fn default() -> Self {
        Self {
            dedup: DedupKey::default(),
            max_days: DEFAULT_MAX_CATCH_UP_DAYS,
        }
    }
}

/// Result of walking one record list from the last activation up to now.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchUpOutcome {
    /// Input records in their input order, with advanced due dates.
    pub updated: Vec<TransactionRecord>,
    /// One history entry per firing, in firing order.
    pub materialized: Vec<TransactionRecord>,
    pub balance_delta: f64,
}

impl CatchUpOutcome {
    pub fn fired(&self) -> usize {
        self.materialized.len()
    }

    /// Writes advanced due dates back into `target` (matching by id, records no
    /// longer present are skipped), appends the materialized history and moves
    /// the balance.
    pub fn apply_to(self, target: &mut Vec<TransactionRecord>, ledger: &mut BalanceLedger) {
        for record in self.updated {
            if let Some(slot) = target.iter_mut().find(|existing| existing.id == record.id) {
                *slot = record;
            }
        }
        target.extend(self.materialized);
        ledger.adjust(self.balance_delta);
    }
}

/// Fires every recurring record that came due between `last_activation` and
/// `now`, one calendar day at a time.
///
/// A gap that spans a month boundary only catches up from the first day of
/// `now`'s month; earlier months are the rollover's concern. Days at or before
/// `last_activation` are never processed, which makes a second run with no
/// elapsed time a no-op. A record fires on a day when its due date is strictly
/// before that day's cursor; its next due date is derived from the previous due
/// date, not from the cursor, so a late run does not shift the cadence.
/// Monthly budget incomes never fire here.
pub fn run_catch_up(
    records: &[TransactionRecord],
    last_activation: NaiveDateTime,
    now: NaiveDateTime,
    options: &CatchUpOptions,
) -> CatchUpOutcome {
    let mut working = records.to_vec();
    let mut materialized = Vec::new();
    let mut balance_delta = 0.0;

    let mut cursor = if same_month(last_activation, now) {
        last_activation
    } else {
        start_of_month(now)
    };
    let mut days = 0u32;

    while cursor.date() == now.date() || cursor <= now {
        if days >= options.max_days {
            warn!(
                days,
                cursor = %cursor,
                "catch-up stopped at the day limit before reaching now"
            );
            break;
        }
        days += 1;

        if cursor > last_activation {
            let mut checked: HashSet<String> = HashSet::new();
            for record in working.iter_mut() {
                if record.category.is_monthly_budget() {
                    continue;
                }
                if !checked.insert(options.dedup.token(record)) {
                    continue;
                }
                let Some(due) = record.next_due_date else {
                    continue;
                };
                if due >= cursor {
                    continue;
                }

                record.next_due_date = record.compute_next_due(due);
                balance_delta += record.signed_amount();
                debug!(
                    name = %record.name,
                    kind = %record.kind,
                    amount = record.amount,
                    fired_on = %cursor.date(),
                    next_due = ?record.next_due_date,
                    "recurring record fired"
                );
                materialized.push(record.materialize(cursor));
            }
        }

        cursor += Duration::days(1);
    }

    CatchUpOutcome {
        updated: working,
        materialized,
        balance_delta,
    }
}
