//! Recurring-transaction catch-up and monthly rollover.
//!
//! The engine is a pure function of an [`AppState`] and a timestamp; loading and
//! saving happen through a [`StateStore`] at the edges, see [`Engine::activate`].

pub mod catch_up;
pub mod rollover;
pub mod state;

use chrono::NaiveDateTime;
use tracing::info;

pub use catch_up::{run_catch_up, CatchUpOptions, CatchUpOutcome, DedupKey};
pub use rollover::{budget_record, on_activation, ActivationReport};
pub use state::AppState;

use crate::{errors::Result, storage::StateStore};

/// Couples the activation logic with a persistence backend.
pub struct Engine {
    store: Box<dyn StateStore>,
    options: CatchUpOptions,
}

impl Engine {
    pub fn new(store: Box<dyn StateStore>, options: CatchUpOptions) -> Self {
        Self { store, options }
    }

    pub fn options(&self) -> &CatchUpOptions {
        &self.options
    }

    pub fn load(&self) -> Result<AppState> {
        self.store.load()
    }

    pub fn save(&self, state: &AppState) -> Result<()> {
        self.store.save(state)
    }

    /// Loads the persisted state, runs rollover and catch-up for `now`, and
    /// saves the result before handing it back.
    pub fn activate(&self, now: NaiveDateTime) -> Result<(AppState, ActivationReport)> {
        let mut state = self.store.load()?;
        let report = on_activation(&mut state, now, &self.options);
        self.store.save(&state)?;
        info!(balance = report.balance, "state persisted after activation");
        Ok((state, report))
    }
}
