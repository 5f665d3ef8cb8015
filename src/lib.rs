#![doc(test(attr(deny(warnings))))]

//! MyBudget core: recurring income/expense scheduling, monthly budget
//! rollover and the running balance behind a personal budget app.
//!
//! A UI collaborator loads an [`engine::AppState`], calls
//! [`engine::on_activation`] each time the app comes to the foreground, and
//! reads balance and aggregates back through [`core::services`].

pub mod cli;
pub mod config;
pub mod core;
pub mod engine;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("MyBudget core tracing initialized.");
    });
}

#[cfg(test)]
mod tests {
    #[test]
    fn init_does_not_panic() {
        super::init();
    }
}
