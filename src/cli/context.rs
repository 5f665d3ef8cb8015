use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use rustyline::error::ReadlineError;
use strsim::levenshtein;
use thiserror::Error;

use crate::{
    config::{Config, ConfigManager},
    core::{
        clock::{clock_from_env, Clock},
        services::ServiceError,
    },
    engine::{ActivationReport, AppState, Engine},
    errors::BudgetError,
    storage::{JsonStateStore, StateStore},
    utils::paths,
};

use super::{
    commands::{self, CommandRegistry},
    output,
};

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error("Input error: {0}")]
    Readline(#[from] ReadlineError),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Prompt error: {0}")]
    Dialog(#[from] dialoguer::Error),
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("usage: {0}")]
    Usage(String),
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error(transparent)]
    Budget(#[from] BudgetError),
    #[error(transparent)]
    Dialog(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

/// State shared by every command for the lifetime of the shell.
pub struct ShellContext {
    pub mode: CliMode,
    pub config: Config,
    pub state: AppState,
    pub running: bool,
    pub last_command: Option<String>,
    engine: Engine,
    clock: Box<dyn Clock>,
    registry: CommandRegistry,
}

impl ShellContext {
    /// Opens the default data directory and runs the activation pass.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config = ConfigManager::new()?.load()?;
        let store = JsonStateStore::in_dir(&paths::app_data_dir());
        Self::with_parts(mode, config, Box::new(store), clock_from_env())
    }

    pub fn with_parts(
        mode: CliMode,
        config: Config,
        store: Box<dyn StateStore>,
        clock: Box<dyn Clock>,
    ) -> Result<Self, CliError> {
        let engine = Engine::new(store, config.catch_up_options());
        let (state, report) = engine.activate(clock.now())?;
        let context = Self {
            mode,
            config,
            state,
            running: true,
            last_command: None,
            engine,
            clock,
            registry: CommandRegistry::new(commands::all_definitions()),
        };
        context.announce(&report);
        Ok(context)
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn now(&self) -> chrono::NaiveDateTime {
        self.clock.now()
    }

    pub fn prompt(&self) -> String {
        format!("mybudget [{}]> ", self.config.format_amount(self.state.balance()))
    }

    /// Re-runs rollover and catch-up against the persisted state.
    pub fn reactivate(&mut self) -> Result<ActivationReport, CommandError> {
        self.engine.save(&self.state)?;
        let (state, report) = self.engine.activate(self.clock.now())?;
        self.state = state;
        Ok(report)
    }

    pub fn persist(&self) -> Result<(), CommandError> {
        self.engine.save(&self.state)?;
        Ok(())
    }

    pub fn announce(&self, report: &ActivationReport) {
        if let Some(budget) = report.budget_applied {
            output::success(format!(
                "New month: balance reset to {}",
                self.config.format_amount(budget)
            ));
        } else if report.rolled_over {
            output::info("New month started; no budget was scheduled.");
        }
        let fired = report.fired_expenses + report.fired_incomes;
        if fired > 0 {
            output::info(format!(
                "Applied {} recurring entr{} ({}).",
                fired,
                if fired == 1 { "y" } else { "ies" },
                self.config.format_amount(report.balance_delta)
            ));
        }
        if report.needs_initial_budget {
            output::warning("No monthly budget yet. Set one with `budget <amount>`.");
        }
    }

    pub fn confirm(&self, question: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt(question)
            .default(false)
            .interact()?)
    }

    pub fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Exit MyBudget?")
            .default(true)
            .interact()?)
    }

    pub fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self.registry.get(command).map(|definition| definition.handler);
        match handler {
            Some(handler) => match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            },
            None => {
                self.suggest_command(raw);
                Ok(LoopControl::Continue)
            }
        }
    }

    /// Closest known command name, if any is within a small edit distance.
    pub fn suggestion_for(&self, input: &str) -> Option<&'static str> {
        let needle = input.to_ascii_lowercase();
        self.registry
            .names()
            .map(|name| (levenshtein(name, &needle), name))
            .min_by_key(|(distance, _)| *distance)
            .filter(|(distance, _)| *distance <= 3)
            .map(|(_, name)| name)
    }

    fn suggest_command(&self, input: &str) {
        output::warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.suggestion_for(input) {
            output::info(format!("Suggestion: `{}`?", best));
        }
    }

    pub fn report_error(&self, err: CommandError) -> Result<(), CliError> {
        output::error(err);
        Ok(())
    }
}
