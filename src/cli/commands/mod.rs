use std::collections::HashMap;

use uuid::Uuid;

pub mod budget;
pub mod system;
pub mod transaction;

use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::ledger::{TransactionKind, TransactionRecord};

pub(crate) fn all_definitions() -> Vec<CommandDefinition> {
    let mut commands = Vec::new();
    commands.extend(system::definitions());
    commands.extend(budget::definitions());
    commands.extend(transaction::definitions());
    commands
}

pub type CommandHandler = fn(&mut ShellContext, &[&str]) -> CommandResult;

#[derive(Clone)]
pub struct CommandDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub usage: &'static str,
    pub handler: CommandHandler,
}

impl CommandDefinition {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        usage: &'static str,
        handler: CommandHandler,
    ) -> Self {
        Self {
            name,
            description,
            usage,
            handler,
        }
    }
}

pub struct CommandRegistry {
    commands: HashMap<&'static str, CommandDefinition>,
    order: Vec<&'static str>,
}

impl CommandRegistry {
    pub fn new(definitions: Vec<CommandDefinition>) -> Self {
        let mut commands = HashMap::new();
        let mut order = Vec::new();
        for definition in definitions {
            order.push(definition.name);
            commands.insert(definition.name, definition);
        }
        Self { commands, order }
    }

    pub fn get(&self, name: &str) -> Option<&CommandDefinition> {
        self.commands.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDefinition> {
        self.order
            .iter()
            .filter_map(move |name| self.commands.get(name))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.order.iter().copied()
    }
}

pub(crate) fn parse_kind(raw: Option<&&str>, usage: &str) -> Result<TransactionKind, CommandError> {
    raw.and_then(|value| TransactionKind::parse(value))
        .ok_or_else(|| CommandError::Usage(usage.into()))
}

/// Finds a record by full id or by an unambiguous id prefix.
pub(crate) fn resolve_record(
    records: &[TransactionRecord],
    needle: &str,
) -> Result<Uuid, CommandError> {
    if let Ok(id) = Uuid::parse_str(needle) {
        return Ok(id);
    }
    let needle = needle.to_ascii_lowercase();
    let mut matches = records
        .iter()
        .filter(|record| record.id.to_string().starts_with(&needle));
    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record.id),
        (None, _) => Err(CommandError::Invalid(format!("no entry matches `{}`", needle))),
        (Some(_), Some(_)) => Err(CommandError::Invalid(format!(
            "`{}` matches several entries; type more of the id",
            needle
        ))),
    }
}

/// Short id shown in listings; long enough to be typed back as a prefix.
pub(crate) fn short_id(id: &Uuid) -> String {
    id.to_string().chars().take(8).collect()
}
