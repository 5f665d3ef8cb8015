use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "activate",
            "Run the month rollover and recurring catch-up now",
            "activate",
            cmd_activate,
        ),
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
        CommandDefinition::new("quit", "Exit the shell", "quit", cmd_exit),
    ]
}

fn cmd_activate(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let report = context.reactivate()?;
    context.announce(&report);
    if report.fired_expenses + report.fired_incomes == 0 && !report.rolled_over {
        output::info("Nothing was due.");
    }
    Ok(())
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        match context.registry().get(&name) {
            Some(definition) => {
                output::section(definition.name);
                output::line(format!("  {}", definition.description));
                output::line(format!("  usage: {}", definition.usage));
            }
            None => {
                let hint = context
                    .suggestion_for(&name)
                    .map(|best| format!(" Suggestion: `{}`?", best))
                    .unwrap_or_default();
                return Err(CommandError::Invalid(format!(
                    "no help for `{}`.{}",
                    name, hint
                )));
            }
        }
        return Ok(());
    }

    output::section("Commands");
    for definition in context.registry().iter() {
        output::line(format!("  {:<12} {}", definition.name, definition.description));
    }
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
