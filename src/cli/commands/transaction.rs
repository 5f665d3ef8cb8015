use crate::cli::context::{CommandError, CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::{parse_amount, NewTransaction, SummaryService, TransactionService};
use crate::ledger::{Category, CustomInterval, Recurrence, TransactionKind};

use super::{parse_kind, resolve_record, short_id, CommandDefinition};

const ADD_EXPENSE_USAGE: &str = concat!(
    "add-expense <name> <amount> [category] [once|daily|weekly|monthly|yearly|custom <y> <m> <d>]",
    "\n         custom takes years 0-20, months 0-11, days 0-30; `custom 0 0 0` is due every day"
);
const ADD_INCOME_USAGE: &str = concat!(
    "add-income <name> <amount> [category] [once|daily|weekly|monthly|yearly|custom <y> <m> <d>]",
    "\n         custom takes years 0-20, months 0-11, days 0-30; `custom 0 0 0` is due every day"
);
const HISTORY_USAGE: &str = "history <expenses|incomes>";
const DELETE_USAGE: &str = "delete <expense|income> <id>";
const CLEAR_USAGE: &str = "clear <expenses|incomes>";
const ARCHIVE_USAGE: &str = "archive <expense|income> <id>";
const UNARCHIVE_USAGE: &str = "unarchive <expense|income> <id>";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new("add-expense", "Record an expense", ADD_EXPENSE_USAGE, cmd_add_expense),
        CommandDefinition::new("add-income", "Record an income", ADD_INCOME_USAGE, cmd_add_income),
        CommandDefinition::new(
            "history",
            "List this month's expenses or incomes, newest first",
            HISTORY_USAGE,
            cmd_history,
        ),
        CommandDefinition::new("delete", "Delete one entry", DELETE_USAGE, cmd_delete),
        CommandDefinition::new(
            "clear",
            "Delete every visible expense or income",
            CLEAR_USAGE,
            cmd_clear,
        ),
        CommandDefinition::new("archive", "Hide an entry from totals", ARCHIVE_USAGE, cmd_archive),
        CommandDefinition::new(
            "unarchive",
            "Show an archived entry again",
            UNARCHIVE_USAGE,
            cmd_unarchive,
        ),
    ]
}

fn cmd_add_expense(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    add(context, TransactionKind::Expense, args, ADD_EXPENSE_USAGE)
}

fn cmd_add_income(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    add(context, TransactionKind::Income, args, ADD_INCOME_USAGE)
}

fn add(context: &mut ShellContext, kind: TransactionKind, args: &[&str], usage: &str) -> CommandResult {
    let (name, amount) = match args {
        [name, amount, ..] => (*name, parse_amount(amount)?),
        _ => return Err(CommandError::Usage(usage.into())),
    };

    let category = match args.get(2) {
        Some(raw) => Category::parse(kind, raw)
            .ok_or_else(|| CommandError::Invalid(format!("unknown {} category `{}`", kind, raw)))?,
        None => Category::default_for(kind),
    };

    let recurrence = match args.get(3) {
        Some(raw) => parse_recurrence(raw, &args[4..], usage)?,
        None => Recurrence::OneTime,
    };

    let now = context.now();
    let record = TransactionService::create(
        &mut context.state,
        NewTransaction::new(name, category, amount, recurrence),
        now,
    )?;
    context.persist()?;

    output::success(format!(
        "Added {} `{}` ({}, {}) [{}]",
        kind,
        record.name,
        context.config.format_amount(record.amount),
        record.recurrence,
        short_id(&record.id)
    ));
    Ok(())
}

fn parse_recurrence(raw: &str, rest: &[&str], usage: &str) -> Result<Recurrence, CommandError> {
    let recurrence = Recurrence::parse(raw)
        .ok_or_else(|| CommandError::Invalid(format!("unknown frequency `{}`", raw)))?;
    if !matches!(recurrence, Recurrence::Custom(_)) {
        return Ok(recurrence);
    }

    let parts = match rest {
        [years, months, days] => [years, months, days].map(|part| part.parse::<u32>()),
        _ => return Err(CommandError::Usage(usage.into())),
    };
    match parts {
        // `custom 0 0 0` is accepted and comes due every day.
        [Ok(years), Ok(months), Ok(days)] => {
            Ok(Recurrence::Custom(CustomInterval::new(years, months, days)))
        }
        _ => Err(CommandError::Invalid(
            "custom frequency parts must be whole numbers".into(),
        )),
    }
}

fn cmd_history(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args.first(), HISTORY_USAGE)?;
    let records = SummaryService::history(&context.state, kind);

    output::section(match kind {
        TransactionKind::Expense => "Expenses",
        TransactionKind::Income => "Incomes",
    });
    if records.is_empty() {
        output::info("No entries.");
        return Ok(());
    }
    for record in records {
        output::line(format!(
            "  {}  {}  {:<20} {:>12}  {:<10} {}",
            short_id(&record.id),
            record.created_at.format("%Y-%m-%d"),
            record.name,
            context.config.format_amount(record.amount),
            record.category.name(),
            record.recurrence
        ));
    }
    Ok(())
}

fn cmd_delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args.first(), DELETE_USAGE)?;
    let needle = args.get(1).ok_or_else(|| CommandError::Usage(DELETE_USAGE.into()))?;
    let id = resolve_record(context.state.records(kind), needle)?;

    let removed = TransactionService::delete(&mut context.state, kind, id)?;
    context.persist()?;
    output::success(format!("Deleted {} `{}`", kind, removed.name));
    Ok(())
}

fn cmd_clear(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let kind = parse_kind(args.first(), CLEAR_USAGE)?;
    if !context.confirm(&format!("Delete every {} entry?", kind))? {
        output::info("Nothing deleted.");
        return Ok(());
    }

    let removed = TransactionService::delete_all(&mut context.state, kind);
    context.persist()?;
    output::success(format!("Deleted {} {} entr{}", removed, kind, if removed == 1 { "y" } else { "ies" }));
    Ok(())
}

fn cmd_archive(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_archived(context, args, true, ARCHIVE_USAGE)
}

fn cmd_unarchive(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    set_archived(context, args, false, UNARCHIVE_USAGE)
}

fn set_archived(context: &mut ShellContext, args: &[&str], archived: bool, usage: &str) -> CommandResult {
    let kind = parse_kind(args.first(), usage)?;
    let needle = args.get(1).ok_or_else(|| CommandError::Usage(usage.into()))?;
    let id = resolve_record(context.state.records(kind), needle)?;

    TransactionService::set_archived(&mut context.state, kind, id, archived)?;
    context.persist()?;
    output::success(if archived { "Entry archived" } else { "Entry restored" });
    Ok(())
}
