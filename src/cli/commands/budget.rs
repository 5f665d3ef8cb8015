use crate::cli::context::{CommandResult, ShellContext};
use crate::cli::output;
use crate::core::services::{BudgetService, SummaryService};

use super::CommandDefinition;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "balance",
            "Show the current balance and next month's budget",
            "balance",
            cmd_balance,
        ),
        CommandDefinition::new(
            "budget",
            "Show or set the monthly budget",
            "budget [amount]",
            cmd_budget,
        ),
        CommandDefinition::new(
            "summary",
            "Totals per category for this month",
            "summary",
            cmd_summary,
        ),
    ]
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let balance = context.state.balance();
    let text = context.config.format_amount(balance);
    output::line(format!(
        "Balance: {}",
        output::signed_amount(text, context.state.ledger.is_overdrawn())
    ));
    match BudgetService::pending_budget(&context.state) {
        Some(amount) => output::line(format!(
            "Next month's budget: {}",
            context.config.format_amount(amount)
        )),
        None => output::line("Next month's budget: not set"),
    }
    Ok(())
}

fn cmd_budget(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let Some(raw) = args.first() else {
        return cmd_balance(context, args);
    };
    let first_time = !context.state.ledger.has_completed_first_launch;
    let now = context.now();
    BudgetService::set_monthly_budget_from_text(&mut context.state, raw, now)?;
    context.persist()?;

    let amount = context
        .config
        .format_amount(context.state.ledger.pending_next_month_budget.unwrap_or_default());
    if first_time {
        output::success(format!("Budget set. Balance is now {}", amount));
    } else {
        output::success(format!("Budget of {} will apply from next month", amount));
    }
    Ok(())
}

fn cmd_summary(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let overview = SummaryService::overview(&context.state);
    let config = &context.config;

    output::section("Incomes");
    for (category, total) in &overview.income_by_category {
        output::line(format!("  {:<16} {}", category.name(), config.format_amount(*total)));
    }
    output::line(format!("  {:<16} {}", "Total", config.format_amount(overview.total_income)));

    output::section("Expenses");
    for (category, total) in &overview.expense_by_category {
        output::line(format!("  {:<16} {}", category.name(), config.format_amount(*total)));
    }
    output::line(format!("  {:<16} {}", "Total", config.format_amount(overview.total_expense)));

    output::line(format!(
        "\nBalance: {}",
        output::signed_amount(config.format_amount(overview.balance), overview.balance < 0.0)
    ));
    Ok(())
}
