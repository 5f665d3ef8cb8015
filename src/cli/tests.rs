use chrono::{NaiveDate, NaiveDateTime};

use super::context::{CliMode, CommandError, LoopControl, ShellContext};
use super::shell::handle_line;
use crate::config::Config;
use crate::core::clock::FixedClock;
use crate::ledger::{CustomInterval, Recurrence};
use crate::storage::MemoryStateStore;

fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .unwrap()
        .and_hms_opt(9, 30, 0)
        .unwrap()
}

fn context() -> ShellContext {
    ShellContext::with_parts(
        CliMode::Script,
        Config::default(),
        Box::new(MemoryStateStore::new()),
        Box::new(FixedClock(at(6))),
    )
    .unwrap()
}

fn run(context: &mut ShellContext, line: &str) -> Result<LoopControl, CommandError> {
    handle_line(context, line)
}

#[test]
fn budget_then_expense_updates_balance() {
    let mut ctx = context();
    run(&mut ctx, "budget 1500").unwrap();
    run(&mut ctx, "add-expense \"Weekly shop\" 82,40 Food weekly").unwrap();

    assert!((ctx.state.balance() - 1417.6).abs() < 1e-9);
    assert_eq!(ctx.state.expenses.len(), 1);
    assert_eq!(ctx.state.expenses[0].name, "Weekly shop");
    assert_eq!(ctx.state.expenses[0].recurrence, Recurrence::Weekly);
    assert_eq!(ctx.state.incomes[0].name, "Budget for May");
}

#[test]
fn custom_frequency_takes_three_parts() {
    let mut ctx = context();
    run(&mut ctx, "add-income Rent 300 Other custom 0 2 15").unwrap();
    assert_eq!(
        ctx.state.incomes[0].recurrence,
        Recurrence::Custom(CustomInterval::new(0, 2, 15))
    );

    run(&mut ctx, "add-expense Snacks 2 Food custom 0 0 0").unwrap();
    assert_eq!(
        ctx.state.expenses[0].recurrence,
        Recurrence::Custom(CustomInterval::default())
    );
    assert_eq!(ctx.state.expenses[0].next_due_date, Some(at(6)));

    let err = run(&mut ctx, "add-income Rent 300 Other custom 0 12 0").unwrap_err();
    assert!(matches!(err, CommandError::Service(_)));
    let err = run(&mut ctx, "add-expense Rent 300 Bills custom 0 0 4000000000").unwrap_err();
    assert!(matches!(err, CommandError::Service(_)));
    let err = run(&mut ctx, "add-income Rent 300 Other custom 1").unwrap_err();
    assert!(matches!(err, CommandError::Usage(_)));
}

#[test]
fn bad_input_is_reported_not_applied() {
    let mut ctx = context();
    assert!(run(&mut ctx, "add-expense Lunch").is_err());
    assert!(run(&mut ctx, "add-expense Lunch abc").is_err());
    assert!(run(&mut ctx, "add-expense Lunch 10 Snacks").is_err());
    assert!(ctx.state.expenses.is_empty());
    assert_eq!(ctx.state.balance(), 0.0);
}

#[test]
fn delete_by_id_prefix_restores_balance() {
    let mut ctx = context();
    run(&mut ctx, "budget 200").unwrap();
    run(&mut ctx, "add-expense Taxi 25 Travel").unwrap();
    let prefix: String = ctx.state.expenses[0].id.to_string().chars().take(6).collect();

    run(&mut ctx, &format!("delete expense {prefix}")).unwrap();

    assert!(ctx.state.expenses.is_empty());
    assert_eq!(ctx.state.balance(), 200.0);
}

#[test]
fn clear_and_archive() {
    let mut ctx = context();
    run(&mut ctx, "budget 500").unwrap();
    run(&mut ctx, "add-expense Coffee 3").unwrap();
    run(&mut ctx, "add-expense Books 40 Personal").unwrap();
    let books = ctx.state.expenses[1].id.to_string();
    run(&mut ctx, &format!("archive expense {books}")).unwrap();

    run(&mut ctx, "clear expenses").unwrap();

    assert_eq!(ctx.state.expenses.len(), 1);
    assert!(ctx.state.expenses[0].is_archived);
    assert_eq!(ctx.state.balance(), 460.0);
}

#[test]
fn unknown_command_keeps_shell_running() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "balanse").unwrap(), LoopControl::Continue);
    assert_eq!(ctx.suggestion_for("balanse"), Some("balance"));
    assert_eq!(ctx.suggestion_for("zzzzzzzzzz"), None);
    assert_eq!(run(&mut ctx, "").unwrap(), LoopControl::Continue);
}

#[test]
fn exit_and_quit_stop_the_loop() {
    let mut ctx = context();
    assert_eq!(run(&mut ctx, "quit").unwrap(), LoopControl::Exit);
    assert!(!ctx.running);
}
