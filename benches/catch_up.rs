use chrono::{NaiveDate, NaiveDateTime};
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use mybudget_core::{
    engine::{on_activation, run_catch_up, AppState, CatchUpOptions, DedupKey},
    ledger::{BalanceLedger, Category, ExpenseCategory, Recurrence, TransactionRecord},
    storage::{JsonStateStore, StateStore},
};
use tempfile::tempdir;

fn at(month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, month, day)
        .unwrap()
        .and_hms_opt(8, 0, 0)
        .unwrap()
}

fn build_sample_state(record_count: usize) -> AppState {
    let cadences = [
        Recurrence::Daily,
        Recurrence::Weekly,
        Recurrence::Monthly,
        Recurrence::OneTime,
    ];
    let mut state = AppState {
        ledger: BalanceLedger::with_balance(5_000.0),
        ..AppState::default()
    };
    for idx in 0..record_count {
        let category = Category::Expense(ExpenseCategory::ALL[idx % ExpenseCategory::ALL.len()]);
        state.expenses.push(TransactionRecord::new(
            format!("expense-{idx}"),
            category,
            1.0 + (idx % 40) as f64,
            cadences[idx % cadences.len()],
            at(1, 1 + (idx % 28) as u32),
        ));
    }
    state.ledger.last_activation = Some(at(1, 1));
    state
}

fn bench_catch_up(c: &mut Criterion) {
    let state = build_sample_state(black_box(2_000));
    let options = CatchUpOptions {
        dedup: DedupKey::Series,
        ..CatchUpOptions::default()
    };

    c.bench_function("catch_up_30_days_2k", |b| {
        b.iter(|| {
            let outcome = run_catch_up(&state.expenses, at(1, 1), at(1, 31), &options);
            black_box(outcome.fired());
        })
    });

    c.bench_function("rollover_2k", |b| {
        b.iter_batched(
            || state.clone(),
            |mut state| black_box(on_activation(&mut state, at(2, 15), &options)),
            BatchSize::SmallInput,
        )
    });
}

fn bench_state_io(c: &mut Criterion) {
    let state = build_sample_state(black_box(5_000));
    let dir = tempdir().expect("tempdir");
    let store = JsonStateStore::in_dir(dir.path());

    c.bench_function("state_save_5k", |b| {
        b.iter(|| store.save(&state).expect("save state"))
    });

    store.save(&state).expect("seed");

    c.bench_function("state_load_5k", |b| {
        b.iter(|| black_box(store.load().expect("load state")))
    });
}

criterion_group!(benches, bench_catch_up, bench_state_io);
criterion_main!(benches);
