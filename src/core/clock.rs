use chrono::{Local, NaiveDateTime};

/// Environment variable that pins the clock, formatted `%Y-%m-%dT%H:%M:%S`.
pub const NOW_ENV: &str = "MYBUDGET_NOW";

/// Clock abstracts access to the current wall-clock time so activations stay
/// deterministic in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Local wall-clock time of the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Uses the pinned time from [`NOW_ENV`] when it parses, the system clock otherwise.
pub fn clock_from_env() -> Box<dyn Clock> {
    std::env::var(NOW_ENV)
        .ok()
        .and_then(|raw| NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%dT%H:%M:%S").ok())
        .map(|pinned| Box::new(FixedClock(pinned)) as Box<dyn Clock>)
        .unwrap_or_else(|| Box::new(SystemClock))
}
