use std::fmt;

use chrono::{Datelike, Days, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Free-form cadence made of whole years, months and days.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CustomInterval {
    pub years: u32,
    pub months: u32,
    pub days: u32,
}

impl CustomInterval {
    pub fn new(years: u32, months: u32, days: u32) -> Self {
        Self {
            years,
            months,
            days,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

/// Cadence attached to a transaction record.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Recurrence {
    #[default]
    OneTime,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom(CustomInterval),
}

impl Recurrence {
    pub fn is_recurring(&self) -> bool {
        !matches!(self, Recurrence::OneTime)
    }

    /// Computes the next date after `reference` on which a record with this
    /// cadence is due. One-time records never recur.
    ///
    /// Custom intervals are applied as days, then months, then years, each step
    /// starting from the result of the previous one so month-end clamping
    /// behaves the same way it does for the fixed cadences. Results outside the
    /// representable calendar yield `None`.
    pub fn next_due_date(&self, reference: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Recurrence::OneTime => None,
            Recurrence::Daily => reference.checked_add_signed(Duration::days(1)),
            Recurrence::Weekly => reference.checked_add_signed(Duration::weeks(1)),
            Recurrence::Monthly => shift_month(reference, 1),
            Recurrence::Yearly => shift_year(reference, 1),
            Recurrence::Custom(interval) => {
                let next = reference.checked_add_days(Days::new(u64::from(interval.days)))?;
                let next = shift_month(next, interval.months)?;
                shift_year(next, interval.years)
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            Recurrence::OneTime => "One-time".into(),
            Recurrence::Daily => "Every day".into(),
            Recurrence::Weekly => "Every week".into(),
            Recurrence::Monthly => "Every month".into(),
            Recurrence::Yearly => "Every year".into(),
            Recurrence::Custom(interval) => format!(
                "Every {} year(s), {} month(s), {} day(s)",
                interval.years, interval.months, interval.days
            ),
        }
    }

    /// Parses a frequency keyword. `custom` needs the interval supplied separately,
    /// so it resolves to a zero interval here and callers fill it in.
    pub fn parse(raw: &str) -> Option<Recurrence> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "one-time" | "onetime" | "once" => Some(Recurrence::OneTime),
            "daily" | "every day" | "day" => Some(Recurrence::Daily),
            "weekly" | "every week" | "week" => Some(Recurrence::Weekly),
            "monthly" | "every month" | "month" => Some(Recurrence::Monthly),
            "yearly" | "every year" | "year" => Some(Recurrence::Yearly),
            "custom" | "other" => Some(Recurrence::Custom(CustomInterval::default())),
            _ => None,
        }
    }
}

impl fmt::Display for Recurrence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// True when both timestamps fall in the same calendar month of the same year.
pub fn same_month(a: NaiveDateTime, b: NaiveDateTime) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

/// Midnight on the first day of the month containing `date`.
pub fn start_of_month(date: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1)
        .and_then(|first| first.and_hms_opt(0, 0, 0))
        .unwrap_or(date)
}

pub(crate) fn shift_month(date: NaiveDateTime, months: u32) -> Option<NaiveDateTime> {
    if months == 0 {
        return Some(date);
    }
    let total = i64::from(date.year()) * 12 + i64::from(date.month0()) + i64::from(months);
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).map(|shifted| shifted.and_time(date.time()))
}

pub(crate) fn shift_year(date: NaiveDateTime, years: u32) -> Option<NaiveDateTime> {
    if years == 0 {
        return Some(date);
    }
    let year = i32::try_from(i64::from(date.year()) + i64::from(years)).ok()?;
    let month = date.month();
    let day = date.day().min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).map(|shifted| shifted.and_time(date.time()))
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year.saturating_add(1), 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .map(|first_next| (first_next - Duration::days(1)).day())
        .unwrap_or(28)
}
