//! Working-day calendar arithmetic.
//!
//! A [`WorkWeek`] is a non-empty set of weekdays indexed Sunday = 0 ..
//! Saturday = 6. Because the empty set cannot be constructed, advancing a
//! date by N working days always terminates.

use std::fmt;

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::{Result, TaktError};

const WEEKDAY_NAMES: [&str; 7] = [
    "sunday",
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
];

/// Set of working weekdays.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkWeek {
    /// Bit `i` set means weekday `i` (Sunday = 0) is a working day.
    mask: u8,
}

impl Default for WorkWeek {
    /// Monday to Friday.
    fn default() -> Self {
        Self { mask: 0b0011_1110 }
    }
}

impl fmt::Debug for WorkWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

impl WorkWeek {
    /// Build from weekday indices (Sunday = 0).
    pub fn from_indices<I>(indices: I) -> Result<Self>
    where
        I: IntoIterator<Item = u8>,
    {
        let mut mask = 0u8;
        for idx in indices {
            if idx > 6 {
                return Err(TaktError::Config(format!(
                    "weekday index {idx} out of range 0..=6"
                )));
            }
            mask |= 1 << idx;
        }
        if mask == 0 {
            return Err(TaktError::EmptyWorkWeek);
        }
        Ok(Self { mask })
    }

    /// Build from weekday names. Accepts full names and three-letter
    /// abbreviations, case-insensitive.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self> {
        let indices = names
            .iter()
            .map(|name| parse_weekday(name.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Self::from_indices(indices)
    }

    #[must_use]
    pub fn contains(&self, weekday: Weekday) -> bool {
        self.mask & (1 << weekday.num_days_from_sunday()) != 0
    }

    #[must_use]
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.contains(date.weekday())
    }

    /// Number of working days per week (1..=7).
    #[must_use]
    pub const fn days_per_week(&self) -> u32 {
        self.mask.count_ones()
    }

    /// Lowercase names of the working days, Sunday first.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        WEEKDAY_NAMES
            .iter()
            .enumerate()
            .filter(|(idx, _)| self.mask & (1 << idx) != 0)
            .map(|(_, name)| *name)
            .collect()
    }

    /// Advance `date` by `days` working days.
    ///
    /// Steps one calendar day at a time and counts only working days, so the
    /// result is always a working day when `days > 0`. `days <= 0` returns
    /// `date` unchanged. Saturates at [`NaiveDate::MAX`].
    #[must_use]
    pub fn add_working_days(&self, date: NaiveDate, days: i64) -> NaiveDate {
        self.checked_add_working_days(date, days).unwrap_or(NaiveDate::MAX)
    }

    /// Like [`WorkWeek::add_working_days`], but `None` when the result
    /// falls outside the representable date range.
    #[must_use]
    pub fn checked_add_working_days(&self, date: NaiveDate, days: i64) -> Option<NaiveDate> {
        if days <= 0 {
            return Some(date);
        }
        let per_week = i64::from(self.days_per_week());
        let mut remaining = days;
        let mut current = date;

        // Any 7 consecutive days contain exactly `per_week` working days.
        let weeks = (remaining - 1) / per_week;
        if weeks > 0 {
            let span = weeks.unsigned_abs().checked_mul(7)?;
            current = current.checked_add_days(Days::new(span))?;
            remaining -= weeks * per_week;
        }

        while remaining > 0 {
            current = current.checked_add_days(Days::new(1))?;
            if self.is_working_day(current) {
                remaining -= 1;
            }
        }
        Some(current)
    }

    /// Number of working days in `(from, to]`; negative when `to < from`.
    #[must_use]
    pub fn working_days_between(&self, from: NaiveDate, to: NaiveDate) -> i64 {
        if to < from {
            return -self.working_days_between(to, from);
        }
        let span = (to - from).num_days();
        let full_weeks = span / 7;
        let mut count = full_weeks * i64::from(self.days_per_week());
        let mut current = from + Days::new(full_weeks.unsigned_abs() * 7);
        while current < to {
            current = current + Days::new(1);
            if self.is_working_day(current) {
                count += 1;
            }
        }
        count
    }
}

fn parse_weekday(name: &str) -> Result<u8> {
    let lower = name.trim().to_ascii_lowercase();
    WEEKDAY_NAMES
        .iter()
        .position(|full| *full == lower || (lower.len() == 3 && full.starts_with(&lower)))
        .and_then(|idx| u8::try_from(idx).ok())
        .ok_or_else(|| TaktError::Config(format!("unknown weekday name: {name}")))
}
