//! Recurrence predicate: is a habit due on a given calendar date?
//!
//! All variants are evaluated against whole dates; the creation timestamp is
//! truncated to its date before any arithmetic. The predicate is total and
//! fails open: malformed descriptors (zero interval, empty weekday set, empty
//! pattern) and dates before the habit existed all answer "active" rather
//! than erroring, so a corrupt document degrades to a daily habit instead of
//! a dead one.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// How a habit repeats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recurrence {
    /// Due every day
    Daily,
    /// Due on fixed weekdays; 0 = Sunday through 6 = Saturday
    Weekdays { days: Vec<u8> },
    /// Due every `interval` days counted from the creation date
    EveryNDays { interval: u32 },
    /// ASCII cycle of '0'/'1' applied from the creation date; only '1'
    /// marks an active day
    Pattern { bits: String },
}

impl Default for Recurrence {
    fn default() -> Self {
        Recurrence::Daily
    }
}

/// Whether `recurrence` makes a habit created at `created_at` due on `target`.
pub fn is_active_on(recurrence: &Recurrence, created_at: DateTime<Utc>, target: NaiveDate) -> bool {
    let created = created_at.date_naive();
    if target < created {
        // before the habit existed there is nothing to anchor the cycle to
        return true;
    }

    match recurrence {
        Recurrence::Daily => true,
        Recurrence::Weekdays { days } => {
            if days.is_empty() {
                return true;
            }
            let weekday = target.weekday().num_days_from_sunday() as u8;
            days.contains(&weekday)
        }
        Recurrence::EveryNDays { interval } => {
            if *interval == 0 {
                return true;
            }
            let elapsed = (target - created).num_days() as u64;
            elapsed % u64::from(*interval) == 0
        }
        Recurrence::Pattern { bits } => {
            if bits.is_empty() {
                return true;
            }
            let elapsed = (target - created).num_days() as usize;
            bits.as_bytes()[elapsed % bits.len()] == b'1'
        }
    }
}
