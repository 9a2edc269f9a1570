//! End-of-day settlement.
//!
//! Settlement closes out one virtual day across all habits. It never runs on
//! a timer of its own: the caller polls `Journal::tick` with an explicit
//! `now` (on launch, on foregrounding, from the CLI) and the same-day guard
//! makes redundant polls free.
//!
//! Per-habit outcomes for the day being closed:
//!
//! ```text
//! prior status   due that day?   outcome
//! ────────────   ─────────────   ─────────────────────────────────────────
//! (archived)     -               returned untouched, no resets
//! Completed      -               history stamped, back to Pending
//! Failed         -               back to Pending (penalty already paid)
//! Pending        yes, partial    rest day: spared, no cost
//! Pending        yes, shield     one pooled shield consumed, streak kept
//! Pending        yes, exposed    streak falls down the ladder, stats -1
//! Pending        no              per-day reset only
//! ```
//!
//! The pass is a left fold over the habit list with an explicit ledger
//! accumulator; shields are consumed in habit order and stat penalties are
//! summed, then the caller applies the final ledger to the profile once.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};

use crate::events::Event;
use crate::habit::{fallback_on_break, Habit, HabitStatus};
use crate::profile::StatKind;

/// Calendar date `t` belongs to once the day boundary is shifted to
/// `day_start_hour` o'clock. With the default of 4, finishing a habit at
/// 02:30 still counts toward the previous day.
pub fn virtual_day(t: DateTime<Utc>, day_start_hour: u8) -> NaiveDate {
    (t - Duration::hours(i64::from(day_start_hour))).date_naive()
}

/// Everything one settlement pass decided.
#[derive(Debug, Clone)]
pub struct SettlementOutcome {
    /// The virtual day that was closed
    pub settled_date: NaiveDate,
    /// Habits after settlement, in input order
    pub habits: Vec<Habit>,
    /// Pooled shields remaining after consumption
    pub shields: u32,
    /// Accumulated miss penalties per stat
    pub stat_penalties: BTreeMap<StatKind, u32>,
    /// Notifications raised, in habit order, ending with `DaySettled`
    pub events: Vec<Event>,
}

/// Fold accumulator threaded through the pass.
struct Ledger {
    habits: Vec<Habit>,
    shields: u32,
    stat_penalties: BTreeMap<StatKind, u32>,
    events: Vec<Event>,
    missed: u32,
}

/// Close out the virtual day `last_settled_at` belongs to.
///
/// Returns `None` while `now` is still inside that day; calling again after
/// the caller advanced its watermark to `now` is therefore a no-op, which is
/// what makes redundant triggers safe. The input `habits` slice is not
/// modified; the outcome carries the settled copies.
pub fn settle(
    now: DateTime<Utc>,
    last_settled_at: DateTime<Utc>,
    habits: &[Habit],
    shields: u32,
    day_start_hour: u8,
) -> Option<SettlementOutcome> {
    let settled_date = virtual_day(last_settled_at, day_start_hour);
    if virtual_day(now, day_start_hour) <= settled_date {
        // same virtual day (or a clock that ran backwards): nothing to close
        return None;
    }

    let init = Ledger {
        habits: Vec::with_capacity(habits.len()),
        shields,
        stat_penalties: BTreeMap::new(),
        events: Vec::new(),
        missed: 0,
    };
    let ledger = habits
        .iter()
        .fold(init, |acc, habit| settle_one(acc, habit, settled_date, now));

    let shields_spent = shields - ledger.shields;
    let mut events = ledger.events;
    events.push(Event::DaySettled {
        date: settled_date,
        missed: ledger.missed,
        shields_spent,
        at: now,
    });

    Some(SettlementOutcome {
        settled_date,
        habits: ledger.habits,
        shields: ledger.shields,
        stat_penalties: ledger.stat_penalties,
        events,
    })
}

fn settle_one(mut acc: Ledger, habit: &Habit, settled_date: NaiveDate, now: DateTime<Utc>) -> Ledger {
    // archived habits are frozen, not even per-day state is touched
    if habit.is_archived {
        acc.habits.push(habit.clone());
        return acc;
    }

    let mut h = habit.clone();
    let had_partial = h.daily_progress > 0;

    // universal per-day reset, regardless of how the day went
    for reminder in &mut h.reminders {
        reminder.sent = false;
    }
    for subtask in &mut h.subtasks {
        subtask.done = false;
    }
    h.daily_progress = 0;

    match h.status {
        HabitStatus::Completed => {
            // streak already advanced at completion time
            if !h.history.contains(&settled_date) {
                h.history.push(settled_date);
            }
            h.status = HabitStatus::Pending;
            h.shield_used = false;
        }
        HabitStatus::Failed => {
            // fallback and any penalty already applied at failure time
            h.status = HabitStatus::Pending;
            h.shield_used = false;
        }
        HabitStatus::Pending if h.is_due_on(settled_date) => {
            if had_partial {
                // partial credit: the day is forgiven outright
                h.shield_used = false;
                acc.events.push(Event::RestDayGranted {
                    habit_id: h.id.clone(),
                    title: h.title.clone(),
                    progress: habit.daily_progress,
                    target: h.daily_target.max(1),
                    at: now,
                });
            } else if acc.shields > 0 {
                acc.shields -= 1;
                h.shield_used = true;
                acc.events.push(Event::ShieldConsumed {
                    habit_id: h.id.clone(),
                    title: h.title.clone(),
                    shields_remaining: acc.shields,
                    at: now,
                });
            } else {
                let streak_before = h.streak;
                h.streak = fallback_on_break(streak_before);
                h.shield_used = false;

                let mut hits: Vec<StatKind> = Vec::new();
                for &stat in &h.stats {
                    *acc.stat_penalties.entry(stat).or_insert(0) += 1;
                    hits.push(stat);
                }
                // Discipline always takes the hit, on top of any tag
                *acc.stat_penalties.entry(StatKind::Discipline).or_insert(0) += 1;
                hits.push(StatKind::Discipline);

                acc.missed += 1;
                acc.events.push(Event::HabitMissed {
                    habit_id: h.id.clone(),
                    title: h.title.clone(),
                    streak_before,
                    streak_after: h.streak,
                    stats: hits,
                    at: now,
                });
            }
        }
        HabitStatus::Pending => {
            // not due: the reset above is all that happens
            h.shield_used = false;
        }
    }

    acc.habits.push(h);
    acc
}
