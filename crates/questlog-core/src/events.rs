use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::StatKind;

/// Every gameplay outcome produces an Event.
/// The CLI prints them and appends them to the event log; a missed habit is
/// a gameplay event like any other, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    HabitCompleted {
        habit_id: String,
        title: String,
        streak: u32,
        xp: u64,
        gold: u64,
        at: DateTime<Utc>,
    },
    /// A repetition was logged but the daily target is not met yet.
    HabitProgress {
        habit_id: String,
        title: String,
        progress: u32,
        target: u32,
        at: DateTime<Utc>,
    },
    /// Explicitly abandoned by the user; the ladder fallback already ran.
    HabitFailed {
        habit_id: String,
        title: String,
        streak_before: u32,
        streak_after: u32,
        at: DateTime<Utc>,
    },
    /// Lifetime repetition cap reached.
    HabitArchived {
        habit_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    /// Settlement found the habit due, untouched and unprotected.
    HabitMissed {
        habit_id: String,
        title: String,
        streak_before: u32,
        streak_after: u32,
        stats: Vec<StatKind>,
        at: DateTime<Utc>,
    },
    /// A pooled shield absorbed a miss.
    ShieldConsumed {
        habit_id: String,
        title: String,
        shields_remaining: u32,
        at: DateTime<Utc>,
    },
    /// Partial progress spared the habit at settlement.
    RestDayGranted {
        habit_id: String,
        title: String,
        progress: u32,
        target: u32,
        at: DateTime<Utc>,
    },
    MissionCompleted {
        mission_id: String,
        title: String,
        xp: u64,
        gold: u64,
        at: DateTime<Utc>,
    },
    RaidStepCompleted {
        raid_id: String,
        step_id: String,
        title: String,
        at: DateTime<Utc>,
    },
    RaidCompleted {
        raid_id: String,
        title: String,
        xp: u64,
        gold: u64,
        at: DateTime<Utc>,
    },
    /// One virtual day was closed out.
    DaySettled {
        date: NaiveDate,
        missed: u32,
        shields_spent: u32,
        at: DateTime<Utc>,
    },
    ShieldPurchased {
        shields: u32,
        gold_remaining: u64,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Stable discriminant used as the event log's kind column.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::HabitCompleted { .. } => "habit_completed",
            Event::HabitProgress { .. } => "habit_progress",
            Event::HabitFailed { .. } => "habit_failed",
            Event::HabitArchived { .. } => "habit_archived",
            Event::HabitMissed { .. } => "habit_missed",
            Event::ShieldConsumed { .. } => "shield_consumed",
            Event::RestDayGranted { .. } => "rest_day_granted",
            Event::MissionCompleted { .. } => "mission_completed",
            Event::RaidStepCompleted { .. } => "raid_step_completed",
            Event::RaidCompleted { .. } => "raid_completed",
            Event::DaySettled { .. } => "day_settled",
            Event::ShieldPurchased { .. } => "shield_purchased",
        }
    }

    /// Timestamp the event was raised at.
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::HabitCompleted { at, .. }
            | Event::HabitProgress { at, .. }
            | Event::HabitFailed { at, .. }
            | Event::HabitArchived { at, .. }
            | Event::HabitMissed { at, .. }
            | Event::ShieldConsumed { at, .. }
            | Event::RestDayGranted { at, .. }
            | Event::MissionCompleted { at, .. }
            | Event::RaidStepCompleted { at, .. }
            | Event::RaidCompleted { at, .. }
            | Event::DaySettled { at, .. }
            | Event::ShieldPurchased { at, .. } => *at,
        }
    }

    /// Human-readable notification line.
    pub fn message(&self) -> String {
        match self {
            Event::HabitCompleted {
                title,
                streak,
                xp,
                gold,
                ..
            } => format!("Completed {title} (streak {streak}, +{xp} XP, +{gold} gold)"),
            Event::HabitProgress {
                title,
                progress,
                target,
                ..
            } => format!("Progress on {title}: {progress}/{target}"),
            Event::HabitFailed {
                title,
                streak_before,
                streak_after,
                ..
            } => format!("Failed {title}: streak {streak_before} -> {streak_after}"),
            Event::HabitArchived { title, .. } => format!("Archived {title}: goal reached"),
            Event::HabitMissed {
                title,
                streak_before,
                streak_after,
                stats,
                ..
            } => {
                let hits = stats
                    .iter()
                    .map(|s| format!("-1 {}", s.label()))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("Missed {title}: streak {streak_before} -> {streak_after}, {hits}")
            }
            Event::ShieldConsumed {
                title,
                shields_remaining,
                ..
            } => format!("Shield spent on {title} ({shields_remaining} left)"),
            Event::RestDayGranted {
                title,
                progress,
                target,
                ..
            } => format!("Rest day for {title} ({progress}/{target} logged)"),
            Event::MissionCompleted {
                title, xp, gold, ..
            } => format!("Mission complete: {title} (+{xp} XP, +{gold} gold)"),
            Event::RaidStepCompleted { title, .. } => format!("Raid step done: {title}"),
            Event::RaidCompleted {
                title, xp, gold, ..
            } => format!("Raid complete: {title} (+{xp} XP, +{gold} gold)"),
            Event::DaySettled {
                date,
                missed,
                shields_spent,
                ..
            } => format!("Settled {date}: {missed} missed, {shields_spent} shields spent"),
            Event::ShieldPurchased {
                shields,
                gold_remaining,
                ..
            } => format!("Bought a shield ({shields} pooled, {gold_remaining} gold left)"),
        }
    }
}
