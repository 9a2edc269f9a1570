//! Habit entity and per-habit transitions.
//!
//! A habit is a recurring obligation with a streak, a per-day resolution
//! status and optional multi-repetition targets. User-triggered transitions
//! (complete / fail) live here as methods returning outcome values; the
//! cross-habit end-of-day pass lives in `crate::settlement`.

pub mod recurrence;
pub mod streak;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::StatKind;
pub use recurrence::{is_active_on, Recurrence};
pub use streak::{fallback_on_break, level_of, position_of, LadderPosition, Phase, CHECKPOINTS};

/// Difficulty scale shared by habits, missions and raids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Normal,
    Hard,
}

impl Difficulty {
    /// Integrity weight of one obligation at this difficulty.
    pub fn weight(&self) -> u32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Normal => 3,
            Difficulty::Hard => 9,
        }
    }

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Normal
    }
}

/// Resolution of a habit within the current (unsettled) day.
///
/// The daily cycle:
///
///   PENDING ── complete (final rep) ──> COMPLETED
///     |  ^                                   |
///     |  '─────────── settlement ────────────'
///     |
///     +──── fail ──> FAILED ── settlement ──> PENDING
///
/// Settlement is the only writer that returns a habit to PENDING; a habit
/// missed entirely never leaves PENDING and takes its consequences at
/// settlement instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitStatus {
    /// Not yet resolved today (initial state, and the post-settlement state)
    Pending,
    /// All repetitions for today are logged
    Completed,
    /// Explicitly abandoned for today
    Failed,
}

impl HabitStatus {
    /// Whether today's outcome is already decided.
    pub fn is_resolved(&self) -> bool {
        matches!(self, HabitStatus::Completed | HabitStatus::Failed)
    }
}

impl Default for HabitStatus {
    fn default() -> Self {
        HabitStatus::Pending
    }
}

/// A scheduled nudge; `sent` is cleared by every settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Time of day, "HH:MM"
    pub time: String,
    /// Whether the nudge already fired today
    #[serde(default)]
    pub sent: bool,
}

impl Reminder {
    pub fn at(time: impl Into<String>) -> Self {
        Reminder {
            time: time.into(),
            sent: false,
        }
    }
}

/// A checklist item under a habit; `done` is cleared by every settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub title: String,
    #[serde(default)]
    pub done: bool,
}

impl Subtask {
    pub fn new(title: impl Into<String>) -> Self {
        Subtask {
            title: title.into(),
            done: false,
        }
    }
}

fn default_daily_target() -> u32 {
    1
}

/// A recurring obligation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier
    pub id: String,
    /// Habit title
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// When the habit is due
    #[serde(default)]
    pub recurrence: Recurrence,
    /// Difficulty, drives integrity weight and rewards
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Stats penalized when the habit is missed
    #[serde(default)]
    pub stats: Vec<StatKind>,
    /// Consecutive successful cycles
    #[serde(default)]
    pub streak: u32,
    /// High-water mark of `streak`, never decreases
    #[serde(default)]
    pub best_streak: u32,
    /// Resolution within the current day
    #[serde(default)]
    pub status: HabitStatus,
    /// Completion dates, append-only and duplicate-guarded
    #[serde(default)]
    pub history: Vec<NaiveDate>,
    /// True only while a shield consumed at the last settlement protects
    /// this habit
    #[serde(default)]
    pub shield_used: bool,
    /// Repetitions required per day before the habit counts as completed
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
    /// Repetitions logged so far today; reset by settlement
    #[serde(default)]
    pub daily_progress: u32,
    /// Lifetime completion cap; reaching it archives the habit
    #[serde(default)]
    pub total_repetitions: Option<u32>,
    /// Lifetime completions logged
    #[serde(default)]
    pub current_repetitions: u32,
    /// Archived habits are frozen: settlement skips them entirely
    #[serde(default)]
    pub is_archived: bool,
    /// Per-day nudges
    #[serde(default)]
    pub reminders: Vec<Reminder>,
    /// Per-day checklist
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Creation timestamp, anchors recurrence arithmetic
    pub created_at: DateTime<Utc>,
}

/// What a completion attempt did to the habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteOutcome {
    /// Archived or already resolved today; nothing changed
    Ignored,
    /// One more repetition logged, target not yet met
    Progress { progress: u32, target: u32 },
    /// Final repetition: status flipped and the streak advanced
    Done { streak: u32, archived: bool },
}

/// What an explicit failure did to the habit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// Archived or already resolved today; nothing changed
    Ignored,
    /// The habit fell down the ladder
    Failed { streak_before: u32, streak_after: u32 },
}

impl Habit {
    /// Create a new pending habit.
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Habit {
            id: format!("habit-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            recurrence: Recurrence::Daily,
            difficulty: Difficulty::Normal,
            stats: Vec::new(),
            streak: 0,
            best_streak: 0,
            status: HabitStatus::Pending,
            history: Vec::new(),
            shield_used: false,
            daily_target: 1,
            daily_progress: 0,
            total_repetitions: None,
            current_repetitions: 0,
            is_archived: false,
            reminders: Vec::new(),
            subtasks: Vec::new(),
            created_at: now,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_recurrence(mut self, recurrence: Recurrence) -> Self {
        self.recurrence = recurrence;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_stats(mut self, stats: Vec<StatKind>) -> Self {
        self.stats = stats;
        self
    }

    /// Repetitions per day; zero is normalized to one.
    pub fn with_daily_target(mut self, target: u32) -> Self {
        self.daily_target = target.max(1);
        self
    }

    pub fn with_total_repetitions(mut self, total: u32) -> Self {
        self.total_repetitions = Some(total);
        self
    }

    /// Whether the habit is due on `date` per its recurrence.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        recurrence::is_active_on(&self.recurrence, self.created_at, date)
    }

    /// Ladder position for the current streak.
    pub fn ladder(&self) -> LadderPosition {
        streak::position_of(self.streak)
    }

    /// Log one repetition for `today`.
    ///
    /// Multi-repetition habits stay PENDING until the final repetition;
    /// only that one advances the streak, stamps `history` and counts
    /// toward the lifetime cap. Archived or already-resolved habits are
    /// left untouched.
    pub fn complete(&mut self, today: NaiveDate) -> CompleteOutcome {
        if self.is_archived || self.status.is_resolved() {
            return CompleteOutcome::Ignored;
        }

        let target = self.daily_target.max(1);
        if self.daily_progress + 1 < target {
            self.daily_progress += 1;
            return CompleteOutcome::Progress {
                progress: self.daily_progress,
                target,
            };
        }

        self.daily_progress = target;
        self.status = HabitStatus::Completed;
        self.streak = self.streak.saturating_add(1);
        self.best_streak = self.best_streak.max(self.streak);
        if !self.history.contains(&today) {
            self.history.push(today);
        }

        self.current_repetitions = self.current_repetitions.saturating_add(1);
        let archived = match self.total_repetitions {
            Some(total) if self.current_repetitions >= total => {
                self.is_archived = true;
                true
            }
            _ => false,
        };

        CompleteOutcome::Done {
            streak: self.streak,
            archived,
        }
    }

    /// Explicitly abandon the habit for today.
    ///
    /// The ladder fallback applies immediately; `best_streak` is untouched.
    pub fn fail(&mut self) -> FailOutcome {
        if self.is_archived || self.status.is_resolved() {
            return FailOutcome::Ignored;
        }

        let streak_before = self.streak;
        self.status = HabitStatus::Failed;
        self.streak = streak::fallback_on_break(streak_before);

        FailOutcome::Failed {
            streak_before,
            streak_after: self.streak,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn make_test_habit(title: &str) -> Habit {
        Habit::new(title, Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn new_habit_defaults() {
        let h = make_test_habit("Morning Run");
        assert!(h.id.starts_with("habit-"));
        assert_eq!(h.status, HabitStatus::Pending);
        assert_eq!(h.streak, 0);
        assert_eq!(h.daily_target, 1);
        assert_eq!(h.daily_progress, 0);
        assert!(!h.is_archived);
        assert!(h.is_due_on(day(5)));
    }

    #[test]
    fn complete_single_target() {
        let mut h = make_test_habit("Read");
        let out = h.complete(day(2));
        assert_eq!(
            out,
            CompleteOutcome::Done {
                streak: 1,
                archived: false
            }
        );
        assert_eq!(h.status, HabitStatus::Completed);
        assert_eq!(h.best_streak, 1);
        assert_eq!(h.daily_progress, 1);
        assert_eq!(h.history, vec![day(2)]);
    }

    #[test]
    fn complete_multi_rep_stays_pending_until_final() {
        let mut h = make_test_habit("Hydrate").with_daily_target(3);

        assert_eq!(
            h.complete(day(2)),
            CompleteOutcome::Progress {
                progress: 1,
                target: 3
            }
        );
        assert_eq!(h.status, HabitStatus::Pending);
        assert_eq!(h.streak, 0);
        assert!(h.history.is_empty());

        assert_eq!(
            h.complete(day(2)),
            CompleteOutcome::Progress {
                progress: 2,
                target: 3
            }
        );

        assert_eq!(
            h.complete(day(2)),
            CompleteOutcome::Done {
                streak: 1,
                archived: false
            }
        );
        assert_eq!(h.status, HabitStatus::Completed);
        assert_eq!(h.daily_progress, 3);
        assert_eq!(h.history, vec![day(2)]);
    }

    #[test]
    fn complete_is_noop_once_resolved() {
        let mut h = make_test_habit("Read");
        h.complete(day(2));
        let snapshot = h.clone();
        assert_eq!(h.complete(day(2)), CompleteOutcome::Ignored);
        assert_eq!(h, snapshot);
    }

    #[test]
    fn complete_is_noop_when_archived() {
        let mut h = make_test_habit("Read");
        h.is_archived = true;
        assert_eq!(h.complete(day(2)), CompleteOutcome::Ignored);
        assert_eq!(h.streak, 0);
    }

    #[test]
    fn complete_auto_archives_at_lifetime_cap() {
        let mut h = make_test_habit("Course").with_total_repetitions(2);

        assert_eq!(
            h.complete(day(2)),
            CompleteOutcome::Done {
                streak: 1,
                archived: false
            }
        );

        h.status = HabitStatus::Pending; // as settlement would do
        assert_eq!(
            h.complete(day(3)),
            CompleteOutcome::Done {
                streak: 2,
                archived: true
            }
        );
        assert!(h.is_archived);
        assert_eq!(h.current_repetitions, 2);
    }

    #[test]
    fn history_is_duplicate_guarded() {
        let mut h = make_test_habit("Read");
        h.complete(day(2));
        h.status = HabitStatus::Pending;
        h.complete(day(2));
        assert_eq!(h.history, vec![day(2)]);
    }

    #[test]
    fn fail_applies_fallback_immediately() {
        let mut h = make_test_habit("Run");
        h.streak = 10;
        h.best_streak = 10;

        let out = h.fail();
        assert_eq!(
            out,
            FailOutcome::Failed {
                streak_before: 10,
                streak_after: 8
            }
        );
        assert_eq!(h.status, HabitStatus::Failed);
        assert_eq!(h.streak, 8);
        assert_eq!(h.best_streak, 10);
    }

    #[test]
    fn fail_is_noop_once_resolved() {
        let mut h = make_test_habit("Run");
        h.complete(day(2));
        assert_eq!(h.fail(), FailOutcome::Ignored);
        assert_eq!(h.status, HabitStatus::Completed);
    }

    #[test]
    fn deserializes_with_missing_optional_fields() {
        let json = r#"{
            "id": "habit-1",
            "title": "Old habit",
            "description": null,
            "created_at": "2024-01-01T08:00:00Z"
        }"#;
        let h: Habit = serde_json::from_str(json).unwrap();
        assert_eq!(h.recurrence, Recurrence::Daily);
        assert_eq!(h.daily_target, 1);
        assert_eq!(h.status, HabitStatus::Pending);
        assert!(h.stats.is_empty());
        assert!(!h.shield_used);
    }
}
