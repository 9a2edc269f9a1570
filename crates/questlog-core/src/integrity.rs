//! Daily integrity weighting.
//!
//! Every obligation due on a date carries a weight from its difficulty
//! (easy 1, normal 3, hard 9). The normalized percentage shares serve two
//! purposes at once: the day grade shown to the user, and the relative cost
//! of abandoning one item (a skipped hard task hurts the day more than a
//! skipped chore). The computation is pure and re-entrant; callers may
//! recompute it as often as they like.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::habit::Habit;
use crate::quest::{Mission, Raid};

/// What kind of obligation a weighted entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Habit,
    Mission,
    RaidStep,
}

/// One due obligation's share of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightedItem {
    pub id: String,
    pub title: String,
    pub kind: ItemKind,
    /// Difficulty weight (1, 3 or 9)
    pub weight: u32,
    /// Rounded share of the day's total weight, 0-100
    pub percentage: u32,
    pub completed: bool,
}

/// Weight distribution over everything due on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWeights {
    pub date: NaiveDate,
    /// Entries sorted by descending weight; ties keep collection order
    pub entries: Vec<WeightedItem>,
    pub total_weight: u32,
}

impl DayWeights {
    /// Day grade, 0-100.
    ///
    /// A day with nothing due grades 100, and a fully completed day grades
    /// 100 even when the rounded shares do not sum exactly to it.
    pub fn grade(&self) -> u32 {
        if self.total_weight == 0 {
            return 100;
        }
        if self.entries.iter().all(|e| e.completed) {
            return 100;
        }
        self.entries
            .iter()
            .filter(|e| e.completed)
            .map(|e| e.percentage)
            .sum::<u32>()
            .min(100)
    }
}

/// Collect everything due on `date` and normalize the weight distribution.
///
/// The due set is: non-archived missions whose deadline falls on `date`,
/// non-archived habits whose recurrence makes them active on `date`, and
/// steps of non-archived raids scheduled for `date` (weighted by the raid's
/// difficulty).
pub fn daily_weights(
    date: NaiveDate,
    habits: &[Habit],
    missions: &[Mission],
    raids: &[Raid],
) -> DayWeights {
    let mut entries: Vec<WeightedItem> = Vec::new();

    for mission in missions.iter().filter(|m| !m.is_archived) {
        if mission.is_due_on(date) {
            entries.push(WeightedItem {
                id: mission.id.clone(),
                title: mission.title.clone(),
                kind: ItemKind::Mission,
                weight: mission.difficulty.weight(),
                percentage: 0,
                completed: mission.completed,
            });
        }
    }

    for habit in habits.iter().filter(|h| !h.is_archived) {
        if habit.is_due_on(date) {
            entries.push(WeightedItem {
                id: habit.id.clone(),
                title: habit.title.clone(),
                kind: ItemKind::Habit,
                weight: habit.difficulty.weight(),
                percentage: 0,
                completed: habit.history.contains(&date),
            });
        }
    }

    for raid in raids.iter().filter(|r| !r.is_archived) {
        for step in raid.steps.iter().filter(|s| s.scheduled_on == Some(date)) {
            entries.push(WeightedItem {
                id: step.id.clone(),
                title: step.title.clone(),
                kind: ItemKind::RaidStep,
                weight: raid.difficulty.weight(),
                percentage: 0,
                completed: step.done,
            });
        }
    }

    let total_weight: u32 = entries.iter().map(|e| e.weight).sum();
    if total_weight > 0 {
        for entry in &mut entries {
            entry.percentage =
                ((100.0 * f64::from(entry.weight)) / f64::from(total_weight)).round() as u32;
        }
    }

    // sort_by is stable, so equal weights keep collection order
    entries.sort_by(|a, b| b.weight.cmp(&a.weight));

    DayWeights {
        date,
        entries,
        total_weight,
    }
}
