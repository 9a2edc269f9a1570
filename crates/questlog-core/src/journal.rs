//! The persisted journal document and its orchestration methods.
//!
//! Everything the player owns lives in one serialized document: habit,
//! mission and raid collections, the profile ledger and the settlement
//! watermark. All mutations flow through methods that take an explicit
//! `now` and the loaded `Config`; the journal itself never reads the clock,
//! which keeps every path replayable in tests.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Result, ValidationError};
use crate::events::Event;
use crate::habit::{CompleteOutcome, FailOutcome, Habit};
use crate::profile::{Profile, StatKind};
use crate::quest::{Mission, Raid, RaidStep, StepOutcome};
use crate::rewards::{reward_for, SHIELD_PRICE_GOLD};
use crate::settlement::{settle, virtual_day};
use crate::storage::Config;

/// Current journal document version.
pub const JOURNAL_VERSION: u32 = 1;

/// The whole persisted state of one player.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journal {
    /// Document version; raw documents without one are treated as v0
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub missions: Vec<Mission>,
    #[serde(default)]
    pub raids: Vec<Raid>,
    #[serde(default)]
    pub profile: Profile,
    /// Settlement watermark; None until the first tick opens the ledger
    #[serde(default)]
    pub last_settled_at: Option<DateTime<Utc>>,
}

impl Default for Journal {
    fn default() -> Self {
        Journal {
            version: JOURNAL_VERSION,
            habits: Vec::new(),
            missions: Vec::new(),
            raids: Vec::new(),
            profile: Profile::default(),
            last_settled_at: None,
        }
    }
}

impl Journal {
    // ── Document migration ───────────────────────────────────────────

    /// Deserialize a raw document of any known version.
    ///
    /// Migration is explicit and field-precedence aware: a field present in
    /// the raw document always wins; injected defaults only fill gaps.
    /// Documents too broken to interpret degrade to an empty journal rather
    /// than erroring, matching the engine's fail-open posture.
    pub fn from_raw(mut raw: Value) -> Journal {
        let Some(obj) = raw.as_object_mut() else {
            return Journal::default();
        };

        let version = obj.get("version").and_then(Value::as_u64).unwrap_or(0);
        if version < 1 {
            migrate_v1(obj);
        }
        obj.insert("version".into(), JOURNAL_VERSION.into());

        serde_json::from_value(raw).unwrap_or_default()
    }

    // ── Lookups ──────────────────────────────────────────────────────

    pub fn habit(&self, id: &str) -> Result<&Habit> {
        self.habits
            .iter()
            .find(|h| h.id == id)
            .ok_or_else(|| ValidationError::UnknownId {
                kind: "habit",
                id: id.to_string(),
            }.into())
    }

    fn habit_mut(&mut self, id: &str) -> Result<&mut Habit> {
        self.habits
            .iter_mut()
            .find(|h| h.id == id)
            .ok_or_else(|| ValidationError::UnknownId {
                kind: "habit",
                id: id.to_string(),
            }.into())
    }

    fn mission_mut(&mut self, id: &str) -> Result<&mut Mission> {
        self.missions
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or_else(|| ValidationError::UnknownId {
                kind: "mission",
                id: id.to_string(),
            }.into())
    }

    fn raid_mut(&mut self, id: &str) -> Result<&mut Raid> {
        self.raids
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| ValidationError::UnknownId {
                kind: "raid",
                id: id.to_string(),
            }.into())
    }

    // ── Collection edits ─────────────────────────────────────────────

    pub fn add_habit(&mut self, habit: Habit) -> &Habit {
        self.habits.push(habit);
        self.habits.last().unwrap()
    }

    pub fn add_mission(&mut self, mission: Mission) -> &Mission {
        self.missions.push(mission);
        self.missions.last().unwrap()
    }

    pub fn add_raid(&mut self, raid: Raid) -> &Raid {
        self.raids.push(raid);
        self.raids.last().unwrap()
    }

    pub fn add_raid_step(&mut self, raid_id: &str, step: RaidStep) -> Result<String> {
        Ok(self.raid_mut(raid_id)?.add_step(step))
    }

    pub fn archive_habit(&mut self, id: &str) -> Result<()> {
        self.habit_mut(id)?.is_archived = true;
        Ok(())
    }

    pub fn remove_habit(&mut self, id: &str) -> Result<Habit> {
        let idx = self
            .habits
            .iter()
            .position(|h| h.id == id)
            .ok_or(ValidationError::UnknownId {
                kind: "habit",
                id: id.to_string(),
            })?;
        Ok(self.habits.remove(idx))
    }

    // ── Gameplay commands ────────────────────────────────────────────

    /// Run settlement if a virtual day boundary has passed.
    ///
    /// The single impure-looking entry point of the engine, except nothing
    /// here reads the clock either: hosts pass `now` on whatever schedule
    /// they like (launch, foregrounding, a CLI call) and redundant calls
    /// inside one virtual day return no events.
    pub fn tick(&mut self, now: DateTime<Utc>, config: &Config) -> Vec<Event> {
        let last = match self.last_settled_at {
            Some(last) => last,
            None => {
                // first tick ever: open the ledger, there is no day to close
                self.last_settled_at = Some(now);
                return Vec::new();
            }
        };

        match settle(
            now,
            last,
            &self.habits,
            self.profile.shields,
            config.engine.day_start_hour,
        ) {
            Some(outcome) => {
                self.habits = outcome.habits;
                self.profile.shields = outcome.shields;
                self.profile.apply_penalties(&outcome.stat_penalties);
                self.last_settled_at = Some(now);
                outcome.events
            }
            None => Vec::new(),
        }
    }

    /// Log one repetition of a habit for the current virtual day.
    pub fn complete_habit(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        config: &Config,
    ) -> Result<Vec<Event>> {
        let today = virtual_day(now, config.engine.day_start_hour);
        let mode = config.rewards.mode;

        let habit = self.habit_mut(id)?;
        let outcome = habit.complete(today);
        let habit_id = habit.id.clone();
        let title = habit.title.clone();
        let difficulty = habit.difficulty;

        match outcome {
            CompleteOutcome::Ignored => Ok(Vec::new()),
            CompleteOutcome::Progress { progress, target } => Ok(vec![Event::HabitProgress {
                habit_id,
                title,
                progress,
                target,
                at: now,
            }]),
            CompleteOutcome::Done { streak, archived } => {
                let reward = reward_for(difficulty, mode);
                self.profile.credit(reward);
                let mut events = vec![Event::HabitCompleted {
                    habit_id: habit_id.clone(),
                    title: title.clone(),
                    streak,
                    xp: reward.xp,
                    gold: reward.gold,
                    at: now,
                }];
                if archived {
                    events.push(Event::HabitArchived {
                        habit_id,
                        title,
                        at: now,
                    });
                }
                Ok(events)
            }
        }
    }

    /// Explicitly abandon a habit for today. The streak falls immediately;
    /// whether stats take a hit too is the `penalty.explicit_fail_hits_stats`
    /// policy.
    pub fn fail_habit(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        config: &Config,
    ) -> Result<Vec<Event>> {
        let habit = self.habit_mut(id)?;
        let outcome = habit.fail();
        let habit_id = habit.id.clone();
        let title = habit.title.clone();
        let tagged = habit.stats.clone();

        match outcome {
            FailOutcome::Ignored => Ok(Vec::new()),
            FailOutcome::Failed {
                streak_before,
                streak_after,
            } => {
                if config.penalty.explicit_fail_hits_stats {
                    let mut penalties = BTreeMap::new();
                    for stat in tagged {
                        *penalties.entry(stat).or_insert(0u32) += 1;
                    }
                    *penalties.entry(StatKind::Discipline).or_insert(0) += 1;
                    self.profile.apply_penalties(&penalties);
                }
                Ok(vec![Event::HabitFailed {
                    habit_id,
                    title,
                    streak_before,
                    streak_after,
                    at: now,
                }])
            }
        }
    }

    pub fn complete_mission(
        &mut self,
        id: &str,
        now: DateTime<Utc>,
        config: &Config,
    ) -> Result<Vec<Event>> {
        let mode = config.rewards.mode;

        let mission = self.mission_mut(id)?;
        if !mission.complete(now) {
            return Ok(Vec::new());
        }
        let mission_id = mission.id.clone();
        let title = mission.title.clone();
        let difficulty = mission.difficulty;

        let reward = reward_for(difficulty, mode);
        self.profile.credit(reward);
        Ok(vec![Event::MissionCompleted {
            mission_id,
            title,
            xp: reward.xp,
            gold: reward.gold,
            at: now,
        }])
    }

    /// Mark one raid step done; completing the last step completes the raid
    /// and grants its reward once.
    pub fn complete_raid_step(
        &mut self,
        raid_id: &str,
        step_id: &str,
        now: DateTime<Utc>,
        config: &Config,
    ) -> Result<Vec<Event>> {
        let mode = config.rewards.mode;

        let raid = self.raid_mut(raid_id)?;
        let outcome = raid
            .complete_step(step_id, now)
            .ok_or(ValidationError::UnknownId {
                kind: "raid step",
                id: step_id.to_string(),
            })?;
        let rid = raid.id.clone();
        let raid_title = raid.title.clone();
        let difficulty = raid.difficulty;
        let step_title = raid
            .steps
            .iter()
            .find(|s| s.id == step_id)
            .map(|s| s.title.clone())
            .unwrap_or_default();

        match outcome {
            StepOutcome::Ignored => Ok(Vec::new()),
            StepOutcome::Done { raid_completed } => {
                let mut events = vec![Event::RaidStepCompleted {
                    raid_id: rid.clone(),
                    step_id: step_id.to_string(),
                    title: step_title,
                    at: now,
                }];
                if raid_completed {
                    let reward = reward_for(difficulty, mode);
                    self.profile.credit(reward);
                    events.push(Event::RaidCompleted {
                        raid_id: rid,
                        title: raid_title,
                        xp: reward.xp,
                        gold: reward.gold,
                        at: now,
                    });
                }
                Ok(events)
            }
        }
    }

    /// Exchange gold for one pooled shield.
    pub fn buy_shield(&mut self, now: DateTime<Utc>) -> Result<Vec<Event>> {
        if !self.profile.buy_shield(SHIELD_PRICE_GOLD) {
            return Err(ValidationError::InvalidValue {
                field: "gold".into(),
                message: format!(
                    "a shield costs {} gold, profile has {}",
                    SHIELD_PRICE_GOLD, self.profile.gold
                ),
            }
            .into());
        }
        Ok(vec![Event::ShieldPurchased {
            shields: self.profile.shields,
            gold_remaining: self.profile.gold,
            at: now,
        }])
    }
}

/// v0 -> v1: scalar `stat` becomes the `stats` list and legacy
/// `reminder_minutes` (minutes of day) become reminder entries.
fn migrate_v1(obj: &mut serde_json::Map<String, Value>) {
    let Some(habits) = obj.get_mut("habits").and_then(Value::as_array_mut) else {
        return;
    };

    for habit in habits.iter_mut() {
        let Some(h) = habit.as_object_mut() else {
            continue;
        };

        let legacy_stat = h.remove("stat");
        if !h.contains_key("stats") {
            let stats = match legacy_stat {
                Some(Value::String(s)) if StatKind::parse(&s).is_some() => {
                    vec![Value::String(s)]
                }
                _ => vec![Value::String("discipline".into())],
            };
            h.insert("stats".into(), Value::Array(stats));
        }

        let legacy_minutes = h.remove("reminder_minutes");
        if !h.contains_key("reminders") {
            if let Some(Value::Array(minutes)) = legacy_minutes {
                let reminders = minutes
                    .iter()
                    .filter_map(Value::as_u64)
                    .map(|m| {
                        let m = m % (24 * 60);
                        serde_json::json!({
                            "time": format!("{:02}:{:02}", m / 60, m % 60),
                            "sent": false,
                        })
                    })
                    .collect();
                h.insert("reminders".into(), Value::Array(reminders));
            }
        }

        if let Some(target) = h.get("daily_target").and_then(Value::as_u64) {
            if target == 0 {
                h.insert("daily_target".into(), 1.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::habit::Difficulty;
    use crate::quest::RaidStep;
    use chrono::TimeZone;
    use serde_json::json;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, d, h, 0, 0).unwrap()
    }

    fn make_journal_with_habit() -> (Journal, String) {
        let mut journal = Journal::default();
        let habit = Habit::new("Morning Run", at(1, 8)).with_stats(vec![StatKind::Vitality]);
        let id = habit.id.clone();
        journal.add_habit(habit);
        (journal, id)
    }

    #[test]
    fn first_tick_opens_the_ledger() {
        let (mut journal, _) = make_journal_with_habit();
        let events = journal.tick(at(1, 9), &Config::default());
        assert!(events.is_empty());
        assert_eq!(journal.last_settled_at, Some(at(1, 9)));
    }

    #[test]
    fn tick_settles_and_applies_the_ledger() {
        let (mut journal, _) = make_journal_with_habit();
        journal.profile.stats.insert(StatKind::Vitality, 3);
        journal.tick(at(1, 9), &Config::default());

        let events = journal.tick(at(2, 9), &Config::default());
        assert!(events.iter().any(|e| matches!(e, Event::HabitMissed { .. })));
        assert_eq!(journal.profile.stat(StatKind::Vitality), 2);
        assert_eq!(journal.last_settled_at, Some(at(2, 9)));

        // same virtual day again: nothing
        assert!(journal.tick(at(2, 22), &Config::default()).is_empty());
    }

    #[test]
    fn complete_habit_credits_the_reward() {
        let (mut journal, id) = make_journal_with_habit();
        let events = journal
            .complete_habit(&id, at(1, 9), &Config::default())
            .unwrap();

        assert!(matches!(events[0], Event::HabitCompleted { streak: 1, .. }));
        assert_eq!(journal.profile.xp, 25);
        assert_eq!(journal.profile.gold, 10);
        assert_eq!(journal.habit(&id).unwrap().streak, 1);

        // second completion the same day is a silent no-op
        let again = journal
            .complete_habit(&id, at(1, 10), &Config::default())
            .unwrap();
        assert!(again.is_empty());
        assert_eq!(journal.profile.xp, 25);
    }

    #[test]
    fn unknown_ids_are_validation_errors() {
        let mut journal = Journal::default();
        assert!(journal
            .complete_habit("habit-nope", at(1, 9), &Config::default())
            .is_err());
        assert!(journal.habit("habit-nope").is_err());
        assert!(journal.remove_habit("habit-nope").is_err());
    }

    #[test]
    fn explicit_fail_policy_gates_the_stat_hit() {
        let (mut journal, id) = make_journal_with_habit();
        journal.profile.stats.insert(StatKind::Vitality, 3);
        journal.habit_mut(&id).unwrap().streak = 10;

        let off = Config::default();
        let events = journal.fail_habit(&id, at(1, 9), &off).unwrap();
        assert!(matches!(
            events[0],
            Event::HabitFailed {
                streak_before: 10,
                streak_after: 8,
                ..
            }
        ));
        assert_eq!(journal.profile.stat(StatKind::Vitality), 3);

        let mut on = Config::default();
        on.penalty.explicit_fail_hits_stats = true;
        let (mut journal2, id2) = make_journal_with_habit();
        journal2.profile.stats.insert(StatKind::Vitality, 3);
        journal2.fail_habit(&id2, at(1, 9), &on).unwrap();
        assert_eq!(journal2.profile.stat(StatKind::Vitality), 2);
        assert_eq!(journal2.profile.stat(StatKind::Discipline), 0);
    }

    #[test]
    fn mission_completion_rewards_once() {
        let mut journal = Journal::default();
        let mission = Mission::new("File taxes", at(1, 8)).with_difficulty(Difficulty::Hard);
        let id = mission.id.clone();
        journal.add_mission(mission);

        let events = journal
            .complete_mission(&id, at(1, 9), &Config::default())
            .unwrap();
        assert!(matches!(events[0], Event::MissionCompleted { xp: 60, .. }));
        assert_eq!(journal.profile.xp, 60);

        assert!(journal
            .complete_mission(&id, at(1, 10), &Config::default())
            .unwrap()
            .is_empty());
        assert_eq!(journal.profile.xp, 60);
    }

    #[test]
    fn raid_reward_lands_on_the_final_step() {
        let mut journal = Journal::default();
        let mut raid = Raid::new("Spring cleaning", at(1, 8));
        let a = raid.add_step(RaidStep::new("Kitchen"));
        let b = raid.add_step(RaidStep::new("Garage"));
        let rid = raid.id.clone();
        journal.add_raid(raid);

        let first = journal
            .complete_raid_step(&rid, &a, at(1, 9), &Config::default())
            .unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(journal.profile.xp, 0);

        let last = journal
            .complete_raid_step(&rid, &b, at(1, 10), &Config::default())
            .unwrap();
        assert_eq!(last.len(), 2);
        assert!(matches!(last[1], Event::RaidCompleted { xp: 25, .. }));
        assert_eq!(journal.profile.xp, 25);

        assert!(journal
            .complete_raid_step(&rid, "step-missing", at(1, 11), &Config::default())
            .is_err());
    }

    #[test]
    fn steps_can_be_added_after_the_raid_exists() {
        let mut journal = Journal::default();
        let raid = Raid::new("Garden overhaul", at(1, 8));
        let rid = raid.id.clone();
        journal.add_raid(raid);

        let sid = journal
            .add_raid_step(&rid, RaidStep::new("Weed the beds"))
            .unwrap();
        assert!(sid.starts_with("step-"));
        assert_eq!(journal.raids[0].steps.len(), 1);
        assert!(journal
            .add_raid_step("raid-nope", RaidStep::new("Nowhere"))
            .is_err());
    }

    #[test]
    fn buy_shield_needs_gold() {
        let mut journal = Journal::default();
        assert!(journal.buy_shield(at(1, 9)).is_err());

        journal.profile.gold = 50;
        let events = journal.buy_shield(at(1, 9)).unwrap();
        assert!(matches!(
            events[0],
            Event::ShieldPurchased {
                shields: 1,
                gold_remaining: 0,
                ..
            }
        ));
    }

    // ── Migration ────────────────────────────────────────────────────

    #[test]
    fn v0_scalar_stat_becomes_the_stats_list() {
        let raw = json!({
            "habits": [{
                "id": "habit-1",
                "title": "Old",
                "description": null,
                "stat": "vitality",
                "created_at": "2024-01-01T08:00:00Z",
            }],
        });
        let journal = Journal::from_raw(raw);
        assert_eq!(journal.version, JOURNAL_VERSION);
        assert_eq!(journal.habits[0].stats, vec![StatKind::Vitality]);
    }

    #[test]
    fn v0_habit_without_any_stat_defaults_to_discipline() {
        let raw = json!({
            "habits": [{
                "id": "habit-1",
                "title": "Old",
                "description": null,
                "created_at": "2024-01-01T08:00:00Z",
            }],
        });
        let journal = Journal::from_raw(raw);
        assert_eq!(journal.habits[0].stats, vec![StatKind::Discipline]);
    }

    #[test]
    fn v0_unknown_stat_name_degrades_to_discipline() {
        let raw = json!({
            "habits": [{
                "id": "habit-1",
                "title": "Old",
                "description": null,
                "stat": "luck",
                "created_at": "2024-01-01T08:00:00Z",
            }],
        });
        let journal = Journal::from_raw(raw);
        assert_eq!(journal.habits[0].stats, vec![StatKind::Discipline]);
    }

    #[test]
    fn v0_reminder_minutes_become_reminders() {
        let raw = json!({
            "habits": [{
                "id": "habit-1",
                "title": "Old",
                "description": null,
                "reminder_minutes": [450, 1230],
                "created_at": "2024-01-01T08:00:00Z",
            }],
        });
        let journal = Journal::from_raw(raw);
        let reminders = &journal.habits[0].reminders;
        assert_eq!(reminders.len(), 2);
        assert_eq!(reminders[0].time, "07:30");
        assert_eq!(reminders[1].time, "20:30");
        assert!(!reminders[0].sent);
    }

    #[test]
    fn explicit_fields_always_win_over_injected_defaults() {
        let raw = json!({
            "habits": [{
                "id": "habit-1",
                "title": "Old",
                "description": null,
                "stat": "vitality",
                "stats": ["strength"],
                "streak": 7,
                "created_at": "2024-01-01T08:00:00Z",
            }],
        });
        let journal = Journal::from_raw(raw);
        assert_eq!(journal.habits[0].stats, vec![StatKind::Strength]);
        assert_eq!(journal.habits[0].streak, 7);
    }

    #[test]
    fn zero_daily_target_is_clamped_to_one() {
        let raw = json!({
            "habits": [{
                "id": "habit-1",
                "title": "Old",
                "description": null,
                "daily_target": 0,
                "created_at": "2024-01-01T08:00:00Z",
            }],
        });
        let journal = Journal::from_raw(raw);
        assert_eq!(journal.habits[0].daily_target, 1);
    }

    #[test]
    fn garbage_documents_degrade_to_an_empty_journal() {
        assert!(Journal::from_raw(json!("not an object")).habits.is_empty());
        assert!(Journal::from_raw(json!({"habits": "nope"})).habits.is_empty());
    }
}
