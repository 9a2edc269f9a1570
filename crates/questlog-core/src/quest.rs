//! One-off missions and multi-step raids.
//!
//! Both are lighter than habits: no streaks and no settlement consequences,
//! just integrity weight on the day they are due and a reward on completion.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::habit::Difficulty;

/// A one-off obligation with an optional deadline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    /// Unique identifier
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Deadline; the mission counts toward the day this falls on
    pub due_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_archived: bool,
    pub created_at: DateTime<Utc>,
}

impl Mission {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Mission {
            id: format!("mission-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            difficulty: Difficulty::Normal,
            due_at: None,
            completed: false,
            completed_at: None,
            is_archived: false,
            created_at: now,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    pub fn with_due(mut self, due_at: DateTime<Utc>) -> Self {
        self.due_at = Some(due_at);
        self
    }

    /// Whether the deadline falls on `date`.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.due_at.map(|t| t.date_naive() == date).unwrap_or(false)
    }

    /// Mark completed. Returns false when archived or already completed.
    pub fn complete(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_archived || self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(now);
        true
    }
}

/// One step of a raid, optionally pinned to a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaidStep {
    /// Unique identifier
    pub id: String,
    pub title: String,
    /// Date the step counts toward, if planned
    pub scheduled_on: Option<NaiveDate>,
    #[serde(default)]
    pub done: bool,
}

impl RaidStep {
    pub fn new(title: impl Into<String>) -> Self {
        RaidStep {
            id: format!("step-{}", uuid::Uuid::new_v4()),
            title: title.into(),
            scheduled_on: None,
            done: false,
        }
    }

    pub fn scheduled_for(mut self, date: NaiveDate) -> Self {
        self.scheduled_on = Some(date);
        self
    }
}

/// What completing a raid step did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Raid archived or step already done; nothing changed
    Ignored,
    /// Step marked done; `raid_completed` when it was the last open one
    Done { raid_completed: bool },
}

/// A multi-step undertaking sharing one difficulty across its steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Raid {
    /// Unique identifier
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub steps: Vec<RaidStep>,
    #[serde(default)]
    pub is_archived: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Raid {
    pub fn new(title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Raid {
            id: format!("raid-{}-{}", now.timestamp(), uuid::Uuid::new_v4()),
            title: title.into(),
            description: None,
            difficulty: Difficulty::Normal,
            steps: Vec::new(),
            is_archived: false,
            completed_at: None,
            created_at: now,
        }
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty = difficulty;
        self
    }

    /// Append a step and return its id.
    pub fn add_step(&mut self, step: RaidStep) -> String {
        let id = step.id.clone();
        self.steps.push(step);
        id
    }

    /// Whether every step is done (and there is at least one).
    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.steps.iter().all(|s| s.done)
    }

    /// Mark the step with `step_id` done. `None` when no such step exists;
    /// completing the final open step stamps `completed_at`.
    pub fn complete_step(&mut self, step_id: &str, now: DateTime<Utc>) -> Option<StepOutcome> {
        if !self.steps.iter().any(|s| s.id == step_id) {
            return None;
        }
        if self.is_archived {
            return Some(StepOutcome::Ignored);
        }

        let step = self.steps.iter_mut().find(|s| s.id == step_id)?;
        if step.done {
            return Some(StepOutcome::Ignored);
        }
        step.done = true;

        let raid_completed = self.is_complete() && self.completed_at.is_none();
        if raid_completed {
            self.completed_at = Some(now);
        }
        Some(StepOutcome::Done { raid_completed })
    }
}
