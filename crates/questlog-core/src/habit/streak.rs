//! Checkpoint-based streak ladder.
//!
//! Streaks do not level linearly: the ladder climbs through Fibonacci-spaced
//! checkpoints, so early levels come fast and later ones demand long
//! commitment. Breaking a streak falls back asymmetrically depending on
//! whether the habit was sitting exactly on a checkpoint (hard landing, drop
//! to the previous rung) or partway up to the next one (soft landing, drop to
//! the last rung passed).

use serde::{Deserialize, Serialize};

/// Streak day counts at which a new level is earned, in ascending order.
pub const CHECKPOINTS: [u32; 14] = [1, 2, 3, 5, 8, 13, 21, 34, 55, 89, 144, 233, 377, 610];

/// Named band of the ladder, derived from the level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Levels 0-7: the habit is still forming
    Foundation,
    /// Levels 8-10: routine has set in
    SolidState,
    /// Levels 11-12: the habit runs itself
    Mastery,
    /// Level 13: one rung below the top
    Legendary,
    /// Level 14 and beyond: the ladder is complete
    Apex,
}

impl Phase {
    /// Map a ladder level to its phase band.
    pub fn for_level(level: u32) -> Phase {
        match level {
            0..=7 => Phase::Foundation,
            8..=10 => Phase::SolidState,
            11..=12 => Phase::Mastery,
            13 => Phase::Legendary,
            _ => Phase::Apex,
        }
    }

    /// Human-readable phase name
    pub fn description(&self) -> &'static str {
        match self {
            Phase::Foundation => "Foundation",
            Phase::SolidState => "Solid State",
            Phase::Mastery => "Mastery",
            Phase::Legendary => "Legendary",
            Phase::Apex => "Apex",
        }
    }
}

/// Where a streak currently sits on the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LadderPosition {
    /// The streak the position was computed from
    pub streak: u32,
    /// Number of checkpoints reached (0 when the streak is 0)
    pub level: u32,
    /// Phase band for the level
    pub phase: Phase,
    /// Greatest checkpoint at or below the streak (0 before the first)
    pub prev_checkpoint: u32,
    /// Next checkpoint to reach (the final one once the ladder is complete)
    pub next_checkpoint: u32,
    /// Progress from prev to next checkpoint, 0-100
    pub progress_percent: u32,
}

/// Number of checkpoints the streak has reached.
pub fn level_of(streak: u32) -> u32 {
    CHECKPOINTS.iter().filter(|&&cp| cp <= streak).count() as u32
}

/// Full ladder position for a streak value.
pub fn position_of(streak: u32) -> LadderPosition {
    let level = level_of(streak);
    let last = CHECKPOINTS[CHECKPOINTS.len() - 1];

    let prev_checkpoint = CHECKPOINTS
        .iter()
        .rev()
        .find(|&&cp| cp <= streak)
        .copied()
        .unwrap_or(0);
    let next_checkpoint = CHECKPOINTS
        .iter()
        .find(|&&cp| cp > streak)
        .copied()
        .unwrap_or(last);

    let progress_percent = if streak >= last {
        100
    } else {
        // next > prev is guaranteed below the final checkpoint
        let span = next_checkpoint - prev_checkpoint;
        (100 * (streak - prev_checkpoint) / span).min(100)
    };

    LadderPosition {
        streak,
        level,
        phase: Phase::for_level(level),
        prev_checkpoint,
        next_checkpoint,
        progress_percent,
    }
}

/// New streak value after a break.
///
/// Falls are asymmetric: a streak that already left its last checkpoint
/// behind keeps that checkpoint (soft landing), while a streak sitting
/// exactly on a checkpoint loses the whole rung and drops to the previous
/// one (hard landing). Streaks of 0 or 1 reset to 0.
pub fn fallback_on_break(streak: u32) -> u32 {
    if streak <= 1 {
        return 0;
    }

    let idx = match CHECKPOINTS.iter().rposition(|&cp| cp <= streak) {
        Some(idx) => idx,
        // streak >= 2 always has a checkpoint below it; kept total anyway
        None => return 0,
    };

    if streak > CHECKPOINTS[idx] {
        // soft landing: keep the last checkpoint passed
        CHECKPOINTS[idx]
    } else if idx > 0 {
        // hard landing: drop a full rung
        CHECKPOINTS[idx - 1]
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checkpoints_are_strictly_ascending() {
        for pair in CHECKPOINTS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn level_counts_checkpoints_reached() {
        assert_eq!(level_of(0), 0);
        assert_eq!(level_of(1), 1);
        assert_eq!(level_of(2), 2);
        assert_eq!(level_of(4), 3);
        assert_eq!(level_of(8), 5);
        assert_eq!(level_of(12), 5);
        assert_eq!(level_of(610), 14);
        assert_eq!(level_of(10_000), 14);
    }

    #[test]
    fn phases_band_by_level() {
        assert_eq!(Phase::for_level(0), Phase::Foundation);
        assert_eq!(Phase::for_level(7), Phase::Foundation);
        assert_eq!(Phase::for_level(8), Phase::SolidState);
        assert_eq!(Phase::for_level(10), Phase::SolidState);
        assert_eq!(Phase::for_level(11), Phase::Mastery);
        assert_eq!(Phase::for_level(12), Phase::Mastery);
        assert_eq!(Phase::for_level(13), Phase::Legendary);
        assert_eq!(Phase::for_level(14), Phase::Apex);
        assert_eq!(Phase::for_level(40), Phase::Apex);
    }

    #[test]
    fn position_midway_between_checkpoints() {
        let pos = position_of(4);
        assert_eq!(pos.level, 3);
        assert_eq!(pos.prev_checkpoint, 3);
        assert_eq!(pos.next_checkpoint, 5);
        assert_eq!(pos.progress_percent, 50);
    }

    #[test]
    fn position_on_a_checkpoint_starts_next_climb() {
        let pos = position_of(8);
        assert_eq!(pos.level, 5);
        assert_eq!(pos.prev_checkpoint, 8);
        assert_eq!(pos.next_checkpoint, 13);
        assert_eq!(pos.progress_percent, 0);
    }

    #[test]
    fn position_before_first_checkpoint() {
        let pos = position_of(0);
        assert_eq!(pos.level, 0);
        assert_eq!(pos.phase, Phase::Foundation);
        assert_eq!(pos.prev_checkpoint, 0);
        assert_eq!(pos.next_checkpoint, 1);
        assert_eq!(pos.progress_percent, 0);
    }

    #[test]
    fn position_past_the_final_checkpoint() {
        let pos = position_of(700);
        assert_eq!(pos.level, 14);
        assert_eq!(pos.phase, Phase::Apex);
        assert_eq!(pos.prev_checkpoint, 610);
        assert_eq!(pos.next_checkpoint, 610);
        assert_eq!(pos.progress_percent, 100);
    }

    #[test]
    fn fallback_resets_tiny_streaks() {
        assert_eq!(fallback_on_break(0), 0);
        assert_eq!(fallback_on_break(1), 0);
    }

    #[test]
    fn fallback_soft_landing_keeps_last_checkpoint() {
        assert_eq!(fallback_on_break(10), 8);
        assert_eq!(fallback_on_break(4), 3);
        assert_eq!(fallback_on_break(100), 89);
        assert_eq!(fallback_on_break(700), 610);
    }

    #[test]
    fn fallback_hard_landing_drops_a_rung() {
        assert_eq!(fallback_on_break(2), 1);
        assert_eq!(fallback_on_break(3), 2);
        assert_eq!(fallback_on_break(5), 3);
        assert_eq!(fallback_on_break(8), 5);
        assert_eq!(fallback_on_break(610), 377);
    }

    #[test]
    fn fallback_never_raises_the_streak() {
        for streak in 0..1000 {
            assert!(fallback_on_break(streak) <= streak);
        }
    }
}
