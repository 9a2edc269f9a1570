//! Flat reward table.
//!
//! The economy is deliberately a lookup, not a formula: completion handlers
//! consume `reward_for` as a black box, so tuning the numbers never touches
//! engine logic.

use serde::{Deserialize, Serialize};

use crate::habit::Difficulty;

/// Gold cost of one pooled streak shield.
pub const SHIELD_PRICE_GOLD: u64 = 50;

/// XP and gold granted for one completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reward {
    pub xp: u64,
    pub gold: u64,
}

/// Global reward scaling selected in the config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RewardMode {
    /// Base table as-is
    Standard,
    /// 150% payouts for players running without shields
    Ironman,
}

impl RewardMode {
    fn multiplier_percent(&self) -> u64 {
        match self {
            RewardMode::Standard => 100,
            RewardMode::Ironman => 150,
        }
    }
}

impl Default for RewardMode {
    fn default() -> Self {
        RewardMode::Standard
    }
}

/// Reward for completing one obligation at `difficulty` under `mode`.
pub fn reward_for(difficulty: Difficulty, mode: RewardMode) -> Reward {
    let (xp, gold) = match difficulty {
        Difficulty::Easy => (10, 5),
        Difficulty::Normal => (25, 10),
        Difficulty::Hard => (60, 25),
    };
    let pct = mode.multiplier_percent();
    Reward {
        xp: xp * pct / 100,
        gold: gold * pct / 100,
    }
}
