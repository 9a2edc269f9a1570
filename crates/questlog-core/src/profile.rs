//! Player profile: stat block, pooled shields, XP and gold.
//!
//! Stats only ever move by small integer amounts and clamp at zero; the
//! profile never errors on underflow. Shields are pooled across all habits
//! and consumed by settlement in habit order.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rewards::Reward;

/// Character stats a habit can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Strength,
    Intellect,
    Vitality,
    Charisma,
    Creativity,
    /// Penalized on every miss regardless of tagging
    Discipline,
}

impl StatKind {
    /// All stats, in display order.
    pub const ALL: [StatKind; 6] = [
        StatKind::Strength,
        StatKind::Intellect,
        StatKind::Vitality,
        StatKind::Charisma,
        StatKind::Creativity,
        StatKind::Discipline,
    ];

    /// Human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            StatKind::Strength => "Strength",
            StatKind::Intellect => "Intellect",
            StatKind::Vitality => "Vitality",
            StatKind::Charisma => "Charisma",
            StatKind::Creativity => "Creativity",
            StatKind::Discipline => "Discipline",
        }
    }

    /// Parse a lowercase stat name as used on the wire and the CLI.
    pub fn parse(s: &str) -> Option<StatKind> {
        match s {
            "strength" => Some(StatKind::Strength),
            "intellect" => Some(StatKind::Intellect),
            "vitality" => Some(StatKind::Vitality),
            "charisma" => Some(StatKind::Charisma),
            "creativity" => Some(StatKind::Creativity),
            "discipline" => Some(StatKind::Discipline),
            _ => None,
        }
    }
}

/// The player's persistent ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Stat points per stat, clamped at 0
    #[serde(default)]
    pub stats: BTreeMap<StatKind, u32>,
    /// Pooled streak shields
    #[serde(default)]
    pub shields: u32,
    /// Lifetime experience
    #[serde(default)]
    pub xp: u64,
    /// Spendable currency
    #[serde(default)]
    pub gold: u64,
}

impl Default for Profile {
    fn default() -> Self {
        let mut stats = BTreeMap::new();
        for kind in StatKind::ALL {
            stats.insert(kind, 0);
        }
        Profile {
            stats,
            shields: 0,
            xp: 0,
            gold: 0,
        }
    }
}

impl Profile {
    /// Current points for a stat (0 when absent).
    pub fn stat(&self, kind: StatKind) -> u32 {
        self.stats.get(&kind).copied().unwrap_or(0)
    }

    /// Apply accumulated miss penalties, clamping each stat at zero.
    pub fn apply_penalties(&mut self, penalties: &BTreeMap<StatKind, u32>) {
        for (&kind, &amount) in penalties {
            let entry = self.stats.entry(kind).or_insert(0);
            *entry = entry.saturating_sub(amount);
        }
    }

    /// Credit a reward to the ledger.
    pub fn credit(&mut self, reward: Reward) {
        self.xp = self.xp.saturating_add(reward.xp);
        self.gold = self.gold.saturating_add(reward.gold);
    }

    /// Exchange gold for one pooled shield. Returns false and leaves the
    /// ledger untouched when gold is insufficient.
    pub fn buy_shield(&mut self, price: u64) -> bool {
        if self.gold < price {
            return false;
        }
        self.gold -= price;
        self.shields = self.shields.saturating_add(1);
        true
    }
}
