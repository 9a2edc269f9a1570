//! # Questlog Core Library
//!
//! This library provides the core business logic for the Questlog habit
//! tracker. It implements a CLI-first philosophy where all operations are
//! available via a standalone CLI binary, with any richer frontend being a
//! thin layer over the same core library.
//!
//! ## Architecture
//!
//! - **Settlement Engine**: A pure fold over the habit list that requires the
//!   caller to pass the current time into `tick()`; it never reads the clock
//! - **Streak Ladder**: Fibonacci checkpoint progression with asymmetric
//!   fallback on a break
//! - **Integrity Weighting**: Difficulty-weighted grading of a single day
//! - **Storage**: SQLite-based journal storage and TOML-based configuration
//!
//! ## Key Components
//!
//! - [`Journal`]: The aggregate document every command operates on
//! - [`Habit`]: A recurring obligation carrying streak state
//! - [`JournalDb`]: Journal document and event log persistence
//! - [`Config`]: Application configuration management

pub mod habit;
pub mod quest;
pub mod profile;
pub mod rewards;
pub mod integrity;
pub mod settlement;
pub mod journal;
pub mod events;
pub mod storage;
pub mod error;

pub use habit::{CompleteOutcome, Difficulty, FailOutcome, Habit, HabitStatus, Recurrence};
pub use quest::{Mission, Raid, RaidStep, StepOutcome};
pub use profile::{Profile, StatKind};
pub use rewards::{reward_for, Reward, RewardMode, SHIELD_PRICE_GOLD};
pub use integrity::{daily_weights, DayWeights, ItemKind, WeightedItem};
pub use settlement::{settle, virtual_day, SettlementOutcome};
pub use journal::Journal;
pub use events::Event;
pub use storage::{Config, EventRecord, JournalDb, LogStats};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
