use chrono::Utc;
use clap::Subcommand;
use questlog_core::{Habit, Recurrence, StatKind};

use super::{emit_events, open_settled, parse_difficulty};

#[derive(Subcommand)]
pub enum HabitAction {
    /// Add a new habit
    Add {
        /// Habit title
        title: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Due weekdays, comma-separated (0 = Sunday .. 6 = Saturday)
        #[arg(long)]
        days: Option<String>,
        /// Due every N days, counted from creation
        #[arg(long)]
        every: Option<u32>,
        /// Custom cycle of '1'/'0' days applied from creation, e.g. "1101"
        #[arg(long)]
        bits: Option<String>,
        /// Difficulty: easy, normal or hard
        #[arg(long, default_value = "normal")]
        difficulty: String,
        /// Stat penalized on a miss (repeatable)
        #[arg(long)]
        stat: Vec<String>,
        /// Repetitions required per day
        #[arg(long, default_value = "1")]
        target: u32,
        /// Lifetime completion cap; the habit archives itself on reaching it
        #[arg(long)]
        reps: Option<u32>,
    },
    /// List habits
    List {
        /// Include archived habits
        #[arg(long)]
        archived: bool,
    },
    /// Log one repetition for today
    Done {
        /// Habit ID
        id: String,
    },
    /// Explicitly abandon the habit for today
    Fail {
        /// Habit ID
        id: String,
    },
    /// Freeze the habit; settlement will skip it
    Archive {
        /// Habit ID
        id: String,
    },
    /// Remove the habit permanently
    Rm {
        /// Habit ID
        id: String,
    },
    /// Show the streak's position on the ladder
    Streak {
        /// Habit ID
        id: String,
    },
}

pub fn run(action: HabitAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        HabitAction::Add {
            title,
            description,
            days,
            every,
            bits,
            difficulty,
            stat,
            target,
            reps,
        } => {
            let (db, mut journal, _config) = open_settled()?;

            let recurrence = if let Some(interval) = every {
                Recurrence::EveryNDays { interval }
            } else if let Some(days) = days {
                let days = days
                    .split(',')
                    .map(|d| d.trim().parse::<u8>())
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(|e| format!("invalid weekday list: {e}"))?;
                Recurrence::Weekdays { days }
            } else if let Some(bits) = bits {
                Recurrence::Pattern { bits }
            } else {
                Recurrence::Daily
            };

            let mut stats = Vec::new();
            for name in &stat {
                let kind =
                    StatKind::parse(name).ok_or_else(|| format!("unknown stat: {name}"))?;
                stats.push(kind);
            }

            let mut habit = Habit::new(title, Utc::now())
                .with_recurrence(recurrence)
                .with_difficulty(parse_difficulty(&difficulty))
                .with_stats(stats)
                .with_daily_target(target);
            if let Some(description) = description {
                habit = habit.with_description(description);
            }
            if let Some(total) = reps {
                habit = habit.with_total_repetitions(total);
            }

            let added = journal.add_habit(habit);
            println!("{}", serde_json::to_string_pretty(added)?);
            db.save_journal(&journal)?;
        }
        HabitAction::List { archived } => {
            let (_db, journal, _config) = open_settled()?;
            let habits: Vec<&Habit> = journal
                .habits
                .iter()
                .filter(|h| archived || !h.is_archived)
                .collect();
            println!("{}", serde_json::to_string_pretty(&habits)?);
        }
        HabitAction::Done { id } => {
            let (db, mut journal, config) = open_settled()?;
            let events = journal.complete_habit(&id, Utc::now(), &config)?;
            emit_events(&db, &events)?;
            db.save_journal(&journal)?;
        }
        HabitAction::Fail { id } => {
            let (db, mut journal, config) = open_settled()?;
            let events = journal.fail_habit(&id, Utc::now(), &config)?;
            emit_events(&db, &events)?;
            db.save_journal(&journal)?;
        }
        HabitAction::Archive { id } => {
            let (db, mut journal, _config) = open_settled()?;
            journal.archive_habit(&id)?;
            println!("archived {id}");
            db.save_journal(&journal)?;
        }
        HabitAction::Rm { id } => {
            let (db, mut journal, _config) = open_settled()?;
            let removed = journal.remove_habit(&id)?;
            println!("removed {} ({})", removed.id, removed.title);
            db.save_journal(&journal)?;
        }
        HabitAction::Streak { id } => {
            let (_db, journal, _config) = open_settled()?;
            let habit = journal.habit(&id)?;
            println!("{}", serde_json::to_string_pretty(&habit.ladder())?);
        }
    }
    Ok(())
}
