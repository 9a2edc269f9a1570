use chrono::{NaiveDate, Utc};
use clap::Subcommand;
use questlog_core::{Raid, RaidStep};

use super::{emit_events, open_settled, parse_difficulty};

#[derive(Subcommand)]
pub enum RaidAction {
    /// Add a new raid
    Add {
        /// Raid title
        title: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Difficulty: easy, normal or hard
        #[arg(long, default_value = "normal")]
        difficulty: String,
    },
    /// Add a step to an existing raid
    AddStep {
        /// Raid ID
        raid_id: String,
        /// Step title
        title: String,
        /// Date the step counts toward (YYYY-MM-DD)
        #[arg(long)]
        on: Option<String>,
    },
    /// Mark one step done
    StepDone {
        /// Raid ID
        raid_id: String,
        /// Step ID
        step_id: String,
    },
    /// List raids
    List,
}

pub fn run(action: RaidAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        RaidAction::Add {
            title,
            description,
            difficulty,
        } => {
            let (db, mut journal, _config) = open_settled()?;

            let mut raid =
                Raid::new(title, Utc::now()).with_difficulty(parse_difficulty(&difficulty));
            raid.description = description;

            let added = journal.add_raid(raid);
            println!("{}", serde_json::to_string_pretty(added)?);
            db.save_journal(&journal)?;
        }
        RaidAction::AddStep { raid_id, title, on } => {
            let (db, mut journal, _config) = open_settled()?;

            let mut step = RaidStep::new(title);
            if let Some(on) = on {
                let date = NaiveDate::parse_from_str(&on, "%Y-%m-%d")
                    .map_err(|e| format!("invalid --on date: {e}"))?;
                step = step.scheduled_for(date);
            }

            let step_id = journal.add_raid_step(&raid_id, step)?;
            println!("added {step_id}");
            db.save_journal(&journal)?;
        }
        RaidAction::StepDone { raid_id, step_id } => {
            let (db, mut journal, config) = open_settled()?;
            let events = journal.complete_raid_step(&raid_id, &step_id, Utc::now(), &config)?;
            emit_events(&db, &events)?;
            db.save_journal(&journal)?;
        }
        RaidAction::List => {
            let (_db, journal, _config) = open_settled()?;
            println!("{}", serde_json::to_string_pretty(&journal.raids)?);
        }
    }
    Ok(())
}
