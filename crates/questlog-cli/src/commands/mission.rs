use chrono::{DateTime, Utc};
use clap::Subcommand;
use questlog_core::Mission;

use super::{emit_events, open_settled, parse_difficulty};

#[derive(Subcommand)]
pub enum MissionAction {
    /// Add a new one-off mission
    Add {
        /// Mission title
        title: String,
        /// Optional description
        #[arg(long)]
        description: Option<String>,
        /// Difficulty: easy, normal or hard
        #[arg(long, default_value = "normal")]
        difficulty: String,
        /// Deadline as an RFC3339 timestamp
        #[arg(long)]
        due: Option<String>,
    },
    /// List missions
    List {
        /// Include completed and archived missions
        #[arg(long)]
        all: bool,
    },
    /// Mark a mission completed
    Done {
        /// Mission ID
        id: String,
    },
}

pub fn run(action: MissionAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        MissionAction::Add {
            title,
            description,
            difficulty,
            due,
        } => {
            let (db, mut journal, _config) = open_settled()?;

            let mut mission =
                Mission::new(title, Utc::now()).with_difficulty(parse_difficulty(&difficulty));
            mission.description = description;
            if let Some(due) = due {
                let due_at = DateTime::parse_from_rfc3339(&due)
                    .map_err(|e| format!("invalid --due timestamp: {e}"))?
                    .with_timezone(&Utc);
                mission = mission.with_due(due_at);
            }

            let added = journal.add_mission(mission);
            println!("{}", serde_json::to_string_pretty(added)?);
            db.save_journal(&journal)?;
        }
        MissionAction::List { all } => {
            let (_db, journal, _config) = open_settled()?;
            let missions: Vec<&Mission> = journal
                .missions
                .iter()
                .filter(|m| all || (!m.completed && !m.is_archived))
                .collect();
            println!("{}", serde_json::to_string_pretty(&missions)?);
        }
        MissionAction::Done { id } => {
            let (db, mut journal, config) = open_settled()?;
            let events = journal.complete_mission(&id, Utc::now(), &config)?;
            emit_events(&db, &events)?;
            db.save_journal(&journal)?;
        }
    }
    Ok(())
}
