use chrono::Utc;
use clap::Subcommand;

use super::{emit_events, open_settled};

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Show the profile ledger
    Show,
    /// Exchange gold for one shield
    BuyShield,
}

pub fn run(action: ProfileAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ProfileAction::Show => {
            let (_db, journal, _config) = open_settled()?;
            println!("{}", serde_json::to_string_pretty(&journal.profile)?);
        }
        ProfileAction::BuyShield => {
            let (db, mut journal, _config) = open_settled()?;
            let events = journal.buy_shield(Utc::now())?;
            emit_events(&db, &events)?;
            db.save_journal(&journal)?;
        }
    }
    Ok(())
}
