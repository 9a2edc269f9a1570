use clap::Subcommand;
use questlog_core::JournalDb;

#[derive(Subcommand)]
pub enum StatsAction {
    /// Event counts for today
    Today,
    /// Event counts over the whole log
    All,
}

pub fn run(action: StatsAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = JournalDb::open()?;
    let stats = match action {
        StatsAction::Today => db.stats_today()?,
        StatsAction::All => db.stats_all()?,
    };
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}
