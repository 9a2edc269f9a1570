use questlog_core::JournalDb;

pub fn run(limit: u32) -> Result<(), Box<dyn std::error::Error>> {
    let db = JournalDb::open()?;
    let events = db.recent_events(limit)?;
    println!("{}", serde_json::to_string_pretty(&events)?);
    Ok(())
}
