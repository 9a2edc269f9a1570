use chrono::{NaiveDate, Utc};
use questlog_core::{daily_weights, virtual_day};

use super::open_settled;

pub fn run(date: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let (_db, journal, config) = open_settled()?;

    let date = match date {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|e| format!("invalid --date: {e}"))?,
        None => virtual_day(Utc::now(), config.engine.day_start_hour),
    };

    let weights = daily_weights(date, &journal.habits, &journal.missions, &journal.raids);
    let grade = weights.grade();

    let mut value = serde_json::to_value(&weights)?;
    if let Some(obj) = value.as_object_mut() {
        obj.insert("grade".into(), grade.into());
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
