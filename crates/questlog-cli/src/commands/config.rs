use clap::Subcommand;
use questlog_core::{storage, Config};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value by dot-separated key
    Get {
        /// Key, e.g. "engine.day_start_hour"
        key: String,
    },
    /// Set a config value by dot-separated key
    Set {
        /// Key, e.g. "rewards.mode"
        key: String,
        /// New value
        value: String,
    },
    /// Show the whole configuration
    List,
    /// Print the config file path
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown config key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {value}");
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Path => {
            println!("{}", storage::data_dir()?.join("config.toml").display());
        }
    }
    Ok(())
}
