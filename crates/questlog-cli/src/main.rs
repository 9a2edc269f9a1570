use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "questlog-cli", version, about = "Questlog CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Habit management
    Habit {
        #[command(subcommand)]
        action: commands::habit::HabitAction,
    },
    /// One-off mission management
    Mission {
        #[command(subcommand)]
        action: commands::mission::MissionAction,
    },
    /// Multi-step raid management
    Raid {
        #[command(subcommand)]
        action: commands::raid::RaidAction,
    },
    /// Settle the day if a boundary has passed
    Tick {
        /// Settle as if the current time were this RFC3339 timestamp
        #[arg(long)]
        now: Option<String>,
    },
    /// Weight distribution and grade for one day
    Day {
        /// Date (YYYY-MM-DD); default: the current virtual day
        #[arg(long)]
        date: Option<String>,
    },
    /// Profile ledger
    Profile {
        #[command(subcommand)]
        action: commands::profile::ProfileAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Recent events from the log
    Log {
        /// Maximum number of events to print
        #[arg(long, default_value = "20")]
        limit: u32,
    },
    /// Event log statistics
    Stats {
        #[command(subcommand)]
        action: commands::stats::StatsAction,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: clap_complete::Shell,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Habit { action } => commands::habit::run(action),
        Commands::Mission { action } => commands::mission::run(action),
        Commands::Raid { action } => commands::raid::run(action),
        Commands::Tick { now } => commands::tick::run(now),
        Commands::Day { date } => commands::day::run(date),
        Commands::Profile { action } => commands::profile::run(action),
        Commands::Config { action } => commands::config::run(action),
        Commands::Log { limit } => commands::log::run(limit),
        Commands::Stats { action } => commands::stats::run(action),
        Commands::Completions { shell } => commands::completions::run(shell),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
