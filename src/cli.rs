// src/cli.rs
use chrono::{Duration, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use marathon_coach_lib::local_today;

#[derive(Parser, Debug)]
#[command(author, version, about = "A CLI tool to follow a marathon training plan", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
    /// Print tables as CSV instead
    #[arg(long, global = true)]
    pub export_csv: bool,
}

// Custom parser for date strings and shorthands
pub fn parse_date_shorthand(s: &str) -> Result<NaiveDate, String> {
    let today = local_today();
    match s.to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ => ["%Y-%m-%d", "%d.%m.%Y", "%Y/%m/%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
            .ok_or_else(|| {
                format!(
                    "Invalid date format: '{s}'. Use 'today', 'yesterday', 'tomorrow', YYYY-MM-DD, DD.MM.YYYY, or YYYY/MM/DD."
                )
            }),
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a weekly schedule from a comma-separated file
    Import {
        /// File with a `Week,Mon,Tue,...,Sun` header and one row per week
        file: PathBuf,
        /// First Monday of the plan (defaults to next Monday)
        #[arg(short, long, value_parser = parse_date_shorthand)]
        start: Option<NaiveDate>,
    },
    /// Show today's planned workout
    Today,
    /// Show the full plan grid
    Plan,
    /// Log (or update) the workout for a day.
    /// When updating, omitted fields keep their logged values.
    Log {
        /// Day of the workout (defaults to today)
        #[arg(short, long, value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
        /// Distance covered, in the configured units
        #[arg(long)]
        distance: Option<String>,
        /// Total time, HH:MM:SS
        #[arg(short, long)]
        time: Option<String>,
        /// Average pace, e.g. "5:15 /km"
        #[arg(short, long)]
        pace: Option<String>,
        /// Average heart rate in bpm (empty to clear)
        #[arg(long)]
        heart_rate: Option<String>,
        /// Link to the activity (Strava, Garmin, ...)
        #[arg(short, long)]
        link: Option<String>,
    },
    /// Show the logged workout for a day
    Show {
        #[arg(value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
    },
    /// Delete the logged workout for a day
    Delete {
        #[arg(value_parser = parse_date_shorthand)]
        date: Option<NaiveDate>,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// List every logged workout
    History,
    /// Set default units (Metric/Imperial)
    SetUnits {
        #[arg(value_enum)]
        units: UnitsCli,
    },
    /// Set the table header color (e.g. Green, DarkCyan)
    SetHeaderColor { color: String },
    /// Show the path to the database file
    DbPath,
    /// Show the path to the config file
    ConfigPath,
    GenerateCompletion {
        /// The shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// Function to parse CLI arguments
pub fn parse_args() -> Cli {
    Cli::parse()
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnitsCli {
    Metric,
    Imperial,
}
