use chrono::{Days, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// todocal - put the timed items of your daily note on your calendar
#[derive(Debug, Parser)]
#[command(name = "todocal")]
#[command(about = "Turns the time-sensitive items of a markdown daily note into calendar events", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the config file (defaults to the platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log debug output, including the note content and raw model responses
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extract action items from a daily note and create calendar events
    Run {
        #[command(flatten)]
        date: DateArgs,

        /// Read this file instead of the daily note for the date
        #[arg(long)]
        file: Option<PathBuf>,

        /// Print the events instead of creating them
        #[arg(long)]
        dry_run: bool,

        /// Delete the day's existing events before creating new ones
        #[arg(long, conflicts_with = "dry_run")]
        replace: bool,

        /// Show a desktop notification with the outcome
        #[arg(long)]
        notify: bool,
    },

    /// Print the action items found in a markdown file as JSON
    Extract {
        /// Markdown file to read
        file: PathBuf,
    },

    /// Delete all calendar events on a day
    Clear {
        #[command(flatten)]
        date: DateArgs,
    },

    /// List the markdown notes in the daily notes directory
    Notes,

    /// View or create the configuration
    Config {
        #[command(subcommand)]
        action: ConfigActions,
    },
}

#[derive(Debug, Clone, Args)]
pub struct DateArgs {
    /// Day to process, as YYYY-MM-DD (defaults to today)
    #[arg(long, conflicts_with = "tomorrow")]
    pub date: Option<NaiveDate>,

    /// Process tomorrow's note
    #[arg(long)]
    pub tomorrow: bool,
}

impl DateArgs {
    pub fn resolve(&self) -> NaiveDate {
        self.resolve_from(Local::now().date_naive())
    }

    pub fn resolve_from(&self, today: NaiveDate) -> NaiveDate {
        if let Some(date) = self.date {
            return date;
        }
        if self.tomorrow {
            return today.checked_add_days(Days::new(1)).unwrap_or(today);
        }
        today
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigActions {
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }

    #[test]
    fn test_run_defaults_to_today() {
        let cli = Cli::try_parse_from(["todocal", "run"]).unwrap();
        let Commands::Run { date, dry_run, replace, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(date.resolve_from(today()), today());
        assert!(!dry_run && !replace);
    }

    #[test]
    fn test_run_tomorrow_crosses_year() {
        let cli = Cli::try_parse_from(["todocal", "run", "--tomorrow", "--dry-run"]).unwrap();
        let Commands::Run { date, dry_run, .. } = cli.command else {
            panic!("expected run");
        };
        assert_eq!(date.resolve_from(today()), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(dry_run);
    }

    #[test]
    fn test_explicit_date() {
        let cli = Cli::try_parse_from(["todocal", "-v", "clear", "--date", "2024-02-29"]).unwrap();
        assert!(cli.verbose);
        let Commands::Clear { date } = cli.command else {
            panic!("expected clear");
        };
        assert_eq!(date.resolve_from(today()), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Cli::try_parse_from(["todocal", "run", "--date", "2024-01-01", "--tomorrow"]).is_err());
        assert!(Cli::try_parse_from(["todocal", "run", "--dry-run", "--replace"]).is_err());
        assert!(Cli::try_parse_from(["todocal", "run", "--date", "yesterday"]).is_err());
    }
}
