use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgGroup, Parser};

use crate::app::{Matchup, OutputPolicy, RunRequest};
use crate::config::AppConfig;

/// Exit status for bad arguments or an unreadable config.
pub const EXIT_USAGE: i32 = 1;

/// Exit status for a command line clap rejected: `--help` and `--version` are
/// successes, anything else is a usage error.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    if err.use_stderr() {
        EXIT_USAGE
    } else {
        0
    }
}

/// Update a game day thread template with current NHL stats.
#[derive(Parser, Debug)]
#[command(name = "nhl-gdt", version, about, long_about = None)]
#[command(group(ArgGroup::new("destination").required(true).args(["output", "in_place", "stdout"])))]
pub struct Args {
    /// Opponent (e.g. "Devils", "NJD"), or the team itself with --single
    pub team: String,

    /// HTML template to read
    #[arg(short, long)]
    pub file: PathBuf,

    /// Write the result here, leaving the template untouched
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Overwrite the template with the result
    #[arg(long)]
    pub in_place: bool,

    /// Print the result instead of writing a file
    #[arg(long)]
    pub stdout: bool,

    /// First team of the thread (defaults to the configured home team)
    #[arg(long, conflicts_with = "single")]
    pub home: Option<String>,

    /// Template covers a single team
    #[arg(long)]
    pub single: bool,

    /// Config file (defaults to the user config dir)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Search the schedule from this date instead of today (YYYY-MM-DD)
    #[arg(long)]
    pub date: Option<NaiveDate>,

    /// Write the effective config to the user config dir
    #[arg(long)]
    pub save_config: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn output_policy(&self) -> OutputPolicy {
        match (&self.output, self.in_place) {
            (Some(path), _) => OutputPolicy::File(path.clone()),
            (None, true) => OutputPolicy::InPlace,
            (None, false) => OutputPolicy::Stdout,
        }
    }

    /// `--single` updates one team; otherwise the positional team is the opponent of `--home`
    /// (or the configured home team, or the positional team alone when neither is set).
    pub fn matchup(&self, config: &AppConfig) -> Matchup {
        if self.single {
            return Matchup::Single(self.team.clone());
        }
        match self.home.clone().or_else(|| config.home_team.clone()) {
            Some(home) => Matchup::Game {
                home,
                opponent: self.team.clone(),
            },
            None => Matchup::Single(self.team.clone()),
        }
    }

    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn request(&self, config: &AppConfig, today: NaiveDate) -> RunRequest {
        RunRequest {
            matchup: self.matchup(config),
            template: self.file.clone(),
            output: self.output_policy(),
            today: self.date.unwrap_or(today),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("nhl-gdt").chain(args.iter().copied()))
    }

    #[test]
    fn test_destination_is_required() {
        assert!(parse(&["Devils", "-f", "gdt.html"]).is_err());
    }

    #[test]
    fn test_usage_errors_exit_with_usage_code() {
        let missing = parse(&["Devils", "-f", "gdt.html"]).unwrap_err();
        assert_eq!(usage_exit_code(&missing), EXIT_USAGE);

        let unknown_flag = parse(&["Devils", "-f", "gdt.html", "--stdout", "--bogus"]).unwrap_err();
        assert_eq!(usage_exit_code(&unknown_flag), EXIT_USAGE);

        // Distinct from a team that cannot be resolved
        assert_ne!(EXIT_USAGE, crate::errors::Stage::TeamResolution.exit_code());

        let help = parse(&["--help"]).unwrap_err();
        assert_eq!(usage_exit_code(&help), 0);
        let version = parse(&["--version"]).unwrap_err();
        assert_eq!(usage_exit_code(&version), 0);
    }

    #[test]
    fn test_destinations_are_exclusive() {
        assert!(parse(&["Devils", "-f", "gdt.html", "--in-place", "--stdout"]).is_err());
        assert!(parse(&["Devils", "-f", "gdt.html", "-o", "out.html", "--in-place"]).is_err());
    }

    #[test]
    fn test_output_policy() {
        let a = parse(&["Devils", "-f", "gdt.html", "-o", "out.html"]).unwrap();
        assert_eq!(a.output_policy(), OutputPolicy::File(PathBuf::from("out.html")));
        let b = parse(&["Devils", "-f", "gdt.html", "--in-place"]).unwrap();
        assert_eq!(b.output_policy(), OutputPolicy::InPlace);
        let c = parse(&["Devils", "-f", "gdt.html", "--stdout"]).unwrap();
        assert_eq!(c.output_policy(), OutputPolicy::Stdout);
    }

    #[test]
    fn test_matchup() {
        let config = AppConfig::default();
        let a = parse(&["Devils", "-f", "gdt.html", "--stdout"]).unwrap();
        assert_eq!(
            a.matchup(&config),
            Matchup::Game { home: "NYR".to_string(), opponent: "Devils".to_string() }
        );

        let b = parse(&["Devils", "-f", "gdt.html", "--stdout", "--home", "BOS"]).unwrap();
        assert_eq!(
            b.matchup(&config),
            Matchup::Game { home: "BOS".to_string(), opponent: "Devils".to_string() }
        );

        let c = parse(&["Devils", "-f", "gdt.html", "--stdout", "--single"]).unwrap();
        assert_eq!(c.matchup(&config), Matchup::Single("Devils".to_string()));

        let no_home = AppConfig { home_team: None, ..AppConfig::default() };
        assert_eq!(a.matchup(&no_home), Matchup::Single("Devils".to_string()));
    }

    #[test]
    fn test_single_conflicts_with_home() {
        assert!(parse(&["Devils", "-f", "g.html", "--stdout", "--single", "--home", "NYR"]).is_err());
    }

    #[test]
    fn test_request_date_override() {
        let a = parse(&["Devils", "-f", "g.html", "--stdout", "--date", "2025-11-01", "-vv"]).unwrap();
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        let req = a.request(&AppConfig::default(), today);
        assert_eq!(req.today, NaiveDate::from_ymd_opt(2025, 11, 1).unwrap());
        assert_eq!(a.log_level(), "trace");
    }
}
