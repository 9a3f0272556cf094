//! CLI argument definitions for `mch-unify`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use mch_cli::config::{Mode, RunOverrides};
use mch_ingest::SurveyDate;

#[derive(Parser)]
#[command(
    name = "mch-unify",
    version,
    about = "Consolidate maternal-health surveys and device measurements into unified patient records",
    long_about = "Consolidate maternal-health surveys and device measurements.\n\n\
                  Stages survey exports into their own collections, then assembles one\n\
                  unified record per recruited and historical patient, reconciling\n\
                  gestational age at entry and exit from the measurement history."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Store profile to write to (test keeps everything in memory).
    #[arg(long, value_enum)]
    pub mode: Mode,

    /// Survey export date as yymmdd (default: today).
    #[arg(long, value_name = "YYMMDD", global = true, conflicts_with = "latest")]
    pub date: Option<SurveyDate>,

    /// Use the most recent date that has both survey exports.
    #[arg(long, global = true)]
    pub latest: bool,

    /// Configuration file (default: ./mch.toml when present).
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the survey and measurement exports.
    #[arg(long = "datasets-dir", value_name = "DIR", global = true)]
    pub datasets_dir: Option<PathBuf>,

    /// Store directory (overrides the profile's store_dir).
    #[arg(long = "store-dir", value_name = "DIR", global = true)]
    pub store_dir: Option<PathBuf>,

    /// Days in a full-term pregnancy used to re-anchor entry measurements.
    #[arg(long = "full-term-days", value_name = "DAYS", global = true)]
    pub full_term_days: Option<i64>,

    /// Log contact identifiers and names instead of redacting them.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            datasets_dir: self.datasets_dir.clone(),
            store_dir: self.store_dir.clone(),
            date: self.date,
            latest: self.latest,
            full_term_days: self.full_term_days,
        }
    }
}

#[derive(Subcommand, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Stage surveys, then build recruited and historical records.
    Run,

    /// Map the survey exports into their staging collections.
    Surveys,

    /// Build unified records for patients recruited through the surveys.
    Recruited,

    /// Build unified records for historical patients.
    Historical,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_mode_date_and_subcommand() {
        let cli = Cli::try_parse_from(["mch-unify", "--mode", "test", "--date", "240315", "run"])
            .expect("valid arguments");
        assert_eq!(cli.mode, Mode::Test);
        assert_eq!(cli.date.map(|d| d.to_string()).as_deref(), Some("240315"));
        assert!(cli.command == Command::Run);
    }

    #[test]
    fn rejects_malformed_dates() {
        let base = ["mch-unify", "--mode", "test"];
        let parse = |extra: &[&str]| Cli::try_parse_from(base.iter().chain(extra));
        assert!(parse(&["--date", "240315", "surveys"]).is_ok());
        assert!(parse(&["--date", "2024-03-15", "surveys"]).is_err());
        assert!(parse(&["--date", "240315", "--latest", "surveys"]).is_err());
    }

    #[test]
    fn mode_is_required() {
        assert!(Cli::try_parse_from(["mch-unify", "run"]).is_err());
    }
}
