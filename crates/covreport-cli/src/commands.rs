//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// covreport: coverage reports from execution data
#[derive(Parser, Debug)]
#[command(name = "covreport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-error output)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate XML, CSV and HTML coverage reports
    Report(ReportArgs),

    /// Print the content of execution data files
    Execinfo(ExecinfoArgs),

    /// Merge execution data files into one
    Merge(MergeArgs),
}

/// Arguments for the report command
#[derive(Parser, Debug)]
pub struct ReportArgs {
    /// Execution data file
    #[arg(short, long, default_value = "target/jacoco.exec")]
    pub exec_file: PathBuf,

    /// Directory (or single file) of unit descriptors; repeatable, analyzed in order
    #[arg(short, long = "classes", value_name = "DIR")]
    pub class_dirs: Vec<PathBuf>,

    /// Source directory for annotated HTML; repeatable, first match wins
    #[arg(short, long = "sources", value_name = "DIR")]
    pub source_dirs: Vec<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "target/site/jacoco")]
    pub dest: PathBuf,

    /// Artifact identifier, used as report title unless --title is given
    #[arg(long, default_value = "coverage")]
    pub artifact_id: String,

    /// YAML file with render options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Report title
    #[arg(long)]
    pub title: Option<String>,

    /// Footer text of HTML pages
    #[arg(long)]
    pub footer: Option<String>,

    /// Encoding of report files
    #[arg(long, value_name = "LABEL")]
    pub output_encoding: Option<String>,

    /// Encoding of source files
    #[arg(long, value_name = "LABEL")]
    pub source_encoding: Option<String>,

    /// Tab width for annotated source
    #[arg(long)]
    pub tab_width: Option<usize>,

    /// Locale for numbers in the HTML report, e.g. de_DE (default: from environment)
    #[arg(long)]
    pub locale: Option<String>,

    /// How long to wait for the execution data file, in milliseconds
    #[arg(long, default_value = "10000", value_name = "MS")]
    pub wait_timeout: u64,

    /// Polling interval of both waits, in milliseconds
    #[arg(long, default_value = "100", value_name = "MS")]
    pub poll_interval: u64,

    /// Marker file the agent writes once all data is flushed
    #[arg(long, value_name = "FILE")]
    pub flush_sentinel: Option<PathBuf>,

    /// How long to wait for the flush marker, in milliseconds
    #[arg(long, default_value = "60000", value_name = "MS")]
    pub flush_timeout: u64,

    /// Exit with a failure code when report generation fails
    #[arg(long)]
    pub fail_on_error: bool,
}

/// Arguments for the execinfo command
#[derive(Parser, Debug)]
pub struct ExecinfoArgs {
    /// Execution data files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Arguments for the merge command
#[derive(Parser, Debug)]
pub struct MergeArgs {
    /// Execution data files to merge
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Merged output file
    #[arg(short, long)]
    pub dest: PathBuf,
}

/// Color argument
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_report_defaults() {
        let cli = Cli::parse_from(["covreport", "report"]);
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.exec_file, PathBuf::from("target/jacoco.exec"));
                assert_eq!(args.dest, PathBuf::from("target/site/jacoco"));
                assert_eq!(args.wait_timeout, 10_000);
                assert_eq!(args.poll_interval, 100);
                assert_eq!(args.flush_timeout, 60_000);
                assert!(args.class_dirs.is_empty());
                assert!(!args.fail_on_error);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_parse_repeated_dirs_keep_order() {
        let cli = Cli::parse_from([
            "covreport", "report", "-c", "b", "--classes", "a", "-s", "src", "--fail-on-error",
        ]);
        match cli.command {
            Commands::Report(args) => {
                assert_eq!(args.class_dirs, vec![PathBuf::from("b"), PathBuf::from("a")]);
                assert_eq!(args.source_dirs, vec![PathBuf::from("src")]);
                assert!(args.fail_on_error);
            }
            _ => panic!("expected report command"),
        }
    }

    #[test]
    fn test_parse_merge() {
        let cli = Cli::parse_from(["covreport", "merge", "a.exec", "b.exec", "--dest", "all.exec"]);
        match cli.command {
            Commands::Merge(args) => {
                assert_eq!(args.files.len(), 2);
                assert_eq!(args.dest, PathBuf::from("all.exec"));
            }
            _ => panic!("expected merge command"),
        }
    }

    #[test]
    fn test_execinfo_requires_files() {
        assert!(Cli::try_parse_from(["covreport", "execinfo"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::parse_from(["covreport", "-vv", "--color", "never", "execinfo", "x.exec"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.color, ColorArg::Never));
    }
}
