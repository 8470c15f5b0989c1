//! covreport CLI library
//!
//! Command-line front end for the covreport report generator.

#![warn(missing_docs)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]

mod commands;
mod config;
mod error;
pub mod handlers;

pub use commands::{Cli, ColorArg, Commands, ExecinfoArgs, MergeArgs, ReportArgs};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
