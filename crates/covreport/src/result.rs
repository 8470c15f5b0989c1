//! Result and error types for covreport.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for covreport operations
pub type ReportResult<T> = Result<T, ReportError>;

/// Coarse error taxonomy used for outcome reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Execution data never appeared within the wait budget
    DataUnavailable,
    /// Execution data present but unreadable or corrupt
    DataLoad,
    /// A class directory is missing or a unit descriptor is invalid
    Analysis,
    /// Writing an output file failed
    Emission,
    /// The flush-complete signal never arrived
    QuiescenceTimeout,
    /// The run was cancelled while waiting
    Cancelled,
    /// Invalid configuration
    Config,
}

/// Errors that can occur while generating coverage reports
#[derive(Debug, Error)]
pub enum ReportError {
    /// Execution data file did not appear in time
    #[error("Execution data {path} did not appear within {waited_ms}ms")]
    DataUnavailable {
        /// Expected location of the artifact
        path: PathBuf,
        /// How long the waiter polled
        waited_ms: u64,
    },

    /// Execution data could not be loaded
    #[error("Failed to load execution data from {path}: {message}")]
    DataLoad {
        /// Artifact that failed to load
        path: PathBuf,
        /// Error message
        message: String,
        /// Underlying I/O error, if any
        #[source]
        source: Option<std::io::Error>,
    },

    /// Analysis of compiled units failed
    #[error("Analysis of {path} failed: {message}")]
    Analysis {
        /// Directory or descriptor being analyzed
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Writing a report failed
    #[error("Failed to write report {path}")]
    Emission {
        /// Output file or directory
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Unknown text encoding label
    #[error("Unsupported encoding: {label}")]
    UnsupportedEncoding {
        /// Label as configured
        label: String,
    },

    /// The instrumentation agent never signalled flush completion
    #[error("No flush-complete signal from {signal} within {waited_ms}ms")]
    QuiescenceTimeout {
        /// Description of the signal being awaited
        signal: String,
        /// How long the waiter polled
        waited_ms: u64,
    },

    /// Cancelled while waiting
    #[error("Report generation cancelled")]
    Cancelled,

    /// Configuration error
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl ReportError {
    /// Create a data load error without an underlying I/O cause
    #[must_use]
    pub fn data_load(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::DataLoad {
            path: path.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create an analysis error
    #[must_use]
    pub fn analysis(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Analysis {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create an emission error
    #[must_use]
    pub fn emission(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Emission {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Map this error onto the coarse taxonomy
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::DataUnavailable { .. } => ErrorKind::DataUnavailable,
            Self::DataLoad { .. } => ErrorKind::DataLoad,
            Self::Analysis { .. } | Self::Json(_) => ErrorKind::Analysis,
            Self::Emission { .. } | Self::UnsupportedEncoding { .. } | Self::Io(_) => {
                ErrorKind::Emission
            }
            Self::QuiescenceTimeout { .. } => ErrorKind::QuiescenceTimeout,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Config { .. } | Self::Yaml(_) => ErrorKind::Config,
        }
    }

    /// Render the error with its full chain of causes, one per line
    #[must_use]
    pub fn diagnostic(&self) -> String {
        let mut out = self.to_string();
        let mut source = std::error::Error::source(self);
        while let Some(cause) = source {
            out.push_str("\n  caused by: ");
            out.push_str(&cause.to_string());
            source = cause.source();
        }
        out
    }
}
