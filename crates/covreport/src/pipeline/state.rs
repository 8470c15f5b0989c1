//! Pipeline states and the outcome of a run.

use crate::analysis::Counters;
use crate::result::{ErrorKind, ReportError};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Stage of a report run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineState {
    /// Not started
    Idle,
    /// Waiting for the execution data and the agent flush
    Waiting,
    /// Reading execution data
    Loading,
    /// Correlating unit descriptors with execution data
    Analyzing,
    /// Building the bundle
    Aggregating,
    /// Writing reports
    Emitting,
    /// Finished successfully
    Done,
    /// Finished with an error
    Failed,
}

impl PipelineState {
    /// Lower-case name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Waiting => "waiting",
            Self::Loading => "loading",
            Self::Analyzing => "analyzing",
            Self::Aggregating => "aggregating",
            Self::Emitting => "emitting",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition can follow
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Whether `next` may follow this state
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Waiting)
                | (Self::Waiting, Self::Loading)
                | (Self::Loading, Self::Analyzing)
                | (Self::Analyzing, Self::Aggregating)
                | (Self::Aggregating, Self::Emitting)
                | (Self::Emitting, Self::Done)
                | (
                    Self::Waiting
                        | Self::Loading
                        | Self::Analyzing
                        | Self::Aggregating
                        | Self::Emitting,
                    Self::Failed
                )
        )
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one report run
///
/// A run never returns an error to its caller; failures are carried here.
#[derive(Debug)]
pub struct ReportOutcome {
    /// Final state, `Done` or `Failed`
    pub state: PipelineState,
    /// Stage in which the run failed
    pub failed_stage: Option<PipelineState>,
    /// Cause of the failure
    pub error: Option<ReportError>,
    /// Every state the run passed through, starting with `Idle`
    pub transitions: Vec<PipelineState>,
    /// Output directory
    pub report_dir: PathBuf,
    /// Whether the execution data file appeared within the wait budget
    pub data_available: bool,
    /// Whether the flush-complete signal timed out
    pub quiescence_warning: bool,
    /// Totals of the bundle, once aggregated
    pub totals: Option<Counters>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl ReportOutcome {
    /// Whether every report was written
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Done
    }

    /// Taxonomy of the failure, if any
    #[must_use]
    pub fn error_kind(&self) -> Option<ErrorKind> {
        self.error.as_ref().map(ReportError::kind)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_transitions() {
        let path = [
            PipelineState::Idle,
            PipelineState::Waiting,
            PipelineState::Loading,
            PipelineState::Analyzing,
            PipelineState::Aggregating,
            PipelineState::Emitting,
            PipelineState::Done,
        ];
        assert!(path.windows(2).all(|w| w[0].can_transition_to(w[1])));
    }

    #[test]
    fn test_failed_reachable_from_non_idle_only() {
        assert!(!PipelineState::Idle.can_transition_to(PipelineState::Failed));
        assert!(PipelineState::Waiting.can_transition_to(PipelineState::Failed));
        assert!(PipelineState::Emitting.can_transition_to(PipelineState::Failed));
        assert!(!PipelineState::Done.can_transition_to(PipelineState::Failed));
    }

    #[test]
    fn test_no_skipping_stages() {
        assert!(!PipelineState::Waiting.can_transition_to(PipelineState::Analyzing));
        assert!(!PipelineState::Loading.can_transition_to(PipelineState::Done));
    }

    #[test]
    fn test_terminal_and_display() {
        assert!(PipelineState::Done.is_terminal());
        assert!(PipelineState::Failed.is_terminal());
        assert!(!PipelineState::Emitting.is_terminal());
        assert_eq!(PipelineState::Aggregating.to_string(), "aggregating");
    }
}
