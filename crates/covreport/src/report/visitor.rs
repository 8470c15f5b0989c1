//! Report visitor protocol and fan-out.

use super::locator::SourceFileLocator;
use crate::analysis::BundleCoverage;
use crate::exec::{ExecutionData, SessionInfo};
use crate::result::ReportResult;

/// Receiver of one report pass
///
/// Calls arrive in a fixed order: `visit_info`, then `visit_bundle`, then
/// `visit_end`. Implementations may buffer state between calls.
pub trait ReportVisitor {
    /// Session infos and the executed classes of the run
    fn visit_info(
        &mut self,
        sessions: &[SessionInfo],
        executions: &[&ExecutionData],
    ) -> ReportResult<()>;

    /// The aggregated bundle with access to its source files
    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        locator: &dyn SourceFileLocator,
    ) -> ReportResult<()>;

    /// End of the pass
    fn visit_end(&mut self) -> ReportResult<()>;
}

/// Forwards every call to each child in order
///
/// The first child error is returned as is and later children do not see
/// that call.
#[derive(Default)]
pub struct MultiReportVisitor {
    visitors: Vec<Box<dyn ReportVisitor + Send>>,
}

impl std::fmt::Debug for MultiReportVisitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiReportVisitor")
            .field("visitors", &self.visitors.len())
            .finish()
    }
}

impl MultiReportVisitor {
    /// Create a fan-out over the given visitors
    #[must_use]
    pub fn new(visitors: Vec<Box<dyn ReportVisitor + Send>>) -> Self {
        Self { visitors }
    }

    /// Number of children
    #[must_use]
    pub fn len(&self) -> usize {
        self.visitors.len()
    }

    /// Whether there are no children
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.visitors.is_empty()
    }
}

impl ReportVisitor for MultiReportVisitor {
    fn visit_info(
        &mut self,
        sessions: &[SessionInfo],
        executions: &[&ExecutionData],
    ) -> ReportResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.visit_info(sessions, executions))
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        locator: &dyn SourceFileLocator,
    ) -> ReportResult<()> {
        self.visitors
            .iter_mut()
            .try_for_each(|v| v.visit_bundle(bundle, locator))
    }

    fn visit_end(&mut self) -> ReportResult<()> {
        self.visitors.iter_mut().try_for_each(|v| v.visit_end())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::CoverageBuilder;
    use crate::report::locator::NoSourceLocator;
    use crate::result::ReportError;
    use std::sync::{Arc, Mutex};

    #[derive(Clone)]
    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        fail_on_bundle: bool,
    }

    impl Recorder {
        fn record(&self, event: &str) {
            self.log.lock().unwrap().push(format!("{}:{event}", self.label));
        }
    }

    impl ReportVisitor for Recorder {
        fn visit_info(&mut self, _: &[SessionInfo], _: &[&ExecutionData]) -> ReportResult<()> {
            self.record("info");
            Ok(())
        }

        fn visit_bundle(&mut self, _: &BundleCoverage, _: &dyn SourceFileLocator) -> ReportResult<()> {
            self.record("bundle");
            if self.fail_on_bundle {
                return Err(ReportError::config("boom"));
            }
            Ok(())
        }

        fn visit_end(&mut self) -> ReportResult<()> {
            self.record("end");
            Ok(())
        }
    }

    fn recorders(fail_first: bool) -> (MultiReportVisitor, Arc<Mutex<Vec<String>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let make = |label, fail_on_bundle| -> Box<dyn ReportVisitor + Send> {
            Box::new(Recorder {
                label,
                log: Arc::clone(&log),
                fail_on_bundle,
            })
        };
        let multi = MultiReportVisitor::new(vec![make("a", fail_first), make("b", false)]);
        (multi, log)
    }

    #[test]
    fn test_each_phase_reaches_every_visitor_before_the_next() {
        let (mut multi, log) = recorders(false);
        let bundle = CoverageBuilder::new().into_bundle("b");
        multi.visit_info(&[], &[]).unwrap();
        multi.visit_bundle(&bundle, &NoSourceLocator).unwrap();
        multi.visit_end().unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:info", "b:info", "a:bundle", "b:bundle", "a:end", "b:end"]
        );
    }

    #[test]
    fn test_first_error_stops_fan_out() {
        let (mut multi, log) = recorders(true);
        let bundle = CoverageBuilder::new().into_bundle("b");
        multi.visit_info(&[], &[]).unwrap();
        let err = multi.visit_bundle(&bundle, &NoSourceLocator).unwrap_err();
        assert!(matches!(err, ReportError::Config { .. }));
        assert_eq!(*log.lock().unwrap(), vec!["a:info", "b:info", "a:bundle"]);
    }
}
