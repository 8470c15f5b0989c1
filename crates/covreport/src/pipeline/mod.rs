//! Report pipeline driver
//!
//! ```text
//! Idle → Waiting → Loading → Analyzing → Aggregating → Emitting → Done
//!           └─────────┴──────────┴────────────┴────────────┴──→ Failed
//! ```
//!
//! Report generation is auxiliary to the test run that triggers it, so
//! [`ReportCreator::run`] never returns an error: the outcome, including any
//! failure and its cause, is returned as a [`ReportOutcome`].

mod state;


pub use state::{PipelineState, ReportOutcome};

use crate::analysis::{analyze_directories, BundleCoverage, Counters, CoverageNode};
use crate::config::{RenderConfig, ReportRequest};
use crate::exec::{ExecFileLoader, ExecutionData, ExecutionDataStore, SessionInfo};
use crate::report::{
    resolve_encoding, CsvFormatter, HtmlFormatter, MultiReportVisitor, MultiSourceFileLocator,
    NumberLocale, ReportVisitor, XmlFormatter, CSV_FILE, XML_FILE,
};
use crate::result::{ReportError, ReportResult};
use crate::wait::{wait_for_file, wait_for_quiescence};
use std::thread::JoinHandle;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Records the state machine of one run
#[derive(Debug)]
struct Tracker {
    state: PipelineState,
    transitions: Vec<PipelineState>,
    data_available: bool,
    quiescence_warning: bool,
    totals: Option<Counters>,
}

impl Tracker {
    fn new() -> Self {
        Self {
            state: PipelineState::Idle,
            transitions: vec![PipelineState::Idle],
            data_available: false,
            quiescence_warning: false,
            totals: None,
        }
    }

    fn enter(&mut self, next: PipelineState) {
        debug_assert!(self.state.can_transition_to(next), "{} -> {next}", self.state);
        debug!(from = %self.state, to = %next, "pipeline transition");
        self.state = next;
        self.transitions.push(next);
    }
}

/// Drives one report run from waiting to emitting
#[derive(Debug, Clone)]
pub struct ReportCreator {
    request: ReportRequest,
    render: RenderConfig,
    locale: Option<NumberLocale>,
    console: bool,
}

impl ReportCreator {
    /// Create a driver for one request
    #[must_use]
    pub fn new(request: ReportRequest, render: RenderConfig) -> Self {
        Self {
            request,
            render,
            locale: None,
            console: true,
        }
    }

    /// Override the locale of the HTML report
    #[must_use]
    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = Some(locale);
        self
    }

    /// Whether to print the one-line success or failure notice
    #[must_use]
    pub const fn with_console_messages(mut self, enabled: bool) -> Self {
        self.console = enabled;
        self
    }

    /// The request being served
    #[must_use]
    pub const fn request(&self) -> &ReportRequest {
        &self.request
    }

    /// Run the pipeline on the calling thread
    #[must_use]
    pub fn run(&self) -> ReportOutcome {
        let start = Instant::now();
        let mut tracker = Tracker::new();
        let result = self.execute(&mut tracker);
        let report_dir = self.request.report_dir().to_path_buf();

        let (failed_stage, error) = match result {
            Ok(()) => {
                tracker.enter(PipelineState::Done);
                info!(dir = %report_dir.display(), "generated coverage reports");
                if self.console {
                    println!("Generated coverage reports in {}", report_dir.display());
                }
                (None, None)
            }
            Err(err) => {
                let stage = tracker.state;
                tracker.enter(PipelineState::Failed);
                error!(stage = %stage, error = %err.diagnostic(), "failed to generate coverage reports");
                if self.console {
                    eprintln!("Failed to generate coverage reports\n{}", err.diagnostic());
                }
                (Some(stage), Some(err))
            }
        };

        ReportOutcome {
            state: tracker.state,
            failed_stage,
            error,
            transitions: tracker.transitions,
            report_dir,
            data_available: tracker.data_available,
            quiescence_warning: tracker.quiescence_warning,
            totals: tracker.totals,
            elapsed: start.elapsed(),
        }
    }

    /// Run the pipeline on a dedicated background thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<ReportOutcome>> {
        std::thread::Builder::new()
            .name("covreport".to_string())
            .spawn(move || self.run())
    }

    fn execute(&self, tracker: &mut Tracker) -> ReportResult<()> {
        let request = &self.request;

        tracker.enter(PipelineState::Waiting);
        let cancel = request.cancellation();
        let artifact = wait_for_file(request.data_file(), request.artifact_wait(), cancel)?;
        tracker.data_available = artifact.success;
        if !artifact.success {
            let unavailable = ReportError::DataUnavailable {
                path: request.data_file().to_path_buf(),
                waited_ms: artifact.elapsed_ms(),
            };
            warn!("{unavailable}, loading anyway");
        }
        let quiet = wait_for_quiescence(request.flush_signal(), request.quiescence_wait(), cancel)?;
        if !quiet.success {
            tracker.quiescence_warning = true;
            let timeout = ReportError::QuiescenceTimeout {
                signal: quiet.waited_for.clone(),
                waited_ms: quiet.elapsed_ms(),
            };
            warn!("{timeout}, loading anyway");
        }

        tracker.enter(PipelineState::Loading);
        let mut loader = ExecFileLoader::new();
        loader.load(request.data_file())?;
        let (store, sessions) = loader.into_parts();
        let sessions = sessions.infos();
        info!(classes = store.len(), sessions = sessions.len(), "loaded execution data");

        tracker.enter(PipelineState::Analyzing);
        let builder = analyze_directories(&store, request.class_dirs())?;
        let no_match = builder.no_match_classes().count();
        if no_match > 0 {
            warn!(classes = no_match, "execution data does not match analyzed classes");
        }
        info!(classes = builder.classes().len(), "analyzed classes");

        tracker.enter(PipelineState::Aggregating);
        let bundle = builder.into_bundle(self.render.effective_title(request.artifact_id()));
        tracker.totals = Some(*bundle.counters());
        info!(
            bundle = bundle.name(),
            lines_covered = bundle.counters().line.covered,
            lines_missed = bundle.counters().line.missed,
            "aggregated bundle"
        );

        tracker.enter(PipelineState::Emitting);
        self.emit(&bundle, &store, &sessions)
    }

    fn emit(
        &self,
        bundle: &BundleCoverage,
        store: &ExecutionDataStore,
        sessions: &[SessionInfo],
    ) -> ReportResult<()> {
        let dir = self.request.report_dir();
        std::fs::create_dir_all(dir).map_err(|e| ReportError::emission(dir, e))?;

        let output = resolve_encoding(self.render.output_encoding.as_deref())?;
        let source = resolve_encoding(self.render.source_encoding.as_deref())?;

        let mut html = HtmlFormatter::new()
            .with_encoding(output)
            .with_footer(self.render.footer_text());
        if let Some(locale) = &self.locale {
            html = html.with_locale(locale.clone());
        }

        let mut visitor = MultiReportVisitor::new(vec![
            Box::new(XmlFormatter::new(output).create_visitor(dir.join(XML_FILE))),
            Box::new(CsvFormatter::new(output).create_visitor(dir.join(CSV_FILE))),
            Box::new(html.create_visitor(dir)),
        ]);
        let locator = MultiSourceFileLocator::for_directories(
            self.request.source_dirs(),
            source,
            self.render.tab_width,
        );
        let executions: Vec<&ExecutionData> = store.contents().collect();

        visitor.visit_info(sessions, &executions)?;
        visitor.visit_bundle(bundle, &locator)?;
        visitor.visit_end()
    }
}
