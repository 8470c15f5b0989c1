//! covreport: coverage report generation
//!
//! Turns the execution data of an instrumented test run into XML, CSV and
//! HTML coverage reports.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                        covreport pipeline                         │
//! ├───────────────────────────────────────────────────────────────────┤
//! │  ┌─────────┐   ┌─────────┐   ┌──────────┐   ┌────────┐   ┌──────┐ │
//! │  │ Waiters │──►│ Loader  │──►│ Analyzer │──►│ Bundle │──►│ XML  │ │
//! │  │ (file + │   │ (.exec) │   │ (.covmap)│   │        │   │ CSV  │ │
//! │  │  flush) │   │         │   │          │   │        │   │ HTML │ │
//! │  └─────────┘   └─────────┘   └──────────┘   └────────┘   └──────┘ │
//! └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use covreport::{RenderConfig, ReportCreator, ReportRequest};
//!
//! let request = ReportRequest::new("my-app", "target/jacoco.exec", "target/site/jacoco")
//!     .with_class_dir("target/covmap")
//!     .with_source_dir("src/main/java");
//! let outcome = ReportCreator::new(request, RenderConfig::default()).run();
//! assert!(outcome.is_success());
//! ```

#![warn(missing_docs)]

pub mod analysis;
pub mod config;
pub mod exec;
pub mod pipeline;
pub mod report;
mod result;
pub mod wait;

pub use analysis::{
    analyze_directories, Analyzer, BundleCoverage, ClassCoverage, Counter, CounterEntity,
    Counters, CoverageBuilder, CoverageNode, CoverageStatus, UnitDescriptor,
};
pub use config::{RenderConfig, ReportRequest};
pub use exec::{ClassId, ExecFileLoader, ExecutionData, ExecutionDataStore, SessionInfo};
pub use pipeline::{PipelineState, ReportCreator, ReportOutcome};
pub use report::{
    CsvFormatter, HtmlFormatter, MultiReportVisitor, NumberLocale, ReportVisitor, XmlFormatter,
};
pub use result::{ErrorKind, ReportError, ReportResult};
pub use wait::{CancellationToken, FlushFlag, FlushSignal, SentinelFile, WaitOptions};
