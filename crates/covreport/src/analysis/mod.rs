//! Coverage analysis
//!
//! ```text
//! ExecutionDataStore ─┐
//!                     ├─► Analyzer ─► CoverageBuilder ─► BundleCoverage
//! *.covmap units ─────┘
//! ```
//!
//! The builder is an explicit accumulator: each analysis step takes it by
//! value and hands it back, so analysis is a function of the store and the
//! listed directories only.

mod analyzer;
mod builder;
mod counter;
mod coverage;
mod unit;

pub use analyzer::{analyze_directories, Analyzer};
pub use builder::CoverageBuilder;
pub use counter::{Counter, CounterEntity, Counters, CoverageStatus, LineCounters};
pub use coverage::{
    BundleCoverage, ClassCoverage, CoverageNode, LineMap, MethodCoverage, PackageCoverage,
    SourceFileCoverage,
};
pub use unit::{LineProbe, MethodUnit, UnitDescriptor, UNIT_EXTENSION};
