//! Replays execution data against compiled-unit descriptors.

use super::builder::CoverageBuilder;
use super::coverage::ClassCoverage;
use super::unit::UnitDescriptor;
use crate::exec::{ClassId, ExecutionDataStore};
use crate::result::{ReportError, ReportResult};
use std::path::Path;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Correlates unit descriptors with the records of an execution data store
#[derive(Debug, Clone, Copy)]
pub struct Analyzer<'a> {
    store: &'a ExecutionDataStore,
}

impl<'a> Analyzer<'a> {
    /// Create an analyzer over a store
    #[must_use]
    pub const fn new(store: &'a ExecutionDataStore) -> Self {
        Self { store }
    }

    /// Analyze a single descriptor
    pub fn analyze_unit(&self, unit: &UnitDescriptor, origin: &Path) -> ReportResult<ClassCoverage> {
        unit.validate()
            .map_err(|message| ReportError::analysis(origin, message))?;

        let id = ClassId::new(unit.id);
        let record = self.store.get(id);
        let probes = match record {
            Some(data) if data.probes().len() != unit.effective_probe_count() => {
                return Err(ReportError::analysis(
                    origin,
                    format!(
                        "incompatible execution data for class {} with id {id}: {} probes recorded, {} expected",
                        unit.name,
                        data.probes().len(),
                        unit.effective_probe_count()
                    ),
                ));
            }
            Some(data) => Some(data.probes()),
            None => None,
        };
        let no_match = record.is_none() && self.store.contains_name(&unit.name);
        if no_match {
            warn!(class = %unit.name, id = %id, "execution data does not match class");
        }
        Ok(ClassCoverage::analyze(unit, probes, no_match))
    }

    /// Analyze a descriptor file
    pub fn analyze_file(&self, builder: CoverageBuilder, path: &Path) -> ReportResult<CoverageBuilder> {
        let json = std::fs::read_to_string(path).map_err(|e| {
            ReportError::analysis(path, format!("error while reading unit descriptor: {e}"))
        })?;
        let unit = UnitDescriptor::from_json(&json).map_err(|e| {
            ReportError::analysis(path, format!("invalid unit descriptor: {e}"))
        })?;
        let class = self.analyze_unit(&unit, path)?;
        debug!(path = %path.display(), class = %unit.name, "analyzed unit");
        builder.add(class, path)
    }

    /// Analyze every descriptor below `path`, or `path` itself if it is a file
    ///
    /// Entries are visited in file-name order so repeated runs see the same
    /// sequence. A directory without descriptors contributes nothing.
    pub fn analyze_all(&self, mut builder: CoverageBuilder, path: &Path) -> ReportResult<CoverageBuilder> {
        if !path.exists() {
            return Err(ReportError::analysis(path, "directory does not exist"));
        }
        if path.is_file() {
            return self.analyze_file(builder, path);
        }

        let mut units = 0usize;
        for entry in WalkDir::new(path).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                ReportError::analysis(path, format!("error while walking directory: {e}"))
            })?;
            if entry.file_type().is_file() && UnitDescriptor::is_descriptor(entry.path()) {
                builder = self.analyze_file(builder, entry.path())?;
                units += 1;
            }
        }
        debug!(path = %path.display(), units, "analyzed directory");
        Ok(builder)
    }
}

/// Analyze every listed directory in order, returning the populated builder
pub fn analyze_directories<P: AsRef<Path>>(
    store: &ExecutionDataStore,
    directories: &[P],
) -> ReportResult<CoverageBuilder> {
    let analyzer = Analyzer::new(store);
    directories
        .iter()
        .try_fold(CoverageBuilder::new(), |builder, dir| {
            analyzer.analyze_all(builder, dir.as_ref())
        })
}
