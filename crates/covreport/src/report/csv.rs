//! CSV report (`jacoco.csv`), one row per class.

use super::encoding::{write_encoded, Unmappable};
use super::locator::SourceFileLocator;
use super::visitor::ReportVisitor;
use crate::analysis::{BundleCoverage, ClassCoverage, CoverageNode};
use crate::exec::{ExecutionData, SessionInfo};
use crate::result::ReportResult;
use encoding_rs::{Encoding, UTF_8};
use std::borrow::Cow;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the CSV report
pub const CSV_FILE: &str = "jacoco.csv";

const HEADER: &str = "GROUP,PACKAGE,CLASS,INSTRUCTION_MISSED,INSTRUCTION_COVERED,\
BRANCH_MISSED,BRANCH_COVERED,LINE_MISSED,LINE_COVERED,COMPLEXITY_MISSED,\
COMPLEXITY_COVERED,METHOD_MISSED,METHOD_COVERED";

/// CSV report generator
#[derive(Debug, Clone, Copy)]
pub struct CsvFormatter {
    encoding: &'static Encoding,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new(UTF_8)
    }
}

impl CsvFormatter {
    /// Create a formatter writing the given encoding
    #[must_use]
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding: encoding.output_encoding(),
        }
    }

    /// Generate the CSV document
    #[must_use]
    pub fn generate(&self, bundle: &BundleCoverage) -> String {
        let mut csv = String::from(HEADER);
        csv.push('\n');
        let group = quote(bundle.name());
        for package in bundle.packages() {
            let package_name = package.name().replace('/', ".");
            for class in package.classes() {
                write_row(&mut csv, &group, &quote(&package_name), class);
            }
        }
        csv
    }

    /// Save the CSV report to a file
    pub fn save(&self, path: &Path, bundle: &BundleCoverage) -> ReportResult<()> {
        write_encoded(path, &self.generate(bundle), self.encoding, Unmappable::QuestionMark)
    }

    /// Visitor writing `path` when the bundle is visited
    #[must_use]
    pub fn create_visitor(&self, path: impl Into<PathBuf>) -> CsvReportVisitor {
        CsvReportVisitor {
            formatter: *self,
            path: path.into(),
        }
    }
}

fn write_row(csv: &mut String, group: &str, package: &str, class: &ClassCoverage) {
    let c = class.counters();
    let _ = writeln!(
        csv,
        "{group},{package},{},{},{},{},{},{},{},{},{},{},{}",
        quote(&class.simple_name().replace('$', ".")),
        c.instruction.missed,
        c.instruction.covered,
        c.branch.missed,
        c.branch.covered,
        c.line.missed,
        c.line.covered,
        c.complexity.missed,
        c.complexity.covered,
        c.method.missed,
        c.method.covered,
    );
}

/// Quote a value if it contains a separator, quote or line break
fn quote(value: &str) -> Cow<'_, str> {
    if value.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

/// Visitor writing the CSV report
#[derive(Debug)]
pub struct CsvReportVisitor {
    formatter: CsvFormatter,
    path: PathBuf,
}

impl ReportVisitor for CsvReportVisitor {
    fn visit_info(&mut self, _sessions: &[SessionInfo], _executions: &[&ExecutionData]) -> ReportResult<()> {
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        _locator: &dyn SourceFileLocator,
    ) -> ReportResult<()> {
        self.formatter.save(&self.path, bundle)?;
        debug!(path = %self.path.display(), "wrote CSV report");
        Ok(())
    }

    fn visit_end(&mut self) -> ReportResult<()> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::{CoverageBuilder, LineProbe, MethodUnit, UnitDescriptor};
    use encoding_rs::WINDOWS_1252;

    fn class(id: u64, name: &str, hit: bool) -> ClassCoverage {
        let unit = UnitDescriptor {
            id,
            name: name.to_string(),
            source_file: None,
            probe_count: Some(1),
            methods: vec![MethodUnit {
                name: "m".to_string(),
                desc: "()V".to_string(),
                lines: vec![LineProbe { nr: 1, instructions: 3, probe: 0, branches: vec![] }],
            }],
        };
        ClassCoverage::analyze(&unit, Some(&[hit]), false)
    }

    fn bundle(name: &str, classes: Vec<ClassCoverage>) -> BundleCoverage {
        classes
            .into_iter()
            .try_fold(CoverageBuilder::new(), |b, c| b.add(c, Path::new("x")))
            .unwrap()
            .into_bundle(name)
    }

    #[test]
    fn test_header_and_rows() {
        let csv = CsvFormatter::default().generate(&bundle(
            "app",
            vec![class(1, "pkg/sub/Foo", true), class(2, "Main", false)],
        ));
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "app,pkg.sub,Foo,0,3,0,0,0,1,0,1,0,1");
        assert_eq!(lines[2], "app,,Main,3,0,0,0,1,0,1,0,1,0");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_group_quoted() {
        let csv = CsvFormatter::default().generate(&bundle("a,\"b\"", vec![class(1, "p/C", true)]));
        assert!(csv.lines().nth(1).unwrap().starts_with("\"a,\"\"b\"\"\",p,C,"));
    }

    #[test]
    fn test_empty_bundle_has_header_only() {
        let csv = CsvFormatter::default().generate(&bundle("app", vec![]));
        assert_eq!(csv, format!("{HEADER}\n"));
    }

    #[test]
    fn test_generation_is_deterministic() {
        let make = || bundle("app", vec![class(1, "b/B", true), class(2, "a/A", false)]);
        assert_eq!(
            CsvFormatter::default().generate(&make()),
            CsvFormatter::default().generate(&make())
        );
    }

    #[test]
    fn test_latin1_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CSV_FILE);
        CsvFormatter::new(WINDOWS_1252)
            .save(&path, &bundle("app", vec![class(1, "paket/Größe", true)]))
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.windows(5).any(|w| w == b"Gr\xf6\xdfe"));
    }

    #[test]
    fn test_inner_class_shown_with_dot() {
        let csv = CsvFormatter::default()
            .generate(&bundle("app", vec![class(1, "pkg/Outer$Inner", true)]));
        assert!(csv.lines().nth(1).unwrap().starts_with("app,pkg,Outer.Inner,"));
    }

    #[test]
    fn test_unmappable_chars_become_question_marks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CSV_FILE);
        CsvFormatter::new(WINDOWS_1252)
            .save(&path, &bundle("\u{3c0}-app", vec![class(1, "p/C", true)]))
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.windows(7).any(|w| w == b"\n?-app,"));
        assert!(!bytes.windows(2).any(|w| w == b"&#"));
    }
}
