//! XML report (`jacoco.xml`)
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8" standalone="yes"?>
//! <!DOCTYPE report PUBLIC "-//JACOCO//DTD Report 1.1//EN" "report.dtd">
//! <report name="app">
//!   <sessioninfo id="host-1a2b" start="1700000000000" dump="1700000005000"/>
//!   <package name="pkg">
//!     <class name="pkg/Foo" sourcefilename="Foo.java">
//!       <method name="run" desc="()V" line="3">
//!         <counter type="INSTRUCTION" missed="0" covered="4"/>
//!       </method>
//!     </class>
//!     <sourcefile name="Foo.java">
//!       <line nr="3" mi="0" ci="4" mb="0" cb="0"/>
//!     </sourcefile>
//!   </package>
//! </report>
//! ```

use super::encoding::{write_encoded, Unmappable};
use super::locator::SourceFileLocator;
use super::visitor::ReportVisitor;
use crate::analysis::{BundleCoverage, CounterEntity, Counters, CoverageNode};
use crate::exec::{ExecutionData, SessionInfo};
use crate::result::ReportResult;
use encoding_rs::{Encoding, UTF_8};
use html_escape::encode_double_quoted_attribute as attr;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name of the XML report
pub const XML_FILE: &str = "jacoco.xml";

/// XML report generator
#[derive(Debug, Clone, Copy)]
pub struct XmlFormatter {
    encoding: &'static Encoding,
}

impl Default for XmlFormatter {
    fn default() -> Self {
        Self::new(UTF_8)
    }
}

impl XmlFormatter {
    /// Create a formatter writing the given encoding
    #[must_use]
    pub fn new(encoding: &'static Encoding) -> Self {
        Self {
            encoding: encoding.output_encoding(),
        }
    }

    /// Generate the XML document
    #[must_use]
    pub fn generate(&self, bundle: &BundleCoverage, sessions: &[SessionInfo]) -> String {
        let mut xml = String::new();
        let _ = writeln!(
            xml,
            r#"<?xml version="1.0" encoding="{}" standalone="yes"?>"#,
            self.encoding.name()
        );
        xml.push_str(r#"<!DOCTYPE report PUBLIC "-//JACOCO//DTD Report 1.1//EN" "report.dtd">"#);
        xml.push('\n');
        let _ = writeln!(xml, r#"<report name="{}">"#, attr(bundle.name()));

        for session in sessions {
            let _ = writeln!(
                xml,
                r#"  <sessioninfo id="{}" start="{}" dump="{}"/>"#,
                attr(&session.id),
                session.start,
                session.dump
            );
        }

        for package in bundle.packages() {
            let _ = writeln!(xml, r#"  <package name="{}">"#, attr(package.name()));

            for class in package.classes() {
                let _ = write!(xml, r#"    <class name="{}""#, attr(class.name()));
                if let Some(file) = class.source_file() {
                    let _ = write!(xml, r#" sourcefilename="{}""#, attr(file));
                }
                xml.push_str(">\n");
                for method in class.methods() {
                    let _ = write!(
                        xml,
                        r#"      <method name="{}" desc="{}""#,
                        attr(method.name()),
                        attr(method.desc())
                    );
                    if let Some(line) = method.first_line() {
                        let _ = write!(xml, r#" line="{line}""#);
                    }
                    xml.push_str(">\n");
                    write_counters(&mut xml, method.counters(), 8);
                    xml.push_str("      </method>\n");
                }
                write_counters(&mut xml, class.counters(), 6);
                xml.push_str("    </class>\n");
            }

            for source in package.source_files() {
                let _ = writeln!(xml, r#"    <sourcefile name="{}">"#, attr(source.name()));
                for (nr, line) in source.lines() {
                    let _ = writeln!(
                        xml,
                        r#"      <line nr="{nr}" mi="{}" ci="{}" mb="{}" cb="{}"/>"#,
                        line.instructions.missed,
                        line.instructions.covered,
                        line.branches.missed,
                        line.branches.covered
                    );
                }
                write_counters(&mut xml, source.counters(), 6);
                xml.push_str("    </sourcefile>\n");
            }

            write_counters(&mut xml, package.counters(), 4);
            xml.push_str("  </package>\n");
        }

        write_counters(&mut xml, bundle.counters(), 2);
        xml.push_str("</report>\n");
        xml
    }

    /// Save the XML report to a file
    pub fn save(&self, path: &Path, bundle: &BundleCoverage, sessions: &[SessionInfo]) -> ReportResult<()> {
        write_encoded(
            path,
            &self.generate(bundle, sessions),
            self.encoding,
            Unmappable::CharacterReference,
        )
    }

    /// Visitor writing `path` once the bundle arrives
    #[must_use]
    pub fn create_visitor(&self, path: impl Into<PathBuf>) -> XmlReportVisitor {
        XmlReportVisitor {
            formatter: *self,
            path: path.into(),
            sessions: Vec::new(),
        }
    }
}

fn write_counters(xml: &mut String, counters: &Counters, indent: usize) {
    for entity in CounterEntity::ALL {
        let counter = counters.get(entity);
        if counter.total() == 0 {
            continue;
        }
        let _ = writeln!(
            xml,
            r#"{:indent$}<counter type="{}" missed="{}" covered="{}"/>"#,
            "",
            entity.as_str(),
            counter.missed,
            counter.covered
        );
    }
}

/// Visitor that buffers session infos until the bundle is visited
#[derive(Debug)]
pub struct XmlReportVisitor {
    formatter: XmlFormatter,
    path: PathBuf,
    sessions: Vec<SessionInfo>,
}

impl ReportVisitor for XmlReportVisitor {
    fn visit_info(
        &mut self,
        sessions: &[SessionInfo],
        _executions: &[&ExecutionData],
    ) -> ReportResult<()> {
        self.sessions = sessions.to_vec();
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        _locator: &dyn SourceFileLocator,
    ) -> ReportResult<()> {
        self.formatter.save(&self.path, bundle, &self.sessions)?;
        debug!(path = %self.path.display(), "wrote XML report");
        Ok(())
    }

    fn visit_end(&mut self) -> ReportResult<()> {
        Ok(())
    }
}
