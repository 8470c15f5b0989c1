//! HTML report: a directory of linked pages.
//!
//! ```text
//! <report dir>/
//!   index.html                 packages of the bundle
//!   jacoco-sessions.html       sessions and executed classes
//!   jacoco-resources/report.css
//!   <package>/index.html       classes of a package
//!   <package>/<Class>.html     methods of a class
//!   <package>/<File>.html      annotated source, when it could be resolved
//! ```

mod page;
mod resources;
mod source;
mod table;

pub use resources::{REPORT_CSS, RESOURCES_DIR};

use super::encoding::{write_encoded, Unmappable};
use super::locale::NumberLocale;
use super::locator::SourceFileLocator;
use super::visitor::ReportVisitor;
use crate::analysis::{BundleCoverage, ClassCoverage, CoverageNode, PackageCoverage};
use crate::exec::{ExecutionData, SessionInfo};
use crate::result::{ReportError, ReportResult};
use chrono::{Local, TimeZone};
use encoding_rs::{Encoding, UTF_8};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use page::{render_page, Crumb, PageContext};
use source::render_source;
use std::collections::{HashMap, HashSet};
use std::fmt::Write;
use std::path::{Path, PathBuf};
use table::{CoverageTable, Row};
use tracing::{debug, warn};

/// Root page of the report
pub const INDEX_FILE: &str = "index.html";

/// Sessions page
pub const SESSIONS_FILE: &str = "jacoco-sessions.html";

/// HTML report generator
#[derive(Debug, Clone)]
pub struct HtmlFormatter {
    encoding: &'static Encoding,
    footer: String,
    locale: NumberLocale,
}

impl Default for HtmlFormatter {
    fn default() -> Self {
        Self {
            encoding: UTF_8,
            footer: String::new(),
            locale: NumberLocale::from_env(),
        }
    }
}

impl HtmlFormatter {
    /// Create a formatter with the process locale and no footer
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output encoding
    #[must_use]
    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding.output_encoding();
        self
    }

    /// Set the footer text shown on every page
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = footer.into();
        self
    }

    /// Override the number locale
    #[must_use]
    pub fn with_locale(mut self, locale: NumberLocale) -> Self {
        self.locale = locale;
        self
    }

    /// Visitor rendering the report into `dir`
    #[must_use]
    pub fn create_visitor(&self, dir: impl Into<PathBuf>) -> HtmlReportVisitor {
        HtmlReportVisitor {
            formatter: self.clone(),
            root: dir.into(),
            sessions: Vec::new(),
            executions: Vec::new(),
            class_pages: HashMap::new(),
            title: String::new(),
        }
    }

    fn context(&self) -> PageContext<'_> {
        PageContext {
            charset: self.encoding.name(),
            language: self.locale.tag(),
            footer: &self.footer,
        }
    }
}

/// Visitor writing the HTML pages
///
/// Coverage pages are written when the bundle arrives; the sessions page
/// and the stylesheet at the end of the pass.
#[derive(Debug)]
pub struct HtmlReportVisitor {
    formatter: HtmlFormatter,
    root: PathBuf,
    sessions: Vec<SessionInfo>,
    executions: Vec<(String, String)>,
    class_pages: HashMap<String, String>,
    title: String,
}

impl HtmlReportVisitor {
    fn write(&self, relative: &str, html: &str) -> ReportResult<()> {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ReportError::emission(parent, e))?;
        }
        write_encoded(&path, html, self.formatter.encoding, Unmappable::CharacterReference)
    }

    fn table(&self, with_classes: bool) -> CoverageTable<'_> {
        CoverageTable::new(&self.formatter.locale, with_classes)
    }

    fn write_index(&self, bundle: &BundleCoverage) -> ReportResult<()> {
        let rows: Vec<Row> = bundle
            .packages()
            .iter()
            .map(|p| {
                let dir = p.display_name();
                Row::new(dir.clone(), Some(format!("{dir}/{INDEX_FILE}")), *p.counters())
            })
            .collect();
        let body = self.table(true).render(&rows, bundle.counters());
        let html = render_page(
            &self.formatter.context(),
            0,
            bundle.name(),
            &[Crumb::current(bundle.name())],
            &body,
        );
        self.write(INDEX_FILE, &html)
    }

    /// Resolve and write the source pages of a package; returns the file
    /// names that were found
    fn write_sources(
        &self,
        package: &PackageCoverage,
        locator: &dyn SourceFileLocator,
        bundle_name: &str,
    ) -> ReportResult<HashSet<String>> {
        let dir = package.display_name();
        let mut resolved = HashSet::new();
        for file in package.source_files() {
            let Some(source) = locator.source_file(package.name(), file.name())? else {
                continue;
            };
            let crumbs = [
                Crumb::link(bundle_name, format!("../{INDEX_FILE}")),
                Crumb::link(dir.clone(), INDEX_FILE),
                Crumb::current(file.name()),
            ];
            let html = render_page(
                &self.formatter.context(),
                1,
                file.name(),
                &crumbs,
                &render_source(&source, file.lines()),
            );
            self.write(&format!("{dir}/{}.html", file.name()), &html)?;
            let _ = resolved.insert(file.name().to_string());
        }
        Ok(resolved)
    }

    fn write_class(
        &self,
        class: &ClassCoverage,
        dir: &str,
        bundle_name: &str,
        source_page: Option<String>,
        page: &str,
    ) -> ReportResult<()> {
        let rows: Vec<Row> = class
            .methods()
            .iter()
            .map(|m| {
                let href = source_page
                    .as_ref()
                    .zip(m.first_line())
                    .map(|(page, line)| format!("{page}#L{line}"));
                Row::new(format!("{}{}", m.name(), m.desc()), href, *m.counters())
            })
            .collect();

        let mut body = String::new();
        if let Some(page) = &source_page {
            let _ = writeln!(
                body,
                r#"<p class="source"><a href="{}">{}</a></p>"#,
                attr(page),
                text(class.source_file().unwrap_or_default())
            );
        }
        if class.is_no_match() {
            body.push_str(
                "<p class=\"warning\">Execution data for this class does not match the analyzed unit.</p>\n",
            );
        }
        body.push_str(&self.table(false).render(&rows, class.counters()));

        let crumbs = [
            Crumb::link(bundle_name, format!("../{INDEX_FILE}")),
            Crumb::link(dir, INDEX_FILE),
            Crumb::current(class.simple_name()),
        ];
        let html = render_page(&self.formatter.context(), 1, class.simple_name(), &crumbs, &body);
        self.write(&format!("{dir}/{page}"), &html)
    }

    fn write_package(
        &mut self,
        package: &PackageCoverage,
        locator: &dyn SourceFileLocator,
        bundle_name: &str,
    ) -> ReportResult<usize> {
        let dir = package.display_name();
        let resolved = self.write_sources(package, locator, bundle_name)?;

        let mut rows = Vec::with_capacity(package.classes().len());
        for class in package.classes() {
            let source_page = class
                .source_file()
                .filter(|f| resolved.contains(*f))
                .map(|f| format!("{f}.html"));
            let page = class_page(class.simple_name());
            self.write_class(class, &dir, bundle_name, source_page, &page)?;
            let _ = self
                .class_pages
                .insert(class.name().to_string(), format!("{dir}/{page}"));
            rows.push(Row::new(class.simple_name(), Some(page), *class.counters()));
        }

        let body = self.table(true).render(&rows, package.counters());
        let crumbs = [
            Crumb::link(bundle_name, format!("../{INDEX_FILE}")),
            Crumb::current(dir.clone()),
        ];
        let html = render_page(&self.formatter.context(), 1, &dir, &crumbs, &body);
        self.write(&format!("{dir}/{INDEX_FILE}"), &html)?;
        Ok(package.source_files().len() - resolved.len())
    }

    fn write_sessions(&self) -> ReportResult<()> {
        let mut body = String::new();
        if self.sessions.is_empty() {
            body.push_str("<p>No sessions recorded.</p>\n");
        } else {
            body.push_str(r#"<table class="coverage" cellspacing="0">"#);
            body.push_str("\n<thead><tr><td>Session</td><td>Start Time</td><td>Dump Time</td></tr></thead>\n<tbody>\n");
            for session in &self.sessions {
                let _ = writeln!(
                    body,
                    "<tr><td>{}</td><td>{}</td><td>{}</td></tr>",
                    text(&session.id),
                    format_time(session.start),
                    format_time(session.dump)
                );
            }
            body.push_str("</tbody>\n</table>\n");
        }

        let _ = writeln!(
            body,
            "<p>Execution data for the following classes is considered in this report ({}):</p>",
            self.formatter.locale.format_integer(self.executions.len() as u64)
        );
        body.push_str(r#"<table class="coverage" cellspacing="0">"#);
        body.push_str("\n<thead><tr><td>Class</td><td>Id</td></tr></thead>\n<tbody>\n");
        for (name, id) in &self.executions {
            let label = name.replace('/', ".");
            match self.class_pages.get(name) {
                Some(href) => {
                    let _ = writeln!(
                        body,
                        r#"<tr><td><a href="{}">{}</a></td><td><code>{id}</code></td></tr>"#,
                        attr(href),
                        text(&label)
                    );
                }
                None => {
                    let _ = writeln!(
                        body,
                        "<tr><td>{}</td><td><code>{id}</code></td></tr>",
                        text(&label)
                    );
                }
            }
        }
        body.push_str("</tbody>\n</table>\n");

        let crumbs = [
            Crumb::link(self.title.clone(), INDEX_FILE),
            Crumb::current("Sessions"),
        ];
        let html = render_page(&self.formatter.context(), 0, "Sessions", &crumbs, &body);
        self.write(SESSIONS_FILE, &html)
    }
}

fn format_time(millis: i64) -> String {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map_or_else(|| millis.to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

impl ReportVisitor for HtmlReportVisitor {
    fn visit_info(
        &mut self,
        sessions: &[SessionInfo],
        executions: &[&ExecutionData],
    ) -> ReportResult<()> {
        self.sessions = sessions.to_vec();
        let mut executions: Vec<(String, String)> = executions
            .iter()
            .map(|e| (e.name().to_string(), e.id().to_string()))
            .collect();
        executions.sort();
        self.executions = executions;
        Ok(())
    }

    fn visit_bundle(
        &mut self,
        bundle: &BundleCoverage,
        locator: &dyn SourceFileLocator,
    ) -> ReportResult<()> {
        self.title = bundle.name().to_string();
        self.write_index(bundle)?;
        let mut unresolved = 0usize;
        for package in bundle.packages() {
            unresolved += self.write_package(package, locator, bundle.name())?;
        }
        if unresolved > 0 {
            warn!(unresolved, "source files not found, HTML report has no annotated source for them");
        }
        debug!(path = %self.root.display(), packages = bundle.packages().len(), "wrote HTML report");
        Ok(())
    }

    fn visit_end(&mut self) -> ReportResult<()> {
        self.write_sessions()?;
        let css = Path::new(RESOURCES_DIR).join(resources::STYLESHEET);
        self.write(&css.to_string_lossy(), REPORT_CSS)
    }
}

/// Page of a class; a class called `index` must not replace the package index
fn class_page(simple_name: &str) -> String {
    let page = format!("{simple_name}.html");
    if page.eq_ignore_ascii_case(INDEX_FILE) {
        format!("{simple_name}.class.html")
    } else {
        page
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::analysis::{CoverageBuilder, LineProbe, MethodUnit, UnitDescriptor};
    use crate::exec::ClassId;
    use crate::report::locator::{MultiSourceFileLocator, NoSourceLocator};
    use std::fs;

    fn bundle() -> BundleCoverage {
        let unit = |id: u64, name: &str| UnitDescriptor {
            id,
            name: name.to_string(),
            source_file: Some("Foo.java".to_string()),
            probe_count: Some(1),
            methods: vec![MethodUnit {
                name: "run".to_string(),
                desc: "()V".to_string(),
                lines: vec![LineProbe { nr: 2, instructions: 3, probe: 0, branches: vec![] }],
            }],
        };
        CoverageBuilder::new()
            .add(ClassCoverage::analyze(&unit(1, "pkg/Foo"), Some(&[true]), false), Path::new("x"))
            .unwrap()
            .add(ClassCoverage::analyze(&unit(2, "Main"), None, false), Path::new("x"))
            .unwrap()
            .into_bundle("demo")
    }

    fn render(dir: &Path, formatter: &HtmlFormatter, locator: &dyn SourceFileLocator) {
        let data = ExecutionData::new(ClassId::new(1), "pkg/Foo", vec![true]);
        let mut visitor = formatter.create_visitor(dir);
        visitor
            .visit_info(&[SessionInfo::new("host-1", 0, 1_000)], &[&data])
            .unwrap();
        visitor.visit_bundle(&bundle(), locator).unwrap();
        visitor.visit_end().unwrap();
    }

    #[test]
    fn test_page_tree() {
        let dir = tempfile::tempdir().unwrap();
        render(dir.path(), &HtmlFormatter::new(), &NoSourceLocator);
        for page in [
            "index.html",
            "jacoco-sessions.html",
            "jacoco-resources/report.css",
            "pkg/index.html",
            "pkg/Foo.html",
            "default/index.html",
            "default/Main.html",
        ] {
            assert!(dir.path().join(page).is_file(), "missing {page}");
        }
        assert!(!dir.path().join("pkg/Foo.java.html").exists());
    }

    #[test]
    fn test_footer_on_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = HtmlFormatter::new().with_footer("Built by CI");
        render(dir.path(), &formatter, &NoSourceLocator);
        for page in ["index.html", "pkg/index.html", "pkg/Foo.html", "jacoco-sessions.html"] {
            let html = fs::read_to_string(dir.path().join(page)).unwrap();
            assert!(html.contains("Built by CI"), "no footer in {page}");
        }
    }

    #[test]
    fn test_source_page_when_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let sources = tempfile::tempdir().unwrap();
        fs::create_dir_all(sources.path().join("pkg")).unwrap();
        fs::write(sources.path().join("pkg/Foo.java"), "class Foo {\n  void run() {}\n}\n").unwrap();
        let locator =
            MultiSourceFileLocator::for_directories(&[sources.path().to_path_buf()], UTF_8, 4);

        render(dir.path(), &HtmlFormatter::new(), &locator);
        let source = fs::read_to_string(dir.path().join("pkg/Foo.java.html")).unwrap();
        assert!(source.contains(r#"<span class="fc" id="L2">  void run() {}</span>"#));
        let class = fs::read_to_string(dir.path().join("pkg/Foo.html")).unwrap();
        assert!(class.contains(r#"href="Foo.java.html#L2""#));
    }

    #[test]
    fn test_locale_formatting() {
        let dir = tempfile::tempdir().unwrap();
        let formatter = HtmlFormatter::new().with_locale(NumberLocale::from_tag("de_DE"));
        render(dir.path(), &formatter, &NoSourceLocator);
        let index = fs::read_to_string(dir.path().join("index.html")).unwrap();
        assert!(index.contains("50\u{a0}%"));
        assert!(index.contains(r#"<html lang="de-DE">"#));
    }

    #[test]
    fn test_sessions_page_links_executed_classes() {
        let dir = tempfile::tempdir().unwrap();
        render(dir.path(), &HtmlFormatter::new(), &NoSourceLocator);
        let sessions = fs::read_to_string(dir.path().join(SESSIONS_FILE)).unwrap();
        assert!(sessions.contains("host-1"));
        assert!(sessions.contains(r#"<a href="pkg/Foo.html">pkg.Foo</a>"#));
        assert!(sessions.contains("0000000000000001"));
    }

    #[test]
    fn test_class_named_index_keeps_package_index() {
        let unit = UnitDescriptor {
            id: 9,
            name: "pkg/index".to_string(),
            source_file: None,
            probe_count: Some(1),
            methods: vec![MethodUnit {
                name: "run".to_string(),
                desc: "()V".to_string(),
                lines: vec![LineProbe { nr: 1, instructions: 1, probe: 0, branches: vec![] }],
            }],
        };
        let bundle = CoverageBuilder::new()
            .add(ClassCoverage::analyze(&unit, Some(&[true]), false), Path::new("x"))
            .unwrap()
            .into_bundle("demo");
        let dir = tempfile::tempdir().unwrap();
        let mut visitor = HtmlFormatter::new().create_visitor(dir.path());
        visitor.visit_info(&[], &[]).unwrap();
        visitor.visit_bundle(&bundle, &NoSourceLocator).unwrap();
        visitor.visit_end().unwrap();

        let index = fs::read_to_string(dir.path().join("pkg/index.html")).unwrap();
        assert!(index.contains(r#"href="index.class.html""#));
        let class = fs::read_to_string(dir.path().join("pkg/index.class.html")).unwrap();
        assert!(class.contains("run"));
    }

    #[test]
    fn test_class_page_names() {
        assert_eq!(class_page("Foo"), "Foo.html");
        assert_eq!(class_page("index"), "index.class.html");
    }
}
