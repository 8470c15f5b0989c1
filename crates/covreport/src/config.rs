//! Report request and rendering configuration.

use crate::result::{ReportError, ReportResult};
use crate::wait::{CancellationToken, FlushSignal, WaitOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Default tab width used when expanding tabs in annotated source
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Inputs of one report run
#[derive(Clone)]
pub struct ReportRequest {
    artifact_id: String,
    data_file: PathBuf,
    class_dirs: Vec<PathBuf>,
    source_dirs: Vec<PathBuf>,
    report_dir: PathBuf,
    artifact_wait: WaitOptions,
    quiescence_wait: WaitOptions,
    flush_signal: Option<Arc<dyn FlushSignal>>,
    cancel: CancellationToken,
}

impl fmt::Debug for ReportRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReportRequest")
            .field("artifact_id", &self.artifact_id)
            .field("data_file", &self.data_file)
            .field("class_dirs", &self.class_dirs)
            .field("source_dirs", &self.source_dirs)
            .field("report_dir", &self.report_dir)
            .field("artifact_wait", &self.artifact_wait)
            .field("quiescence_wait", &self.quiescence_wait)
            .field(
                "flush_signal",
                &self.flush_signal.as_ref().map(|s| s.describe()),
            )
            .finish_non_exhaustive()
    }
}

impl ReportRequest {
    /// Create a request with no class or source directories
    #[must_use]
    pub fn new(
        artifact_id: impl Into<String>,
        data_file: impl Into<PathBuf>,
        report_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            data_file: data_file.into(),
            class_dirs: Vec::new(),
            source_dirs: Vec::new(),
            report_dir: report_dir.into(),
            artifact_wait: WaitOptions::artifact(),
            quiescence_wait: WaitOptions::quiescence(),
            flush_signal: None,
            cancel: CancellationToken::new(),
        }
    }

    /// Append a compiled-unit directory
    #[must_use]
    pub fn with_class_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.class_dirs.push(dir.into());
        self
    }

    /// Append several compiled-unit directories
    #[must_use]
    pub fn with_class_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.class_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Append a source directory
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dirs.push(dir.into());
        self
    }

    /// Append several source directories
    #[must_use]
    pub fn with_source_dirs<I, P>(mut self, dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.source_dirs.extend(dirs.into_iter().map(Into::into));
        self
    }

    /// Set the execution data availability wait
    #[must_use]
    pub const fn with_artifact_wait(mut self, options: WaitOptions) -> Self {
        self.artifact_wait = options;
        self
    }

    /// Set the quiescence wait bound
    #[must_use]
    pub const fn with_quiescence_wait(mut self, options: WaitOptions) -> Self {
        self.quiescence_wait = options;
        self
    }

    /// Wait for this signal before loading execution data
    #[must_use]
    pub fn with_flush_signal(mut self, signal: Arc<dyn FlushSignal>) -> Self {
        self.flush_signal = Some(signal);
        self
    }

    /// Use a shared cancellation token
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Artifact identifier, the default report title
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Execution data file
    #[must_use]
    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Compiled-unit directories in analysis order
    #[must_use]
    pub fn class_dirs(&self) -> &[PathBuf] {
        &self.class_dirs
    }

    /// Source directories in lookup order
    #[must_use]
    pub fn source_dirs(&self) -> &[PathBuf] {
        &self.source_dirs
    }

    /// Output directory
    #[must_use]
    pub fn report_dir(&self) -> &Path {
        &self.report_dir
    }

    /// Availability wait options
    #[must_use]
    pub const fn artifact_wait(&self) -> &WaitOptions {
        &self.artifact_wait
    }

    /// Quiescence wait options
    #[must_use]
    pub const fn quiescence_wait(&self) -> &WaitOptions {
        &self.quiescence_wait
    }

    /// Configured flush signal
    #[must_use]
    pub fn flush_signal(&self) -> Option<&dyn FlushSignal> {
        self.flush_signal.as_deref()
    }

    /// Cancellation token of this run
    #[must_use]
    pub const fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }
}

/// Options controlling how reports are rendered
///
/// ```yaml
/// output-encoding: UTF-8
/// source-encoding: ISO-8859-1
/// title: My Module
/// footer: Built by CI
/// tab-width: 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct RenderConfig {
    /// Encoding of every textual output; platform default (UTF-8) when absent
    pub output_encoding: Option<String>,
    /// Encoding used to read source files; platform default (UTF-8) when absent
    pub source_encoding: Option<String>,
    /// Bundle display name; falls back to the artifact identifier
    pub title: Option<String>,
    /// Footer text of every HTML page
    pub footer: Option<String>,
    /// Tab width for annotated source
    pub tab_width: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            output_encoding: None,
            source_encoding: None,
            title: None,
            footer: None,
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}

impl RenderConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from YAML
    pub fn from_yaml_str(yaml: &str) -> ReportResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_yaml_file(path: &Path) -> ReportResult<Self> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            ReportError::config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    /// Set the output encoding
    #[must_use]
    pub fn with_output_encoding(mut self, label: impl Into<String>) -> Self {
        self.output_encoding = Some(label.into());
        self
    }

    /// Set the source encoding
    #[must_use]
    pub fn with_source_encoding(mut self, label: impl Into<String>) -> Self {
        self.source_encoding = Some(label.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the footer
    #[must_use]
    pub fn with_footer(mut self, footer: impl Into<String>) -> Self {
        self.footer = Some(footer.into());
        self
    }

    /// Set the tab width
    #[must_use]
    pub const fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }

    /// Bundle name: the title if set, else the artifact identifier
    #[must_use]
    pub fn effective_title<'a>(&'a self, artifact_id: &'a str) -> &'a str {
        self.title.as_deref().unwrap_or(artifact_id)
    }

    /// Footer text, empty if absent
    #[must_use]
    pub fn footer_text(&self) -> &str {
        self.footer.as_deref().unwrap_or_default()
    }

    /// Validate option values
    pub fn validate(&self) -> ReportResult<()> {
        if self.tab_width == 0 {
            return Err(ReportError::config("tab-width must be at least 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::wait::FlushFlag;

    #[test]
    fn test_request_builder() {
        let request = ReportRequest::new("app", "target/jacoco.exec", "target/site")
            .with_class_dir("a")
            .with_class_dirs(["b", "c"])
            .with_source_dir("src")
            .with_artifact_wait(WaitOptions::artifact().with_timeout(5));
        assert_eq!(request.artifact_id(), "app");
        assert_eq!(
            request.class_dirs(),
            &[PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]
        );
        assert_eq!(request.source_dirs().len(), 1);
        assert_eq!(request.artifact_wait().timeout_ms, 5);
        assert_eq!(request.quiescence_wait().timeout_ms, 60_000);
        assert!(request.flush_signal().is_none());
    }

    #[test]
    fn test_request_debug_shows_signal() {
        let request = ReportRequest::new("app", "x.exec", "out")
            .with_flush_signal(Arc::new(FlushFlag::new()));
        let debug = format!("{request:?}");
        assert!(debug.contains("in-process flush flag"));
    }

    #[test]
    fn test_render_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.tab_width, 4);
        assert_eq!(config.footer_text(), "");
        assert_eq!(config.effective_title("artifact"), "artifact");
    }

    #[test]
    fn test_title_override() {
        let config = RenderConfig::new().with_title("Shown");
        assert_eq!(config.effective_title("artifact"), "Shown");
    }

    #[test]
    fn test_from_yaml() {
        let config = RenderConfig::from_yaml_str(
            "output-encoding: ISO-8859-1\nfooter: Built by CI\ntab-width: 8\n",
        )
        .unwrap();
        assert_eq!(config.output_encoding.as_deref(), Some("ISO-8859-1"));
        assert_eq!(config.footer_text(), "Built by CI");
        assert_eq!(config.tab_width, 8);
        assert!(config.title.is_none());
    }

    #[test]
    fn test_from_yaml_rejects_zero_tab_width() {
        let err = RenderConfig::from_yaml_str("tab-width: 0\n").unwrap_err();
        assert!(matches!(err, ReportError::Config { .. }));
    }

    #[test]
    fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("covreport.yaml");
        std::fs::write(&path, "title: Demo\n").unwrap();
        let config = RenderConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.title.as_deref(), Some("Demo"));
    }

    #[test]
    fn test_from_yaml_file_missing() {
        let err = RenderConfig::from_yaml_file(Path::new("/no/such/covreport.yaml")).unwrap_err();
        assert!(matches!(err, ReportError::Config { .. }));
    }
}
