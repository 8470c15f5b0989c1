//! Source file lookup for the annotated HTML source pages.

use super::encoding::decode;
use crate::config::DEFAULT_TAB_WIDTH;
use encoding_rs::{Encoding, UTF_8};
use std::io;
use std::path::{Path, PathBuf};
use tracing::trace;

/// Resolves a package-relative source file to its text
pub trait SourceFileLocator {
    /// Text of `file_name` in `package` (VM form, `pkg/sub`), if found
    fn source_file(&self, package: &str, file_name: &str) -> io::Result<Option<String>>;

    /// Tab width applied to the returned text
    fn tab_width(&self) -> usize;
}

/// Looks up sources below one directory root
#[derive(Debug, Clone)]
pub struct DirectorySourceFileLocator {
    root: PathBuf,
    encoding: &'static Encoding,
    tab_width: usize,
}

impl DirectorySourceFileLocator {
    /// Create a locator over `root`
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, encoding: &'static Encoding, tab_width: usize) -> Self {
        Self {
            root: root.into(),
            encoding,
            tab_width,
        }
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl SourceFileLocator for DirectorySourceFileLocator {
    fn source_file(&self, package: &str, file_name: &str) -> io::Result<Option<String>> {
        let mut path = self.root.clone();
        path.extend(package.split('/').filter(|s| !s.is_empty()));
        path.push(file_name);
        // A root that is itself a file (an archive, say) resolves nothing
        if !path.is_file() {
            return Ok(None);
        }
        match std::fs::read(&path) {
            Ok(bytes) => {
                trace!(path = %path.display(), "resolved source");
                Ok(Some(expand_tabs(&decode(&bytes, self.encoding), self.tab_width)))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn tab_width(&self) -> usize {
        self.tab_width
    }
}

/// Asks a list of locators in order; the first match wins
#[derive(Default)]
pub struct MultiSourceFileLocator {
    locators: Vec<Box<dyn SourceFileLocator + Send + Sync>>,
    tab_width: usize,
}

impl std::fmt::Debug for MultiSourceFileLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSourceFileLocator")
            .field("locators", &self.locators.len())
            .field("tab_width", &self.tab_width)
            .finish()
    }
}

impl MultiSourceFileLocator {
    /// Create an empty locator
    #[must_use]
    pub fn new(tab_width: usize) -> Self {
        Self {
            locators: Vec::new(),
            tab_width,
        }
    }

    /// Build one directory locator per root, in order
    #[must_use]
    pub fn for_directories(roots: &[PathBuf], encoding: &'static Encoding, tab_width: usize) -> Self {
        roots.iter().fold(Self::new(tab_width), |multi, root| {
            multi.with(DirectorySourceFileLocator::new(root, encoding, tab_width))
        })
    }

    /// Append a locator
    #[must_use]
    pub fn with(mut self, locator: impl SourceFileLocator + Send + Sync + 'static) -> Self {
        self.locators.push(Box::new(locator));
        self
    }

    /// Number of locators
    #[must_use]
    pub fn len(&self) -> usize {
        self.locators.len()
    }

    /// Whether there are no locators
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }
}

impl SourceFileLocator for MultiSourceFileLocator {
    fn source_file(&self, package: &str, file_name: &str) -> io::Result<Option<String>> {
        for locator in &self.locators {
            if let Some(text) = locator.source_file(package, file_name)? {
                return Ok(Some(text));
            }
        }
        Ok(None)
    }

    fn tab_width(&self) -> usize {
        self.tab_width
    }
}

/// Locator that never resolves anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSourceLocator;

impl SourceFileLocator for NoSourceLocator {
    fn source_file(&self, _package: &str, _file_name: &str) -> io::Result<Option<String>> {
        Ok(None)
    }

    fn tab_width(&self) -> usize {
        DEFAULT_TAB_WIDTH
    }
}

/// Replace tabs with spaces up to the next tab stop
#[must_use]
pub fn expand_tabs(text: &str, tab_width: usize) -> String {
    if !text.contains('\t') || tab_width == 0 {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut column = 0usize;
    for c in text.chars() {
        match c {
            '\t' => {
                let pad = tab_width - column % tab_width;
                out.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' => {
                out.push(c);
                column = 0;
            }
            _ => {
                out.push(c);
                column += 1;
            }
        }
    }
    out
}

/// UTF-8 locator over `root` with the default tab width
impl From<PathBuf> for DirectorySourceFileLocator {
    fn from(root: PathBuf) -> Self {
        Self::new(root, UTF_8, DEFAULT_TAB_WIDTH)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use encoding_rs::WINDOWS_1252;
    use std::fs;

    fn source_root(file: &str, contents: &[u8]) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg").join(file), contents).unwrap();
        dir
    }

    #[test]
    fn test_directory_locator_resolves_package_path() {
        let root = source_root("Foo.java", b"class Foo {}\n");
        let locator = DirectorySourceFileLocator::from(root.path().to_path_buf());
        let text = locator.source_file("pkg", "Foo.java").unwrap();
        assert_eq!(text.as_deref(), Some("class Foo {}\n"));
        assert!(locator.source_file("pkg", "Bar.java").unwrap().is_none());
    }

    #[test]
    fn test_missing_root_resolves_nothing() {
        let locator = DirectorySourceFileLocator::new("/no/such/root", UTF_8, 4);
        assert!(locator.source_file("pkg", "Foo.java").unwrap().is_none());
    }

    #[test]
    fn test_root_that_is_a_file_resolves_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("sources.jar");
        fs::write(&archive, b"PK").unwrap();
        let locator = DirectorySourceFileLocator::from(archive);
        assert!(locator.source_file("pkg", "Foo.java").unwrap().is_none());
    }

    #[test]
    fn test_directory_named_like_source_resolves_nothing() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("pkg/Foo.java")).unwrap();
        let locator = DirectorySourceFileLocator::from(root.path().to_path_buf());
        assert!(locator.source_file("pkg", "Foo.java").unwrap().is_none());
    }

    #[test]
    fn test_source_encoding_applied() {
        let root = source_root("Foo.java", b"// caf\xe9\n");
        let locator = DirectorySourceFileLocator::new(root.path(), WINDOWS_1252, 4);
        let text = locator.source_file("pkg", "Foo.java").unwrap().unwrap();
        assert_eq!(text, "// café\n");
    }

    #[test]
    fn test_first_match_wins() {
        let first = source_root("Foo.java", b"first");
        let second = source_root("Foo.java", b"second");
        let multi = MultiSourceFileLocator::for_directories(
            &[first.path().to_path_buf(), second.path().to_path_buf()],
            UTF_8,
            4,
        );
        assert_eq!(multi.len(), 2);
        assert_eq!(multi.source_file("pkg", "Foo.java").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn test_later_locator_fills_gaps() {
        let empty = tempfile::tempdir().unwrap();
        let second = source_root("Foo.java", b"second");
        let multi = MultiSourceFileLocator::new(4)
            .with(DirectorySourceFileLocator::from(empty.path().to_path_buf()))
            .with(DirectorySourceFileLocator::from(second.path().to_path_buf()));
        assert_eq!(multi.source_file("pkg", "Foo.java").unwrap().as_deref(), Some("second"));
    }

    #[test]
    fn test_expand_tabs() {
        assert_eq!(expand_tabs("\tx", 4), "    x");
        assert_eq!(expand_tabs("ab\tc\n\td", 4), "ab  c\n    d");
        assert_eq!(expand_tabs("no tabs", 4), "no tabs");
    }
}
