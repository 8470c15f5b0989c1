//! Coverage nodes: method, class, source file, package, bundle.
//!
//! Counters of every node above the class level are sums of the class
//! counters below it, so totals are conserved across the tree.

use super::counter::{Counter, Counters, LineCounters};
use super::unit::{MethodUnit, UnitDescriptor};
use crate::exec::ClassId;
use std::collections::BTreeMap;

/// Per-line counters keyed by line number
pub type LineMap = BTreeMap<u32, LineCounters>;

/// Common accessors of coverage nodes
pub trait CoverageNode {
    /// Display name of the node
    fn name(&self) -> &str;

    /// Counters of the node
    fn counters(&self) -> &Counters;
}

/// Coverage of one method
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodCoverage {
    name: String,
    desc: String,
    first_line: Option<u32>,
    counters: Counters,
}

impl MethodCoverage {
    fn analyze(unit: &MethodUnit, probes: Option<&[bool]>) -> (Self, LineMap) {
        let hit = |probe: usize| probes.is_some_and(|p| p.get(probe).copied().unwrap_or(false));

        let mut counters = Counters::default();
        let mut lines = LineMap::new();

        for entry in &unit.lines {
            let instructions = if hit(entry.probe) {
                Counter::new(0, u64::from(entry.instructions))
            } else {
                Counter::new(u64::from(entry.instructions), 0)
            };
            let covered_arms = entry.branches.iter().filter(|&&b| hit(b)).count() as u64;
            let total_arms = entry.branches.len() as u64;
            let branches = Counter::new(total_arms - covered_arms, covered_arms);

            if total_arms > 1 {
                let c = covered_arms.saturating_sub(1);
                let m = total_arms.saturating_sub(c + 1);
                counters.complexity += Counter::new(m, c);
            }

            counters.instruction += instructions;
            counters.branch += branches;
            if entry.nr > 0 {
                *lines.entry(entry.nr).or_default() += LineCounters {
                    instructions,
                    branches,
                };
            }
        }

        let base = if counters.instruction.covered > 0 {
            Counter::covered_one()
        } else {
            Counter::missed_one()
        };
        counters.method = base;
        counters.complexity += base;
        counters.line = lines
            .values()
            .fold(Counter::EMPTY, |acc, l| acc + l.line_counter());

        (
            Self {
                name: unit.name.clone(),
                desc: unit.desc.clone(),
                first_line: unit.first_line(),
                counters,
            },
            lines,
        )
    }

    /// Method descriptor
    #[must_use]
    pub fn desc(&self) -> &str {
        &self.desc
    }

    /// First source line of the method
    #[must_use]
    pub const fn first_line(&self) -> Option<u32> {
        self.first_line
    }
}

impl CoverageNode for MethodCoverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Coverage of one compiled unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassCoverage {
    id: ClassId,
    name: String,
    source_file: Option<String>,
    no_match: bool,
    methods: Vec<MethodCoverage>,
    lines: LineMap,
    counters: Counters,
}

impl ClassCoverage {
    /// Replay a unit descriptor against its probe array
    ///
    /// `probes` is `None` when the store has no record for the unit; every
    /// counter then reports zero coverage. `no_match` marks units whose name
    /// is present in the execution data under a different id.
    #[must_use]
    pub fn analyze(unit: &UnitDescriptor, probes: Option<&[bool]>, no_match: bool) -> Self {
        let mut counters = Counters::default();
        let mut lines = LineMap::new();
        let mut methods = Vec::new();

        for method in unit.methods.iter().filter(|m| m.instruction_count() > 0) {
            let (coverage, method_lines) = MethodCoverage::analyze(method, probes);
            counters.instruction += coverage.counters.instruction;
            counters.branch += coverage.counters.branch;
            counters.complexity += coverage.counters.complexity;
            counters.method += coverage.counters.method;
            for (nr, line) in method_lines {
                *lines.entry(nr).or_default() += line;
            }
            methods.push(coverage);
        }

        counters.line = lines
            .values()
            .fold(Counter::EMPTY, |acc, l| acc + l.line_counter());
        counters.class = if counters.method.covered > 0 {
            Counter::covered_one()
        } else {
            Counter::missed_one()
        };

        Self {
            id: ClassId::new(unit.id),
            name: unit.name.clone(),
            source_file: unit.source_file.clone(),
            no_match,
            methods,
            lines,
            counters,
        }
    }

    /// Class id
    #[must_use]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    /// Package in VM form (`pkg/sub`), empty for the default package
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name.rsplit_once('/').map_or("", |(pkg, _)| pkg)
    }

    /// Name without the package (`Outer$Inner`)
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.name.rsplit_once('/').map_or(&self.name, |(_, n)| n)
    }

    /// Source file name, if the unit recorded one
    #[must_use]
    pub fn source_file(&self) -> Option<&str> {
        self.source_file.as_deref()
    }

    /// Whether execution data exists for this name under another id
    #[must_use]
    pub const fn is_no_match(&self) -> bool {
        self.no_match
    }

    /// Methods with code
    #[must_use]
    pub fn methods(&self) -> &[MethodCoverage] {
        &self.methods
    }

    /// Per-line counters
    #[must_use]
    pub const fn lines(&self) -> &LineMap {
        &self.lines
    }

    /// Whether the unit has any instructions at all
    #[must_use]
    pub const fn has_code(&self) -> bool {
        self.counters.instruction.total() > 0
    }
}

impl CoverageNode for ClassCoverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Coverage of one source file, merged from the classes compiled from it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileCoverage {
    name: String,
    package: String,
    lines: LineMap,
    counters: Counters,
}

impl SourceFileCoverage {
    pub(crate) fn new(name: impl Into<String>, package: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            package: package.into(),
            lines: LineMap::new(),
            counters: Counters::default(),
        }
    }

    pub(crate) fn add_class(&mut self, class: &ClassCoverage) {
        self.counters += class.counters;
        for (nr, line) in &class.lines {
            *self.lines.entry(*nr).or_default() += *line;
        }
    }

    /// Package in VM form
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.package
    }

    /// Path relative to a source root, e.g. `pkg/sub/Foo.java`
    #[must_use]
    pub fn relative_path(&self) -> String {
        if self.package.is_empty() {
            self.name.clone()
        } else {
            format!("{}/{}", self.package, self.name)
        }
    }

    /// Per-line counters
    #[must_use]
    pub const fn lines(&self) -> &LineMap {
        &self.lines
    }
}

impl CoverageNode for SourceFileCoverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Coverage of one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageCoverage {
    name: String,
    classes: Vec<ClassCoverage>,
    source_files: Vec<SourceFileCoverage>,
    counters: Counters,
}

impl PackageCoverage {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            classes: Vec::new(),
            source_files: Vec::new(),
            counters: Counters::default(),
        }
    }

    pub(crate) fn add_class(&mut self, class: ClassCoverage) {
        self.counters += class.counters;
        if let Some(file) = class.source_file() {
            let position = self.source_files.iter().position(|s| s.name == file);
            let index = position.unwrap_or_else(|| {
                self.source_files
                    .push(SourceFileCoverage::new(file, self.name.clone()));
                self.source_files.len() - 1
            });
            self.source_files[index].add_class(&class);
        }
        self.classes.push(class);
    }

    /// Package name with dots (`pkg.sub`), `default` for the default package
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.name.is_empty() {
            "default".to_string()
        } else {
            self.name.replace('/', ".")
        }
    }

    /// Classes in analysis order
    #[must_use]
    pub fn classes(&self) -> &[ClassCoverage] {
        &self.classes
    }

    /// Source files in first-seen order
    #[must_use]
    pub fn source_files(&self) -> &[SourceFileCoverage] {
        &self.source_files
    }
}

impl CoverageNode for PackageCoverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }
}

/// Aggregated coverage of every analyzed class under one display name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleCoverage {
    name: String,
    packages: Vec<PackageCoverage>,
    counters: Counters,
}

impl BundleCoverage {
    pub(crate) fn new(name: impl Into<String>, packages: Vec<PackageCoverage>) -> Self {
        let mut counters = Counters::default();
        for package in &packages {
            counters += package.counters;
        }
        Self {
            name: name.into(),
            packages,
            counters,
        }
    }

    /// Packages in first-seen order
    #[must_use]
    pub fn packages(&self) -> &[PackageCoverage] {
        &self.packages
    }

    /// Every class of every package
    pub fn classes(&self) -> impl Iterator<Item = &ClassCoverage> {
        self.packages.iter().flat_map(|p| p.classes.iter())
    }

    /// Look up a class by VM name
    #[must_use]
    pub fn class(&self, name: &str) -> Option<&ClassCoverage> {
        self.classes().find(|c| c.name == name)
    }
}

impl CoverageNode for BundleCoverage {
    fn name(&self) -> &str {
        &self.name
    }

    fn counters(&self) -> &Counters {
        &self.counters
    }
}
