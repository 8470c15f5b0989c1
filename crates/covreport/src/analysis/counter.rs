//! Coverage counters and line status.

use std::ops::{Add, AddAssign};

/// Kind of element a counter counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CounterEntity {
    /// Executable instructions
    Instruction,
    /// Branch arms
    Branch,
    /// Source lines
    Line,
    /// Cyclomatic complexity
    Complexity,
    /// Methods
    Method,
    /// Classes
    Class,
}

impl CounterEntity {
    /// All entities in report order
    pub const ALL: [Self; 6] = [
        Self::Instruction,
        Self::Branch,
        Self::Line,
        Self::Complexity,
        Self::Method,
        Self::Class,
    ];

    /// Upper-case name used in XML and CSV output
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instruction => "INSTRUCTION",
            Self::Branch => "BRANCH",
            Self::Line => "LINE",
            Self::Complexity => "COMPLEXITY",
            Self::Method => "METHOD",
            Self::Class => "CLASS",
        }
    }
}

/// Coverage status of a counter or line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverageStatus {
    /// Nothing to cover
    Empty,
    /// Nothing covered
    NotCovered,
    /// Some covered, some missed
    PartlyCovered,
    /// Everything covered
    FullyCovered,
}

impl CoverageStatus {
    /// Combine two statuses, e.g. instruction and branch status of a line
    #[must_use]
    pub const fn combine(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, s) | (s, Self::Empty) => s,
            (Self::NotCovered, Self::NotCovered) => Self::NotCovered,
            (Self::FullyCovered, Self::FullyCovered) => Self::FullyCovered,
            _ => Self::PartlyCovered,
        }
    }
}

/// Missed/covered pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Counter {
    /// Items not covered
    pub missed: u64,
    /// Items covered
    pub covered: u64,
}

impl Counter {
    /// Empty counter
    pub const EMPTY: Self = Self::new(0, 0);

    /// Create a counter
    #[must_use]
    pub const fn new(missed: u64, covered: u64) -> Self {
        Self { missed, covered }
    }

    /// One missed item
    #[must_use]
    pub const fn missed_one() -> Self {
        Self::new(1, 0)
    }

    /// One covered item
    #[must_use]
    pub const fn covered_one() -> Self {
        Self::new(0, 1)
    }

    /// Missed plus covered
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.missed + self.covered
    }

    /// Covered ratio in `0.0..=1.0`, `None` when empty
    #[must_use]
    pub fn covered_ratio(&self) -> Option<f64> {
        if self.total() == 0 {
            None
        } else {
            Some(self.covered as f64 / self.total() as f64)
        }
    }

    /// Missed ratio in `0.0..=1.0`, `None` when empty
    #[must_use]
    pub fn missed_ratio(&self) -> Option<f64> {
        self.covered_ratio().map(|r| 1.0 - r)
    }

    /// Status derived from the counts
    #[must_use]
    pub const fn status(&self) -> CoverageStatus {
        if self.total() == 0 {
            CoverageStatus::Empty
        } else if self.covered == 0 {
            CoverageStatus::NotCovered
        } else if self.missed == 0 {
            CoverageStatus::FullyCovered
        } else {
            CoverageStatus::PartlyCovered
        }
    }
}

impl Add for Counter {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.missed + rhs.missed, self.covered + rhs.covered)
    }
}

impl AddAssign for Counter {
    fn add_assign(&mut self, rhs: Self) {
        self.missed += rhs.missed;
        self.covered += rhs.covered;
    }
}

/// The six counters every coverage node carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    /// Instruction counter
    pub instruction: Counter,
    /// Branch counter
    pub branch: Counter,
    /// Line counter
    pub line: Counter,
    /// Complexity counter
    pub complexity: Counter,
    /// Method counter
    pub method: Counter,
    /// Class counter
    pub class: Counter,
}

impl Counters {
    /// Counter for an entity
    #[must_use]
    pub const fn get(&self, entity: CounterEntity) -> Counter {
        match entity {
            CounterEntity::Instruction => self.instruction,
            CounterEntity::Branch => self.branch,
            CounterEntity::Line => self.line,
            CounterEntity::Complexity => self.complexity,
            CounterEntity::Method => self.method,
            CounterEntity::Class => self.class,
        }
    }
}

impl AddAssign for Counters {
    fn add_assign(&mut self, rhs: Self) {
        self.instruction += rhs.instruction;
        self.branch += rhs.branch;
        self.line += rhs.line;
        self.complexity += rhs.complexity;
        self.method += rhs.method;
        self.class += rhs.class;
    }
}

/// Instruction and branch counters of one source line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineCounters {
    /// Instructions on the line
    pub instructions: Counter,
    /// Branch arms on the line
    pub branches: Counter,
}

impl LineCounters {
    /// Combined status of instructions and branches
    #[must_use]
    pub const fn status(&self) -> CoverageStatus {
        self.instructions.status().combine(self.branches.status())
    }

    /// Line-counter contribution of this line
    #[must_use]
    pub const fn line_counter(&self) -> Counter {
        if self.instructions.total() == 0 {
            Counter::EMPTY
        } else if self.instructions.covered > 0 {
            Counter::covered_one()
        } else {
            Counter::missed_one()
        }
    }
}

impl AddAssign for LineCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.instructions += rhs.instructions;
        self.branches += rhs.branches;
    }
}
