//! Compiled-unit descriptors.
//!
//! The analysis engine emits one `.covmap` JSON file per compiled unit,
//! mapping each source line of each method to the probes that guard it.
//!
//! ```json
//! {
//!   "id": 1311768467294899695,
//!   "name": "pkg/Foo",
//!   "source_file": "Foo.java",
//!   "methods": [
//!     { "name": "run", "desc": "()V",
//!       "lines": [ { "nr": 3, "instructions": 4, "probe": 0, "branches": [1, 2] } ] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

/// File extension of unit descriptors
pub const UNIT_EXTENSION: &str = "covmap";

/// One line entry of a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineProbe {
    /// Source line number, 0 when unknown
    #[serde(default)]
    pub nr: u32,
    /// Instructions attributed to this line
    pub instructions: u32,
    /// Probe guarding the instructions
    pub probe: usize,
    /// One probe per branch arm leaving this line
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub branches: Vec<usize>,
}

/// Method of a compiled unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodUnit {
    /// Method name
    pub name: String,
    /// Method descriptor
    #[serde(default)]
    pub desc: String,
    /// Line entries in code order
    #[serde(default)]
    pub lines: Vec<LineProbe>,
}

impl MethodUnit {
    /// First known source line
    #[must_use]
    pub fn first_line(&self) -> Option<u32> {
        self.lines.iter().map(|l| l.nr).filter(|&nr| nr > 0).min()
    }

    /// Total instructions of the method
    #[must_use]
    pub fn instruction_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.instructions)).sum()
    }
}

/// Structural description of one compiled unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitDescriptor {
    /// Class id, matches the execution data record
    pub id: u64,
    /// VM class name, e.g. `pkg/sub/Name`
    pub name: String,
    /// Name of the source file the unit was compiled from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_file: Option<String>,
    /// Number of probes the unit was instrumented with
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probe_count: Option<usize>,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodUnit>,
}

impl UnitDescriptor {
    /// Parse a descriptor from JSON
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Whether a path looks like a unit descriptor
    #[must_use]
    pub fn is_descriptor(path: &Path) -> bool {
        path.extension().is_some_and(|ext| ext == UNIT_EXTENSION)
    }

    /// Effective probe count: declared, or one past the highest referenced probe
    #[must_use]
    pub fn effective_probe_count(&self) -> usize {
        self.probe_count.unwrap_or_else(|| {
            self.referenced_probes()
                .max()
                .map_or(0, |highest| highest + 1)
        })
    }

    /// Package part of the name (`pkg/sub`), empty for the default package
    #[must_use]
    pub fn package_name(&self) -> &str {
        self.name.rsplit_once('/').map_or("", |(pkg, _)| pkg)
    }

    /// Check every probe reference against the probe count
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("unit has an empty name".to_string());
        }
        let count = self.effective_probe_count();
        if let Some(bad) = self.referenced_probes().find(|&p| p >= count) {
            return Err(format!(
                "probe {bad} out of range for {} ({count} probes)",
                self.name
            ));
        }
        Ok(())
    }

    fn referenced_probes(&self) -> impl Iterator<Item = usize> + '_ {
        self.methods
            .iter()
            .flat_map(|m| &m.lines)
            .flat_map(|l| std::iter::once(l.probe).chain(l.branches.iter().copied()))
    }
}
