//! In-memory execution data: per-class probe records and session metadata.

use crate::result::{ReportError, ReportResult};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifier of a compiled unit as recorded by the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClassId(u64);

impl ClassId {
    /// Create a new class ID
    #[inline]
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Probe record of one class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionData {
    id: ClassId,
    name: String,
    probes: Vec<bool>,
}

impl ExecutionData {
    /// Create a record from its probe array
    #[must_use]
    pub fn new(id: ClassId, name: impl Into<String>, probes: Vec<bool>) -> Self {
        Self {
            id,
            name: name.into(),
            probes,
        }
    }

    /// Class identifier
    #[must_use]
    pub const fn id(&self) -> ClassId {
        self.id
    }

    /// VM class name, e.g. `pkg/sub/Name`
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Probe array
    #[must_use]
    pub fn probes(&self) -> &[bool] {
        &self.probes
    }

    /// Number of probes that fired
    #[must_use]
    pub fn hit_count(&self) -> usize {
        self.probes.iter().filter(|&&p| p).count()
    }

    /// Whether any probe fired
    #[must_use]
    pub fn has_hits(&self) -> bool {
        self.probes.iter().any(|&p| p)
    }

    /// Check that `other` describes the same class with the same probe layout
    pub fn assert_compatible(&self, other: &ExecutionData) -> ReportResult<()> {
        if self.id != other.id {
            return Err(ReportError::config(format!(
                "different class ids {} and {}",
                self.id, other.id
            )));
        }
        if self.name != other.name {
            return Err(ReportError::config(format!(
                "different class names {} and {} for id {}",
                self.name, other.name, self.id
            )));
        }
        if self.probes.len() != other.probes.len() {
            return Err(ReportError::config(format!(
                "incompatible execution data for class {} with id {}",
                self.name, self.id
            )));
        }
        Ok(())
    }

    /// OR the probes of a compatible record into this one
    pub fn merge(&mut self, other: &ExecutionData) -> ReportResult<()> {
        self.assert_compatible(other)?;
        for (mine, theirs) in self.probes.iter_mut().zip(&other.probes) {
            *mine |= *theirs;
        }
        Ok(())
    }
}

/// Accumulated execution records keyed by class id
#[derive(Debug, Clone, Default)]
pub struct ExecutionDataStore {
    entries: BTreeMap<ClassId, ExecutionData>,
    names: HashMap<String, ClassId>,
}

impl ExecutionDataStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record, merging with an existing record of the same id
    pub fn put(&mut self, data: ExecutionData) -> ReportResult<()> {
        if let Some(existing) = self.entries.get_mut(&data.id) {
            existing.merge(&data)?;
        } else {
            let _ = self.names.insert(data.name.clone(), data.id);
            let _ = self.entries.insert(data.id, data);
        }
        Ok(())
    }

    /// Look up the record for a class id
    #[must_use]
    pub fn get(&self, id: ClassId) -> Option<&ExecutionData> {
        self.entries.get(&id)
    }

    /// Whether a record with this class name exists under any id
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains_key(name)
    }

    /// All records ordered by class id
    pub fn contents(&self) -> impl Iterator<Item = &ExecutionData> {
        self.entries.values()
    }

    /// Number of records
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Metadata about one collection session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session identifier, usually host name plus a random suffix
    pub id: String,
    /// Start of the session, epoch milliseconds
    pub start: i64,
    /// Time the data was dumped, epoch milliseconds
    pub dump: i64,
}

impl SessionInfo {
    /// Create a session info record
    #[must_use]
    pub fn new(id: impl Into<String>, start: i64, dump: i64) -> Self {
        Self {
            id: id.into(),
            start,
            dump,
        }
    }
}

/// Collection of session infos
#[derive(Debug, Clone, Default)]
pub struct SessionInfoStore {
    infos: Vec<SessionInfo>,
}

impl SessionInfoStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a session
    pub fn visit(&mut self, info: SessionInfo) {
        self.infos.push(info);
    }

    /// Sessions sorted by start time, then id
    #[must_use]
    pub fn infos(&self) -> Vec<SessionInfo> {
        let mut infos = self.infos.clone();
        infos.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        infos
    }

    /// Whether any session was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.infos.is_empty()
    }
}
