//! Loads execution data files into an [`ExecutionDataStore`].

use super::data::{ExecutionData, ExecutionDataStore, SessionInfo, SessionInfoStore};
use super::reader::{DecodeError, ExecutionDataReader, ExecutionDataVisitor};
use super::writer::ExecutionDataWriter;
use crate::result::{ReportError, ReportResult};
use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::Path;
use tracing::debug;

/// Loads one or more execution data files, merging their content
#[derive(Debug, Default)]
pub struct ExecFileLoader {
    store: ExecutionDataStore,
    sessions: SessionInfoStore,
}

struct StoreVisitor<'a> {
    store: &'a mut ExecutionDataStore,
    sessions: &'a mut SessionInfoStore,
}

impl ExecutionDataVisitor for StoreVisitor<'_> {
    fn visit_session_info(&mut self, info: SessionInfo) -> Result<(), DecodeError> {
        self.sessions.visit(info);
        Ok(())
    }

    fn visit_class_execution(&mut self, data: ExecutionData) -> Result<(), DecodeError> {
        self.store
            .put(data)
            .map_err(|e| DecodeError::Incompatible(e.to_string()))
    }
}

impl ExecFileLoader {
    /// Create an empty loader
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a file, merging it into what has been loaded so far
    ///
    /// Nothing is merged if the file fails to decode.
    pub fn load(&mut self, path: &Path) -> ReportResult<()> {
        let file = File::open(path).map_err(|e| ReportError::DataLoad {
            path: path.to_path_buf(),
            message: "cannot open execution data file".to_string(),
            source: Some(e),
        })?;
        self.load_from(BufReader::new(file))
            .map_err(|e| Self::decode_error(path, e))?;
        debug!(
            path = %path.display(),
            classes = self.store.len(),
            "loaded execution data"
        );
        Ok(())
    }

    /// Load from any byte source
    pub fn load_from<R: Read>(&mut self, input: R) -> Result<(), DecodeError> {
        let mut store = self.store.clone();
        let mut sessions = self.sessions.clone();
        ExecutionDataReader::new(input).read(&mut StoreVisitor {
            store: &mut store,
            sessions: &mut sessions,
        })?;
        self.store = store;
        self.sessions = sessions;
        Ok(())
    }

    /// Write everything loaded so far to `path`
    pub fn save(&self, path: &Path) -> ReportResult<()> {
        let file = File::create(path).map_err(|e| ReportError::emission(path, e))?;
        let mut writer = ExecutionDataWriter::new(BufWriter::new(file))
            .map_err(|e| ReportError::emission(path, e))?;
        for info in self.sessions.infos() {
            writer
                .write_session_info(&info)
                .map_err(|e| ReportError::emission(path, e))?;
        }
        for data in self.store.contents() {
            writer
                .write_execution_data(data)
                .map_err(|e| ReportError::emission(path, e))?;
        }
        writer.finish().map_err(|e| ReportError::emission(path, e))?;
        Ok(())
    }

    /// Loaded execution records
    #[must_use]
    pub fn execution_data_store(&self) -> &ExecutionDataStore {
        &self.store
    }

    /// Loaded session infos
    #[must_use]
    pub fn session_info_store(&self) -> &SessionInfoStore {
        &self.sessions
    }

    /// Consume the loader
    #[must_use]
    pub fn into_parts(self) -> (ExecutionDataStore, SessionInfoStore) {
        (self.store, self.sessions)
    }

    fn decode_error(path: &Path, err: DecodeError) -> ReportError {
        match err {
            DecodeError::Io(source) => ReportError::DataLoad {
                path: path.to_path_buf(),
                message: "read failed".to_string(),
                source: Some(source),
            },
            other => ReportError::data_load(path, other.to_string()),
        }
    }
}
