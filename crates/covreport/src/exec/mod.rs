//! Execution data: the raw per-class probe records written by the
//! instrumentation agent, plus the session metadata stored alongside them.

mod data;
mod loader;
mod reader;
mod writer;

pub use data::{ClassId, ExecutionData, ExecutionDataStore, SessionInfo, SessionInfoStore};
pub use loader::ExecFileLoader;
pub use reader::{DecodeError, ExecutionDataReader, ExecutionDataVisitor};
pub use writer::ExecutionDataWriter;

/// File header block
pub const BLOCK_HEADER: u8 = 0x01;
/// Session info block
pub const BLOCK_SESSIONINFO: u8 = 0x10;
/// Per-class execution data block
pub const BLOCK_EXECUTIONDATA: u8 = 0x11;
/// Remote command acknowledgement
pub const BLOCK_CMD_OK: u8 = 0x20;
/// Remote dump command
pub const BLOCK_CMD_DUMP: u8 = 0x40;

/// Magic number opening every file
pub const MAGIC_NUMBER: u16 = 0xC0C0;
/// Supported format version
pub const FORMAT_VERSION: u16 = 0x1007;
