//! Block-structured execution data decoding.
//!
//! ```text
//! +------+----------------------------------------------+
//! | 0x01 | magic (u16 BE) | version (u16 BE)            |
//! | 0x10 | id (utf) | start (i64 BE) | dump (i64 BE)    |
//! | 0x11 | id (i64 BE) | name (utf) | probes (bool[])   |
//! +------+----------------------------------------------+
//! ```
//!
//! `utf` is a `u16` byte length followed by modified UTF-8 (NUL as `C0 80`,
//! supplementary characters as two encoded surrogates), `bool[]` is a varint
//! length followed by the probes packed eight per byte, LSB first.

use super::data::{ClassId, ExecutionData, SessionInfo};
use super::{
    BLOCK_CMD_DUMP, BLOCK_CMD_OK, BLOCK_EXECUTIONDATA, BLOCK_HEADER, BLOCK_SESSIONINFO,
    FORMAT_VERSION, MAGIC_NUMBER,
};
use std::io::{self, Read};
use thiserror::Error;

/// Errors raised while decoding execution data
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid execution data file (magic {0:#06x})")]
    InvalidMagic(u16),

    #[error("Incompatible execution data version {0:#06x}")]
    IncompatibleVersion(u16),

    #[error("Unknown block type {0:#04x}")]
    UnknownBlock(u8),

    #[error("Missing file header, found block {0:#04x}")]
    MissingHeader(u8),

    #[error("Truncated {0}")]
    Truncated(&'static str),

    #[error("Invalid UTF-8 in {0}")]
    InvalidString(&'static str),

    #[error("Probe array too large: {0}")]
    ProbeArrayTooLarge(usize),

    #[error("Incompatible execution data: {0}")]
    Incompatible(String),
}

/// Upper bound for a single probe array
const MAX_PROBES: usize = 1 << 24;

/// Receiver of decoded blocks
pub trait ExecutionDataVisitor {
    /// A session info block was read
    fn visit_session_info(&mut self, info: SessionInfo) -> Result<(), DecodeError>;

    /// An execution data block was read
    fn visit_class_execution(&mut self, data: ExecutionData) -> Result<(), DecodeError>;
}

/// Streaming decoder for the execution data format
#[derive(Debug)]
pub struct ExecutionDataReader<R> {
    input: R,
    first_block: bool,
}

impl<R: Read> ExecutionDataReader<R> {
    /// Wrap a byte source
    pub fn new(input: R) -> Self {
        Self {
            input,
            first_block: true,
        }
    }

    /// Decode all blocks, forwarding them to `visitor`
    pub fn read<V: ExecutionDataVisitor>(&mut self, visitor: &mut V) -> Result<(), DecodeError> {
        loop {
            let Some(block) = self.read_block_type()? else {
                return Ok(());
            };
            if self.first_block && block != BLOCK_HEADER {
                return Err(DecodeError::MissingHeader(block));
            }
            self.first_block = false;

            match block {
                BLOCK_HEADER => self.read_header()?,
                BLOCK_SESSIONINFO => {
                    let info = self.read_session_info()?;
                    visitor.visit_session_info(info)?;
                }
                BLOCK_EXECUTIONDATA => {
                    let data = self.read_execution_data()?;
                    visitor.visit_class_execution(data)?;
                }
                BLOCK_CMD_OK | BLOCK_CMD_DUMP => {}
                other => return Err(DecodeError::UnknownBlock(other)),
            }
        }
    }

    fn read_block_type(&mut self) -> Result<Option<u8>, DecodeError> {
        let mut buf = [0u8; 1];
        loop {
            match self.input.read(&mut buf) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(buf[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(DecodeError::Io(e)),
            }
        }
    }

    fn read_header(&mut self) -> Result<(), DecodeError> {
        let magic = self.read_u16("header")?;
        if magic != MAGIC_NUMBER {
            return Err(DecodeError::InvalidMagic(magic));
        }
        let version = self.read_u16("header")?;
        if version != FORMAT_VERSION {
            return Err(DecodeError::IncompatibleVersion(version));
        }
        Ok(())
    }

    fn read_session_info(&mut self) -> Result<SessionInfo, DecodeError> {
        let id = self.read_utf("session id")?;
        let start = self.read_i64("session start")?;
        let dump = self.read_i64("session dump")?;
        Ok(SessionInfo::new(id, start, dump))
    }

    fn read_execution_data(&mut self) -> Result<ExecutionData, DecodeError> {
        let id = self.read_i64("class id")? as u64;
        let name = self.read_utf("class name")?;
        let probes = self.read_probes()?;
        Ok(ExecutionData::new(ClassId::new(id), name, probes))
    }

    fn read_exact(&mut self, buf: &mut [u8], what: &'static str) -> Result<(), DecodeError> {
        self.input.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                DecodeError::Truncated(what)
            } else {
                DecodeError::Io(e)
            }
        })
    }

    fn read_u8(&mut self, what: &'static str) -> Result<u8, DecodeError> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf, what)?;
        Ok(buf[0])
    }

    fn read_u16(&mut self, what: &'static str) -> Result<u16, DecodeError> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf, what)?;
        Ok(u16::from_be_bytes(buf))
    }

    fn read_i64(&mut self, what: &'static str) -> Result<i64, DecodeError> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf, what)?;
        Ok(i64::from_be_bytes(buf))
    }

    fn read_utf(&mut self, what: &'static str) -> Result<String, DecodeError> {
        let len = usize::from(self.read_u16(what)?);
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf, what)?;
        decode_modified_utf8(&buf).ok_or(DecodeError::InvalidString(what))
    }

    fn read_var_int(&mut self, what: &'static str) -> Result<usize, DecodeError> {
        let mut value: usize = 0;
        let mut shift = 0u32;
        loop {
            let byte = self.read_u8(what)?;
            value |= usize::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift > 28 {
                return Err(DecodeError::Truncated(what));
            }
        }
    }

    fn read_probes(&mut self) -> Result<Vec<bool>, DecodeError> {
        let len = self.read_var_int("probe count")?;
        if len > MAX_PROBES {
            return Err(DecodeError::ProbeArrayTooLarge(len));
        }
        let mut packed = vec![0u8; len.div_ceil(8)];
        self.read_exact(&mut packed, "probe array")?;
        Ok((0..len)
            .map(|i| packed[i / 8] & (1 << (i % 8)) != 0)
            .collect())
    }
}

/// Decode modified UTF-8 into UTF-16 units, then join surrogate pairs
fn decode_modified_utf8(bytes: &[u8]) -> Option<String> {
    let mut units = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied();
    while let Some(b0) = iter.next() {
        let unit = match b0 {
            0x00..=0x7F => u16::from(b0),
            0xC0..=0xDF => {
                let b1 = continuation(iter.next())?;
                (u16::from(b0 & 0x1F) << 6) | b1
            }
            0xE0..=0xEF => {
                let b1 = continuation(iter.next())?;
                let b2 = continuation(iter.next())?;
                (u16::from(b0 & 0x0F) << 12) | (b1 << 6) | b2
            }
            _ => return None,
        };
        units.push(unit);
    }
    String::from_utf16(&units).ok()
}

fn continuation(byte: Option<u8>) -> Option<u16> {
    byte.filter(|b| b & 0xC0 == 0x80).map(|b| u16::from(b & 0x3F))
}
