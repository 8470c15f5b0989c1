//! Execution data encoding, the inverse of [`ExecutionDataReader`](super::ExecutionDataReader).

use super::data::{ExecutionData, SessionInfo};
use super::{BLOCK_EXECUTIONDATA, BLOCK_HEADER, BLOCK_SESSIONINFO, FORMAT_VERSION, MAGIC_NUMBER};
use std::io::{self, Write};

/// Writes the execution data format, header first
#[derive(Debug)]
pub struct ExecutionDataWriter<W: Write> {
    output: W,
}

impl<W: Write> ExecutionDataWriter<W> {
    /// Wrap a byte sink and emit the file header
    pub fn new(mut output: W) -> io::Result<Self> {
        output.write_all(&[BLOCK_HEADER])?;
        output.write_all(&MAGIC_NUMBER.to_be_bytes())?;
        output.write_all(&FORMAT_VERSION.to_be_bytes())?;
        Ok(Self { output })
    }

    /// Append a session info block
    pub fn write_session_info(&mut self, info: &SessionInfo) -> io::Result<()> {
        self.output.write_all(&[BLOCK_SESSIONINFO])?;
        self.write_utf(&info.id)?;
        self.output.write_all(&info.start.to_be_bytes())?;
        self.output.write_all(&info.dump.to_be_bytes())
    }

    /// Append an execution data block
    pub fn write_execution_data(&mut self, data: &ExecutionData) -> io::Result<()> {
        self.output.write_all(&[BLOCK_EXECUTIONDATA])?;
        self.output.write_all(&(data.id().as_u64() as i64).to_be_bytes())?;
        self.write_utf(data.name())?;
        self.write_probes(data.probes())
    }

    /// Flush and return the underlying sink
    pub fn finish(mut self) -> io::Result<W> {
        self.output.flush()?;
        Ok(self.output)
    }

    fn write_utf(&mut self, value: &str) -> io::Result<()> {
        let encoded = encode_modified_utf8(value);
        let len = u16::try_from(encoded.len()).map_err(|_| {
            io::Error::new(io::ErrorKind::InvalidInput, "string longer than 65535 bytes")
        })?;
        self.output.write_all(&len.to_be_bytes())?;
        self.output.write_all(&encoded)
    }

    fn write_var_int(&mut self, mut value: usize) -> io::Result<()> {
        while value >= 0x80 {
            self.output.write_all(&[(value as u8 & 0x7F) | 0x80])?;
            value >>= 7;
        }
        self.output.write_all(&[value as u8])
    }

    fn write_probes(&mut self, probes: &[bool]) -> io::Result<()> {
        self.write_var_int(probes.len())?;
        let mut packed = vec![0u8; probes.len().div_ceil(8)];
        for (i, _) in probes.iter().enumerate().filter(|(_, &hit)| hit) {
            packed[i / 8] |= 1 << (i % 8);
        }
        self.output.write_all(&packed)
    }
}

/// Encode each UTF-16 unit separately; NUL takes two bytes
fn encode_modified_utf8(value: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::exec::data::ClassId;

    #[test]
    fn test_header_bytes() {
        let mut bytes = Vec::new();
        let _ = ExecutionDataWriter::new(&mut bytes).unwrap();
        assert_eq!(bytes, vec![0x01, 0xC0, 0xC0, 0x10, 0x07]);
    }

    #[test]
    fn test_var_int_multi_byte() {
        let mut bytes = Vec::new();
        {
            let mut writer = ExecutionDataWriter::new(&mut bytes).unwrap();
            let probes = vec![false; 200];
            writer
                .write_execution_data(&ExecutionData::new(ClassId::new(1), "A", probes))
                .unwrap();
        }
        // header(5) + type(1) + id(8) + name(2+1) = 17, then varint 200 = 0xC8 0x01
        assert_eq!(&bytes[17..19], &[0xC8, 0x01]);
        assert_eq!(bytes.len(), 19 + 25);
    }

    #[test]
    fn test_session_info_block() {
        let mut bytes = Vec::new();
        {
            let mut writer = ExecutionDataWriter::new(&mut bytes).unwrap();
            writer
                .write_session_info(&SessionInfo::new("ab", 1, 2))
                .unwrap();
        }
        assert_eq!(bytes[5], 0x10);
        assert_eq!(&bytes[6..10], &[0x00, 0x02, b'a', b'b']);
        assert_eq!(bytes.len(), 5 + 1 + 4 + 16);
    }

    #[test]
    fn test_rejects_oversized_string() {
        let mut bytes = Vec::new();
        let mut writer = ExecutionDataWriter::new(&mut bytes).unwrap();
        let name = "x".repeat(70_000);
        let result = writer.write_session_info(&SessionInfo::new(name, 0, 0));
        assert!(result.is_err());
    }

    #[test]
    fn test_modified_utf8_bytes() {
        assert_eq!(encode_modified_utf8("a\0"), vec![b'a', 0xC0, 0x80]);
        assert_eq!(encode_modified_utf8("\u{e9}"), vec![0xC3, 0xA9]);
        assert_eq!(
            encode_modified_utf8("\u{1D49C}"),
            vec![0xED, 0xA0, 0xB5, 0xED, 0xB2, 0x9C]
        );
    }
}
