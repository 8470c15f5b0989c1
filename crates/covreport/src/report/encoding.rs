//! Text encodings of report output and source input.

use crate::result::{ReportError, ReportResult};
use encoding_rs::{CoderResult, Encoder, EncoderResult, Encoding, UTF_8};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

const CHUNK: usize = 8 * 1024;

/// Resolve an encoding label; `None` selects the platform default (UTF-8)
pub fn resolve_encoding(label: Option<&str>) -> ReportResult<&'static Encoding> {
    match label.map(str::trim) {
        None | Some("") => Ok(UTF_8),
        Some(label) => Encoding::for_label(label.as_bytes()).ok_or_else(|| {
            ReportError::UnsupportedEncoding {
                label: label.to_string(),
            }
        }),
    }
}

/// Decode source bytes, honouring a byte order mark if present
#[must_use]
pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> String {
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}

/// What to write for a character the output encoding cannot represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unmappable {
    /// Decimal numeric character reference such as `&#960;`, for XML and HTML
    #[default]
    CharacterReference,
    /// A literal `?`, for formats without entity syntax such as CSV
    QuestionMark,
}

/// Streams text into a byte sink through an encoder
///
/// Characters the encoding cannot represent are written according to
/// [`Unmappable`]: numeric character references by default, which only XML
/// and HTML readers resolve back.
pub struct EncodedWriter<W: Write> {
    inner: W,
    encoding: &'static Encoding,
    encoder: Encoder,
    unmappable: Unmappable,
    buffer: Vec<u8>,
}

impl<W: Write> std::fmt::Debug for EncodedWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncodedWriter")
            .field("encoding", &self.encoding.name())
            .finish_non_exhaustive()
    }
}

impl<W: Write> EncodedWriter<W> {
    /// Wrap a sink
    ///
    /// Encodings that cannot be produced as output (UTF-16, replacement)
    /// fall back to their output encoding, see [`Encoding::output_encoding`].
    pub fn new(inner: W, encoding: &'static Encoding) -> Self {
        let encoding = encoding.output_encoding();
        Self {
            inner,
            encoding,
            encoder: encoding.new_encoder(),
            unmappable: Unmappable::default(),
            buffer: Vec::with_capacity(CHUNK),
        }
    }

    /// Choose the substitute for unmappable characters
    #[must_use]
    pub fn with_unmappable(mut self, unmappable: Unmappable) -> Self {
        self.unmappable = unmappable;
        self
    }

    /// Effective output encoding
    #[must_use]
    pub const fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Encode and write a piece of text
    pub fn write_str(&mut self, text: &str) -> io::Result<()> {
        self.encode(text, false)
    }

    /// Flush pending encoder state and return the sink
    pub fn finish(mut self) -> io::Result<W> {
        self.encode("", true)?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn encode(&mut self, text: &str, last: bool) -> io::Result<()> {
        match self.unmappable {
            Unmappable::CharacterReference => self.encode_with_references(text, last),
            Unmappable::QuestionMark => self.encode_with_question_marks(text, last),
        }
    }

    fn encode_with_question_marks(&mut self, mut text: &str, last: bool) -> io::Result<()> {
        loop {
            self.buffer.clear();
            let (result, read) = self.encoder.encode_from_utf8_to_vec_without_replacement(
                text,
                &mut self.buffer,
                last,
            );
            self.inner.write_all(&self.buffer)?;
            text = &text[read..];
            match result {
                EncoderResult::InputEmpty => return Ok(()),
                EncoderResult::OutputFull => {}
                EncoderResult::Unmappable(_) => self.inner.write_all(b"?")?,
            }
        }
    }

    fn encode_with_references(&mut self, mut text: &str, last: bool) -> io::Result<()> {
        loop {
            self.buffer.clear();
            let (result, read, _) =
                self.encoder
                    .encode_from_utf8_to_vec(text, &mut self.buffer, last);
            self.inner.write_all(&self.buffer)?;
            text = &text[read..];
            if result == CoderResult::InputEmpty {
                return Ok(());
            }
        }
    }
}

/// Encode `text` into `path`, replacing any existing file
pub fn write_encoded(
    path: &Path,
    text: &str,
    encoding: &'static Encoding,
    unmappable: Unmappable,
) -> ReportResult<()> {
    let write = || -> io::Result<()> {
        let file = File::create(path)?;
        let mut writer =
            EncodedWriter::new(BufWriter::new(file), encoding).with_unmappable(unmappable);
        writer.write_str(text)?;
        let _ = writer.finish()?;
        Ok(())
    };
    write().map_err(|e| ReportError::emission(path, e))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1252};

    fn encode(text: &str, encoding: &'static Encoding) -> Vec<u8> {
        let mut writer = EncodedWriter::new(Vec::new(), encoding);
        writer.write_str(text).unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn test_resolve_default_is_utf8() {
        assert_eq!(resolve_encoding(None).unwrap(), UTF_8);
        assert_eq!(resolve_encoding(Some(" ")).unwrap(), UTF_8);
    }

    #[test]
    fn test_resolve_labels() {
        assert_eq!(resolve_encoding(Some("ISO-8859-1")).unwrap(), WINDOWS_1252);
        assert_eq!(resolve_encoding(Some("utf-8")).unwrap(), UTF_8);
    }

    #[test]
    fn test_resolve_unknown_label() {
        let err = resolve_encoding(Some("klingon")).unwrap_err();
        assert!(matches!(err, ReportError::UnsupportedEncoding { .. }));
    }

    #[test]
    fn test_latin1_output() {
        assert_eq!(encode("Größe", WINDOWS_1252), b"Gr\xf6\xdfe");
    }

    #[test]
    fn test_unmappable_becomes_character_reference() {
        assert_eq!(encode("π", WINDOWS_1252), b"&#960;");
    }

    #[test]
    fn test_unmappable_becomes_question_mark() {
        let mut writer =
            EncodedWriter::new(Vec::new(), WINDOWS_1252).with_unmappable(Unmappable::QuestionMark);
        writer.write_str("a\u{3c0}b\u{1D49C}\u{e4}").unwrap();
        assert_eq!(writer.finish().unwrap(), b"a?b?\xe4");
    }

    #[test]
    fn test_question_marks_across_chunks() {
        let text = "\u{3c0}x".repeat(CHUNK);
        let mut writer =
            EncodedWriter::new(Vec::new(), WINDOWS_1252).with_unmappable(Unmappable::QuestionMark);
        writer.write_str(&text).unwrap();
        assert_eq!(writer.finish().unwrap(), "?x".repeat(CHUNK).into_bytes());
    }

    #[test]
    fn test_large_input_spans_chunks() {
        let text = "ä".repeat(CHUNK * 3);
        let bytes = encode(&text, WINDOWS_1252);
        assert_eq!(bytes.len(), CHUNK * 3);
        assert!(bytes.iter().all(|&b| b == 0xe4));
    }

    #[test]
    fn test_utf16_falls_back_to_utf8() {
        let writer = EncodedWriter::new(Vec::new(), UTF_16LE);
        assert_eq!(writer.encoding(), UTF_8);
    }

    #[test]
    fn test_decode_latin1() {
        assert_eq!(decode(b"caf\xe9", WINDOWS_1252), "café");
    }

    #[test]
    fn test_write_encoded_into_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/file.csv");
        let err = write_encoded(&path, "x", UTF_8, Unmappable::QuestionMark).unwrap_err();
        assert!(matches!(err, ReportError::Emission { .. }));
    }
}
