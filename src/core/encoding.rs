//! XML Encoding Detection
//!
//! Detects the encoding of a stream from its first bytes. Only UTF-8 is
//! decoded; a UTF-8 byte order mark is skipped and UTF-16 input is reported
//! so the reader can reject it.

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Encoding of XML input, judged from byte order mark or initial bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from the start of a stream.
    ///
    /// Returns the encoding and the length of the byte order mark to skip, or
    /// `None` while too few bytes have arrived to decide. Pass `at_end` once
    /// no more input will follow.
    pub fn detect(prefix: &[u8], at_end: bool) -> Option<(Self, usize)> {
        if prefix.starts_with(UTF8_BOM) {
            return Some((XmlEncoding::Utf8, UTF8_BOM.len()));
        }
        if !at_end && (prefix.len() < 2 || UTF8_BOM.starts_with(prefix)) {
            return None;
        }

        let encoding = match prefix {
            // UTF-16 LE BOM: 0xFF 0xFE
            [0xFF, 0xFE, ..] => XmlEncoding::Utf16Le,
            // UTF-16 BE BOM: 0xFE 0xFF
            [0xFE, 0xFF, ..] => XmlEncoding::Utf16Be,
            // No BOM - check for UTF-16 pattern (< followed by null or null followed by <)
            [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            _ => XmlEncoding::Utf8,
        };
        Some((encoding, 0))
    }

    pub fn name(&self) -> &'static str {
        match self {
            XmlEncoding::Utf8 => "UTF-8",
            XmlEncoding::Utf16Le => "UTF-16LE",
            XmlEncoding::Utf16Be => "UTF-16BE",
        }
    }
}
