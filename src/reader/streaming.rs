//! Streaming XML Reader
//!
//! Stateful tokenizer that accepts a document in arbitrary chunks and drives a
//! [`ContentHandler`]. Input accumulates in a buffer; each feed tokenizes only
//! up to the last safe boundary and keeps the unfinished tail for the next
//! chunk, so a tag, comment or text run may be split anywhere.

use log::trace;

use super::handler::{ContentHandler, Diagnostic, Severity};
use crate::core::attributes::parse_attributes;
use crate::core::encoding::XmlEncoding;
use crate::core::entities::decode_text;
use crate::core::markup::{BoundaryFinder, MarkupTokenizer, TokenKind};
use crate::core::scanner::is_whitespace;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// No session open (never started, or finished)
    Idle,
    /// Between `start` and `finish`
    Running,
    /// A session aborted with an error; only `start` is accepted
    Failed,
}

/// Incremental XML tokenizer with well-formedness checks
pub struct XmlReader {
    /// Accumulated bytes not yet tokenized
    buffer: Vec<u8>,
    /// Stream bytes already tokenized (for absolute diagnostic offsets)
    consumed: usize,
    /// Safe-boundary search state for the retained buffer
    finder: BoundaryFinder,
    /// Names of currently open elements
    open: Vec<String>,
    /// Whether the encoding prefix has been checked
    encoding_checked: bool,
    seen_root: bool,
    root_closed: bool,
    state: ReaderState,
}

impl XmlReader {
    /// Create a new reader; call [`XmlReader::start`] before feeding it
    pub fn new() -> Self {
        XmlReader {
            buffer: Vec::with_capacity(8192),
            consumed: 0,
            finder: BoundaryFinder::new(),
            open: Vec::new(),
            encoding_checked: false,
            seen_root: false,
            root_closed: false,
            state: ReaderState::Idle,
        }
    }

    /// True between `start` and `finish`
    pub fn is_active(&self) -> bool {
        self.state == ReaderState::Running
    }

    /// Current element nesting depth
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Get buffer size
    pub fn buffer_size(&self) -> usize {
        self.buffer.len()
    }

    /// Check if there's unprocessed data
    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    /// Open a parse session
    pub fn start<H: ContentHandler>(&mut self, handler: &mut H) -> Result<()> {
        if self.state == ReaderState::Running {
            return Err(Error::usage("start called twice without an intervening finish"));
        }
        self.buffer.clear();
        self.consumed = 0;
        self.finder.reset();
        self.open.clear();
        self.encoding_checked = false;
        self.seen_root = false;
        self.root_closed = false;
        self.state = ReaderState::Running;
        trace!("reader session started");
        handler.start_document()
    }

    /// Feed a chunk of data to the reader
    pub fn feed<H: ContentHandler>(&mut self, chunk: &[u8], handler: &mut H) -> Result<()> {
        self.ensure_running("feed")?;
        if chunk.is_empty() {
            return Ok(());
        }
        self.buffer.extend_from_slice(chunk);
        let result = self.process_buffer(handler, false);
        if result.is_err() {
            self.state = ReaderState::Failed;
        }
        result
    }

    /// Close the session: tokenize whatever is left and check the document is complete
    pub fn finish<H: ContentHandler>(&mut self, handler: &mut H) -> Result<()> {
        self.ensure_running("finish")?;
        let result = self
            .process_buffer(handler, true)
            .and_then(|()| self.close(handler));
        self.buffer.clear();
        self.state = match result {
            Ok(()) => ReaderState::Idle,
            Err(_) => ReaderState::Failed,
        };
        trace!("reader session finished after {} bytes", self.consumed);
        result
    }

    /// Abandon the open session after a failure outside the reader, such as
    /// an I/O error while reading input. Only `start` is accepted afterwards.
    pub fn abort(&mut self) {
        if self.state == ReaderState::Running {
            self.buffer.clear();
            self.state = ReaderState::Failed;
            trace!("reader session aborted after {} bytes", self.consumed);
        }
    }

    fn ensure_running(&self, operation: &str) -> Result<()> {
        match self.state {
            ReaderState::Running => Ok(()),
            ReaderState::Idle => Err(Error::usage(format!(
                "{operation} called outside a start/finish session"
            ))),
            ReaderState::Failed => Err(Error::usage(format!(
                "{operation} called after the parse was aborted"
            ))),
        }
    }

    /// Process the buffer up to the last safe boundary (or all of it at the end)
    fn process_buffer<H: ContentHandler>(&mut self, handler: &mut H, at_end: bool) -> Result<()> {
        if !self.encoding_checked {
            match XmlEncoding::detect(&self.buffer, at_end) {
                None => return Ok(()), // Not enough data
                Some((XmlEncoding::Utf8, bom_len)) => {
                    self.buffer.drain(..bom_len);
                    self.consumed += bom_len;
                    self.encoding_checked = true;
                }
                Some((encoding, _)) => {
                    let message = format!("unsupported encoding {}", encoding.name());
                    return Err(fatal(handler, message, self.consumed));
                }
            }
        }

        let boundary = if at_end {
            self.buffer.len()
        } else {
            self.finder.find(&self.buffer)
        };
        if boundary == 0 {
            return Ok(());
        }

        // Tokenize out of a detached buffer so handlers can be driven from &mut self
        let mut buffer = std::mem::take(&mut self.buffer);
        let result = self.process_slice(&buffer[..boundary], handler);
        buffer.drain(..boundary);
        self.buffer = buffer;
        self.consumed += boundary;
        result
    }

    fn process_slice<H: ContentHandler>(&mut self, bytes: &[u8], handler: &mut H) -> Result<()> {
        let input = match std::str::from_utf8(bytes) {
            Ok(input) => input,
            Err(e) => {
                let offset = self.consumed + e.valid_up_to();
                return Err(fatal(handler, "invalid UTF-8 sequence", offset));
            }
        };

        for token in MarkupTokenizer::new(input) {
            let offset = self.consumed + token.offset;
            match token.kind {
                TokenKind::Text(raw) => self.text(handler, raw, offset)?,
                TokenKind::Stray => {
                    let message = "'<' does not start any markup; kept as text";
                    handler.warning(&Diagnostic::new(Severity::Warning, message, offset));
                    self.characters(handler, "<", offset)?;
                }
                TokenKind::CData(content) => self.characters(handler, content, offset)?,
                TokenKind::StartTag {
                    name,
                    attributes,
                    empty,
                } => self.start_tag(handler, name, attributes, empty, offset)?,
                TokenKind::EndTag(name) => self.end_tag(handler, name, offset)?,
                TokenKind::BadEndTag => {
                    return Err(fatal(handler, "malformed end tag", offset));
                }
                TokenKind::Comment(_)
                | TokenKind::ProcessingInstruction(_)
                | TokenKind::Declaration(_) => {}
                TokenKind::Unterminated(what) => {
                    let message = format!("unexpected end of input inside {what}");
                    return Err(fatal(handler, message, offset));
                }
            }
        }
        Ok(())
    }

    fn text<H: ContentHandler>(&mut self, handler: &mut H, raw: &str, offset: usize) -> Result<()> {
        let mut unresolved = Vec::new();
        let text = decode_text(raw, &mut unresolved);
        for entity in unresolved {
            let message = format!("unknown entity reference {entity}");
            handler.warning(&Diagnostic::new(Severity::Warning, message, offset));
        }
        self.characters(handler, &text, offset)
    }

    fn characters<H: ContentHandler>(&mut self, handler: &mut H, text: &str, offset: usize) -> Result<()> {
        if !self.open.is_empty() {
            return handler.characters(text);
        }
        // Outside the root element only whitespace may appear
        if text.bytes().all(is_whitespace) {
            return Ok(());
        }
        let message = if self.root_closed {
            "text after the document element"
        } else {
            "text before the document element"
        };
        Err(fatal(handler, message, offset))
    }

    fn start_tag<H: ContentHandler>(
        &mut self,
        handler: &mut H,
        name: &str,
        attributes: &str,
        empty: bool,
        offset: usize,
    ) -> Result<()> {
        if self.root_closed {
            let message = format!("junk after document element: <{name}>");
            return Err(fatal(handler, message, offset));
        }

        let parsed = parse_attributes(attributes);
        let attributes_offset = offset + 1 + name.len();
        for issue in &parsed.issues {
            let severity = if issue.is_warning() {
                Severity::Warning
            } else {
                Severity::Error
            };
            let diagnostic = Diagnostic::new(severity, issue.message(), attributes_offset + issue.offset);
            match severity {
                Severity::Warning => handler.warning(&diagnostic),
                _ => handler.error(&diagnostic),
            }
        }

        self.seen_root = true;
        handler.start_element(name, &parsed.attributes)?;
        if empty {
            handler.end_element(name)?;
            if self.open.is_empty() {
                self.root_closed = true;
            }
        } else {
            self.open.push(name.to_string());
        }
        Ok(())
    }

    fn end_tag<H: ContentHandler>(&mut self, handler: &mut H, name: &str, offset: usize) -> Result<()> {
        match self.open.last() {
            None => {
                let message = format!("end tag </{name}> with no open element");
                return Err(fatal(handler, message, offset));
            }
            Some(open) if open != name => {
                let message = format!("mismatched tag: expected </{open}>, found </{name}>");
                return Err(fatal(handler, message, offset));
            }
            Some(_) => {}
        }

        self.open.pop();
        if self.open.is_empty() {
            self.root_closed = true;
        }
        handler.end_element(name)
    }

    fn close<H: ContentHandler>(&mut self, handler: &mut H) -> Result<()> {
        if let Some(open) = self.open.last() {
            let message = format!("unclosed element <{open}> at end of input");
            return Err(fatal(handler, message, self.consumed));
        }
        if !self.seen_root {
            return Err(fatal(handler, "no element found", self.consumed));
        }
        handler.end_document()
    }
}

impl Default for XmlReader {
    fn default() -> Self {
        Self::new()
    }
}

fn fatal<H: ContentHandler>(handler: &mut H, message: impl Into<String>, offset: usize) -> Error {
    handler.fatal_error(Diagnostic::new(Severity::Fatal, message, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attributes::Attribute;

    /// Records every callback as a compact string
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        diagnostics: Vec<Diagnostic>,
    }

    impl ContentHandler for Recorder {
        fn start_document(&mut self) -> Result<()> {
            self.events.push("startDoc".to_string());
            Ok(())
        }

        fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<()> {
            let attrs: Vec<String> = attributes
                .iter()
                .map(|a| format!(" {}={}", a.name, a.value))
                .collect();
            self.events.push(format!("<{name}{}>", attrs.concat()));
            Ok(())
        }

        fn characters(&mut self, text: &str) -> Result<()> {
            self.events.push(format!("'{text}'"));
            Ok(())
        }

        fn end_element(&mut self, name: &str) -> Result<()> {
            self.events.push(format!("</{name}>"));
            Ok(())
        }

        fn end_document(&mut self) -> Result<()> {
            self.events.push("endDoc".to_string());
            Ok(())
        }

        fn warning(&mut self, diagnostic: &Diagnostic) {
            self.diagnostics.push(diagnostic.clone());
        }

        fn error(&mut self, diagnostic: &Diagnostic) {
            self.diagnostics.push(diagnostic.clone());
        }
    }

    fn run(chunks: &[&str]) -> (Result<()>, Recorder) {
        let mut reader = XmlReader::new();
        let mut recorder = Recorder::default();
        let result = (|| {
            reader.start(&mut recorder)?;
            for chunk in chunks {
                reader.feed(chunk.as_bytes(), &mut recorder)?;
            }
            reader.finish(&mut recorder)
        })();
        (result, recorder)
    }

    #[test]
    fn test_simple_document() {
        let (result, rec) = run(&["<a x=\"1\">hi<b/></a>"]);
        assert!(result.is_ok());
        assert_eq!(
            rec.events,
            vec!["startDoc", "<a x=1>", "'hi'", "<b>", "</b>", "</a>", "endDoc"]
        );
    }

    #[test]
    fn test_tag_split_across_chunks() {
        let (result, rec) = run(&["<ro", "ot><i", "tem/></root>"]);
        assert!(result.is_ok());
        assert_eq!(
            rec.events,
            vec!["startDoc", "<root>", "<item>", "</item>", "</root>", "endDoc"]
        );
    }

    #[test]
    fn test_entity_split_across_chunks() {
        let (result, rec) = run(&["<a>fish &am", "p; chips</a>"]);
        assert!(result.is_ok());
        assert_eq!(rec.events[2], "'fish & chips'");
        assert!(rec.diagnostics.is_empty());
    }

    #[test]
    fn test_prolog_and_bom_skipped() {
        let input = "\u{FEFF}<?xml version=\"1.0\"?>\n<!DOCTYPE a>\n<!-- hi -->\n<a/>\n";
        let (result, rec) = run(&[input]);
        assert!(result.is_ok());
        assert_eq!(rec.events, vec!["startDoc", "<a>", "</a>", "endDoc"]);
    }

    #[test]
    fn test_cdata_is_characters() {
        let (_, rec) = run(&["<a><![CDATA[1 < 2]]></a>"]);
        assert_eq!(rec.events[2], "'1 < 2'");
    }

    #[test]
    fn test_unknown_entity_warns_and_continues() {
        let (result, rec) = run(&["<a>&bogus;</a>"]);
        assert!(result.is_ok());
        assert_eq!(rec.events[2], "'&bogus;'");
        assert_eq!(rec.diagnostics.len(), 1);
        assert_eq!(rec.diagnostics[0].severity, Severity::Warning);
        assert_eq!(rec.diagnostics[0].offset, 3);
    }

    #[test]
    fn test_duplicate_attribute_is_error_not_fatal() {
        let (result, rec) = run(&["<a k=\"1\" k=\"2\"/>"]);
        assert!(result.is_ok());
        assert_eq!(rec.events[1], "<a k=1>");
        assert_eq!(rec.diagnostics[0].severity, Severity::Error);
    }

    #[test]
    fn test_mismatched_tag_is_fatal() {
        let (result, _) = run(&["<a><b></a></b>"]);
        match result {
            Err(Error::Malformed(d)) => {
                assert_eq!(d.severity, Severity::Fatal);
                assert_eq!(d.offset, 6);
            }
            other => panic!("expected fatal error, got {other:?}"),
        }
    }

    #[test]
    fn test_unclosed_element_is_fatal() {
        let (result, _) = run(&["<a><b>"]);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_junk_after_root_is_fatal() {
        let (result, _) = run(&["<a/><b/>"]);
        assert!(matches!(result, Err(Error::Malformed(_))));
        let (result, _) = run(&["<a/>text"]);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_empty_document_is_fatal() {
        let (result, _) = run(&["  \n"]);
        assert!(matches!(result, Err(Error::Malformed(ref d)) if d.message == "no element found"));
    }

    #[test]
    fn test_unterminated_markup_is_fatal() {
        let (result, _) = run(&["<a><!-- never closed"]);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_utf16_rejected() {
        let mut reader = XmlReader::new();
        let mut rec = Recorder::default();
        reader.start(&mut rec).unwrap();
        let result = reader.feed(&[0xFF, 0xFE, b'<', 0x00], &mut rec);
        assert!(matches!(result, Err(Error::Malformed(_))));
    }

    #[test]
    fn test_multibyte_text_split_mid_character() {
        let bytes = "<a>héllo</a>".as_bytes();
        let mut reader = XmlReader::new();
        let mut rec = Recorder::default();
        reader.start(&mut rec).unwrap();
        reader.feed(&bytes[..5], &mut rec).unwrap();
        reader.feed(&bytes[5..], &mut rec).unwrap();
        reader.finish(&mut rec).unwrap();
        assert_eq!(rec.events[2], "'héllo'");
    }

    #[test]
    fn test_usage_ordering() {
        let mut reader = XmlReader::new();
        let mut rec = Recorder::default();
        assert!(matches!(reader.feed(b"<a/>", &mut rec), Err(Error::Usage(_))));
        assert!(matches!(reader.finish(&mut rec), Err(Error::Usage(_))));

        reader.start(&mut rec).unwrap();
        assert!(matches!(reader.start(&mut rec), Err(Error::Usage(_))));
        reader.feed(b"<a/>", &mut rec).unwrap();
        reader.finish(&mut rec).unwrap();
        assert!(matches!(reader.feed(b"<a/>", &mut rec), Err(Error::Usage(_))));

        // A finished reader can start a new session
        reader.start(&mut rec).unwrap();
        reader.feed(b"<b/>", &mut rec).unwrap();
        reader.finish(&mut rec).unwrap();
    }

    #[test]
    fn test_feed_after_fatal_is_usage_error() {
        let mut reader = XmlReader::new();
        let mut rec = Recorder::default();
        reader.start(&mut rec).unwrap();
        assert!(reader.feed(b"<a></b>", &mut rec).is_err());
        assert!(matches!(reader.feed(b"<a/>", &mut rec), Err(Error::Usage(_))));
    }

    fn text_of(rec: &Recorder) -> String {
        rec.events
            .iter()
            .filter_map(|e| e.strip_prefix('\'')?.strip_suffix('\''))
            .collect()
    }

    #[test]
    fn test_stray_lt_split_after_it() {
        let (result, rec) = run(&["<a>1 <", " ", "2</a>"]);
        assert!(result.is_ok());
        assert_eq!(text_of(&rec), "1 < 2");
        assert_eq!(rec.diagnostics.len(), 1);
        assert_eq!(rec.diagnostics[0].offset, 5);
    }

    #[test]
    fn test_doctype_subset_with_comment_and_pi() {
        let doc = "<!DOCTYPE r [\n  <!-- don't -->\n  <?pi it's ?>\n  <!ELEMENT r (#PCDATA)>\n]>\n<r>x</r>";
        let (result, rec) = run(&[doc]);
        assert!(result.is_ok());
        assert_eq!(rec.events, vec!["startDoc", "<r>", "'x'", "</r>", "endDoc"]);

        let pieces: Vec<String> = doc.chars().map(String::from).collect();
        let pieces: Vec<&str> = pieces.iter().map(String::as_str).collect();
        let (result, split) = run(&pieces);
        assert!(result.is_ok());
        assert_eq!(split.events, rec.events);
    }

    #[test]
    fn test_bare_ampersand_reported_alone() {
        let (result, rec) = run(&["<a>fish & chips;</a>"]);
        assert!(result.is_ok());
        assert_eq!(text_of(&rec), "fish & chips;");
        assert_eq!(rec.diagnostics[0].message, "unknown entity reference &");
    }

    #[test]
    fn test_long_comment_fed_line_by_line() {
        let mut chunks = vec!["<a>".to_string(), "<!--".to_string()];
        chunks.extend((0..200).map(|i| format!(" line {i} > ]] ?> -\n")));
        chunks.push("-->text</a>".to_string());
        let chunks: Vec<&str> = chunks.iter().map(String::as_str).collect();
        let (result, rec) = run(&chunks);
        assert!(result.is_ok());
        assert_eq!(rec.events, vec!["startDoc", "<a>", "'text'", "</a>", "endDoc"]);
    }

    #[test]
    fn test_abort_allows_restart() {
        let mut reader = XmlReader::new();
        let mut rec = Recorder::default();
        reader.start(&mut rec).unwrap();
        reader.feed(b"<a>", &mut rec).unwrap();
        reader.abort();
        assert!(!reader.is_active());
        assert!(matches!(reader.feed(b"</a>", &mut rec), Err(Error::Usage(_))));
        reader.start(&mut rec).unwrap();
        reader.feed(b"<b/>", &mut rec).unwrap();
        reader.finish(&mut rec).unwrap();
    }
}
