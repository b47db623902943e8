//! Tag Event Adapter
//!
//! Sits on the tokenizer callback boundary and re-emits the simplified
//! vocabulary: start, attribute, data, end, plus document brackets derived
//! from nesting depth.

use log::{debug, error, warn};

use super::events::TagSink;
use crate::core::attributes::Attribute;
use crate::error::{Error, Result};
use crate::reader::{ContentHandler, Diagnostic};

/// Buffers character data between tag boundaries and forwards tag events
///
/// Data is flushed once per tag boundary, trimmed of surrounding whitespace;
/// a run that trims to nothing is not forwarded. `start_document` is sent
/// when depth goes 0 -> 1 and `end_document` when it returns 1 -> 0.
pub struct TagAdapter<S> {
    sink: S,
    /// Character data since the last tag boundary
    buffer: String,
    /// Names of open elements; the innermost owns buffered data
    open: Vec<String>,
}

impl<S: TagSink> TagAdapter<S> {
    pub fn new(sink: S) -> Self {
        TagAdapter {
            sink,
            buffer: String::new(),
            open: Vec::new(),
        }
    }

    /// Get the downstream sink
    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    fn flush_data(&mut self) -> Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = self.buffer.trim();
        let result = match self.open.last() {
            Some(name) if !text.is_empty() => self.sink.data(name, text),
            _ => Ok(()),
        };
        self.buffer.clear();
        result
    }
}

impl<S: TagSink> ContentHandler for TagAdapter<S> {
    fn start_document(&mut self) -> Result<()> {
        self.buffer.clear();
        self.open.clear();
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<()> {
        self.flush_data()?;
        if self.open.is_empty() {
            debug!("document element <{name}> opened");
            self.sink.start_document()?;
        }
        self.sink.start(name)?;
        self.open.push(name.to_string());
        for attribute in attributes {
            self.sink.attribute(name, attribute.name, &attribute.value)?;
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        self.buffer.push_str(text);
        Ok(())
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        self.flush_data()?;
        self.sink.end(name)?;
        self.open.pop();
        if self.open.is_empty() {
            debug!("document element </{name}> closed");
            self.sink.end_document()?;
        }
        Ok(())
    }

    fn warning(&mut self, diagnostic: &Diagnostic) {
        warn!("{diagnostic}");
    }

    fn error(&mut self, diagnostic: &Diagnostic) {
        error!("{diagnostic}");
    }

    fn fatal_error(&mut self, diagnostic: Diagnostic) -> Error {
        error!("{diagnostic}");
        Error::Malformed(diagnostic)
    }
}
