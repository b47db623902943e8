//! Variable Canonicalizer
//!
//! Folds path-bearing events into one stream of canonical name/value pairs.
//! The event kind is carried by the shape of the name alone:
//!
//! | Event          | Name          | Value     |
//! |----------------|---------------|-----------|
//! | document start | `/`           | empty     |
//! | element start  | `/a/b`        | empty     |
//! | data           | `/a/b/`       | text      |
//! | attribute      | `/a/b/attr`   | attr value|
//! | element end    | `/a/b~`       | empty     |
//! | document end   | `/~`          | empty     |

use super::events::{TagSink, VariableSink};
use crate::error::Result;

/// Canonical name of the document start bracket
pub const DOCUMENT_START: &str = "/";
/// Canonical name of the document end bracket
pub const DOCUMENT_END: &str = "/~";

/// Converts path events into variables; never drops an event
pub struct Canonicalizer<V> {
    sink: V,
    /// Reused buffer for composed names
    name: String,
}

impl<V: VariableSink> Canonicalizer<V> {
    pub fn new(sink: V) -> Self {
        Canonicalizer {
            sink,
            name: String::with_capacity(128),
        }
    }

    pub fn sink(&self) -> &V {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut V {
        &mut self.sink
    }

    pub fn into_sink(self) -> V {
        self.sink
    }

    fn emit(&mut self, path: &str, suffix: &str, value: &str) -> Result<()> {
        self.name.clear();
        self.name.push_str(path);
        self.name.push_str(suffix);
        self.sink.variable(&self.name, value)
    }
}

impl<V: VariableSink> TagSink for Canonicalizer<V> {
    fn start_document(&mut self) -> Result<()> {
        self.sink.variable(DOCUMENT_START, "")
    }

    fn start(&mut self, path: &str) -> Result<()> {
        self.sink.variable(path, "")
    }

    fn attribute(&mut self, path: &str, attribute: &str, value: &str) -> Result<()> {
        self.name.clear();
        self.name.push_str(path);
        self.name.push('/');
        self.name.push_str(attribute);
        self.sink.variable(&self.name, value)
    }

    fn data(&mut self, path: &str, text: &str) -> Result<()> {
        self.emit(path, "/", text)
    }

    fn end(&mut self, path: &str) -> Result<()> {
        self.emit(path, "~", "")
    }

    fn end_document(&mut self) -> Result<()> {
        self.sink.variable(DOCUMENT_END, "")
    }
}
