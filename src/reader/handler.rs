//! Content handler boundary
//!
//! The trait a tag event source drives, and the diagnostics it reports.

use std::fmt;

use crate::core::attributes::Attribute;
use crate::error::{Error, Result};

/// How bad a tokenizer-reported problem is
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational; the document is still consumable
    Warning,
    /// Possibly recoverable; parsing continues
    Error,
    /// Never recoverable; parsing aborts
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        })
    }
}

/// A problem reported by the tokenizer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    /// Byte offset from the start of the fed stream
    pub offset: usize,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>, offset: usize) -> Self {
        Diagnostic {
            severity,
            message: message.into(),
            offset,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}: {}", self.severity, self.offset, self.message)
    }
}

/// Receiver of tag events from a streaming tokenizer
///
/// Events arrive in document order with no lookahead. `characters` may be
/// called any number of times for one run of text; callers must not assume a
/// run arrives in one piece. Returning an error aborts the parse and the
/// error reaches whoever fed the input.
pub trait ContentHandler {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<()>;

    fn characters(&mut self, text: &str) -> Result<()>;

    fn end_element(&mut self, name: &str) -> Result<()>;

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }

    /// Informational problem; parsing continues
    fn warning(&mut self, _diagnostic: &Diagnostic) {}

    /// Recoverable problem; parsing continues
    fn error(&mut self, _diagnostic: &Diagnostic) {}

    /// Unrecoverable problem; the returned error is propagated to the caller
    fn fatal_error(&mut self, diagnostic: Diagnostic) -> Error {
        Error::Malformed(diagnostic)
    }
}

impl<H: ContentHandler + ?Sized> ContentHandler for &mut H {
    fn start_document(&mut self) -> Result<()> {
        (**self).start_document()
    }

    fn start_element(&mut self, name: &str, attributes: &[Attribute<'_>]) -> Result<()> {
        (**self).start_element(name, attributes)
    }

    fn characters(&mut self, text: &str) -> Result<()> {
        (**self).characters(text)
    }

    fn end_element(&mut self, name: &str) -> Result<()> {
        (**self).end_element(name)
    }

    fn end_document(&mut self) -> Result<()> {
        (**self).end_document()
    }

    fn warning(&mut self, diagnostic: &Diagnostic) {
        (**self).warning(diagnostic)
    }

    fn error(&mut self, diagnostic: &Diagnostic) {
        (**self).error(diagnostic)
    }

    fn fatal_error(&mut self, diagnostic: Diagnostic) -> Error {
        (**self).fatal_error(diagnostic)
    }
}
