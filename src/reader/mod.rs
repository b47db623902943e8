//! XML Reader Module
//!
//! The tag event source:
//! - ContentHandler: callback boundary plus severity-tagged diagnostics
//! - XmlReader: incremental tokenizer fed in arbitrary chunks

pub mod handler;
pub mod streaming;

pub use handler::{ContentHandler, Diagnostic, Severity};
pub use streaming::XmlReader;
