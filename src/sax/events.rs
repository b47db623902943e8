//! Pipeline Event Types
//!
//! The sink traits that connect the pipeline layers, and owned event values
//! for recording a stream.

use crate::error::Result;

/// Receiver of the simplified tag vocabulary
///
/// The same trait serves two layers: from the Tag Event Adapter `name` is a
/// bare tag name, from the Path Tracker it is the full path (`/a/b`).
pub trait TagSink {
    fn start_document(&mut self) -> Result<()> {
        Ok(())
    }

    fn start(&mut self, name: &str) -> Result<()>;

    fn attribute(&mut self, name: &str, attribute: &str, value: &str) -> Result<()>;

    /// Trimmed, non-empty character data of the element `name`
    fn data(&mut self, name: &str, text: &str) -> Result<()>;

    fn end(&mut self, name: &str) -> Result<()>;

    fn end_document(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<T: TagSink + ?Sized> TagSink for &mut T {
    fn start_document(&mut self) -> Result<()> {
        (**self).start_document()
    }

    fn start(&mut self, name: &str) -> Result<()> {
        (**self).start(name)
    }

    fn attribute(&mut self, name: &str, attribute: &str, value: &str) -> Result<()> {
        (**self).attribute(name, attribute, value)
    }

    fn data(&mut self, name: &str, text: &str) -> Result<()> {
        (**self).data(name, text)
    }

    fn end(&mut self, name: &str) -> Result<()> {
        (**self).end(name)
    }

    fn end_document(&mut self) -> Result<()> {
        (**self).end_document()
    }
}

/// Receiver of canonical name/value pairs
pub trait VariableSink {
    /// `value` is empty for element start, element end and document brackets
    fn variable(&mut self, name: &str, value: &str) -> Result<()>;
}

impl<T: VariableSink + ?Sized> VariableSink for &mut T {
    fn variable(&mut self, name: &str, value: &str) -> Result<()> {
        (**self).variable(name, value)
    }
}

/// A recorded tag or path event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagEvent {
    StartDocument,
    Start(String),
    Attribute {
        name: String,
        attribute: String,
        value: String,
    },
    Data {
        name: String,
        text: String,
    },
    End(String),
    EndDocument,
}

impl TagEvent {
    /// Check if this is a start or end bracket of the document
    #[inline]
    pub fn is_document_bracket(&self) -> bool {
        matches!(self, TagEvent::StartDocument | TagEvent::EndDocument)
    }

    /// Tag name or path carried by the event, if any
    pub fn name(&self) -> Option<&str> {
        match self {
            TagEvent::Start(name) | TagEvent::End(name) => Some(name),
            TagEvent::Attribute { name, .. } | TagEvent::Data { name, .. } => Some(name),
            TagEvent::StartDocument | TagEvent::EndDocument => None,
        }
    }

    /// Replay this event into a sink
    pub fn replay<S: TagSink>(&self, sink: &mut S) -> Result<()> {
        match self {
            TagEvent::StartDocument => sink.start_document(),
            TagEvent::Start(name) => sink.start(name),
            TagEvent::Attribute {
                name,
                attribute,
                value,
            } => sink.attribute(name, attribute, value),
            TagEvent::Data { name, text } => sink.data(name, text),
            TagEvent::End(name) => sink.end(name),
            TagEvent::EndDocument => sink.end_document(),
        }
    }
}

/// One canonical name/value pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable {
    pub name: String,
    pub value: String,
}

impl Variable {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Variable {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl VariableSink for Vec<Variable> {
    fn variable(&mut self, name: &str, value: &str) -> Result<()> {
        self.push(Variable::new(name, value));
        Ok(())
    }
}
