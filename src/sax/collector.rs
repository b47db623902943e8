//! Event Collectors
//!
//! Sinks that record or print the tag/path event stream instead of acting on
//! it: `EventCollector` keeps owned events for inspection, `TraceSink` writes
//! one line per event.

use std::io::{self, Stdout, Write};

use super::events::{TagEvent, TagSink};
use crate::error::Result;

/// Collector that gathers tag events in document order
#[derive(Debug, Default)]
pub struct EventCollector {
    events: Vec<TagEvent>,
}

impl EventCollector {
    /// Create a new collector
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(64),
        }
    }

    /// Get the collected events as a slice
    pub fn events(&self) -> &[TagEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<TagEvent> {
        self.events
    }

    /// Get number of collected events
    pub fn event_count(&self) -> usize {
        self.events.len()
    }
}

impl TagSink for EventCollector {
    fn start_document(&mut self) -> Result<()> {
        self.events.push(TagEvent::StartDocument);
        Ok(())
    }

    fn start(&mut self, name: &str) -> Result<()> {
        self.events.push(TagEvent::Start(name.to_string()));
        Ok(())
    }

    fn attribute(&mut self, name: &str, attribute: &str, value: &str) -> Result<()> {
        self.events.push(TagEvent::Attribute {
            name: name.to_string(),
            attribute: attribute.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn data(&mut self, name: &str, text: &str) -> Result<()> {
        self.events.push(TagEvent::Data {
            name: name.to_string(),
            text: text.to_string(),
        });
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        self.events.push(TagEvent::End(name.to_string()));
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.events.push(TagEvent::EndDocument);
        Ok(())
    }
}

/// Writes each event as a line: `start:a`, `attr:(a) id=1`, `data:(a) text`, ...
pub struct TraceSink<W: Write = Stdout> {
    out: W,
}

impl TraceSink<Stdout> {
    pub fn stdout() -> Self {
        TraceSink { out: io::stdout() }
    }
}

impl<W: Write> TraceSink<W> {
    pub fn new(out: W) -> Self {
        TraceSink { out }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> TagSink for TraceSink<W> {
    fn start_document(&mut self) -> Result<()> {
        writeln!(self.out, "startDoc")?;
        Ok(())
    }

    fn start(&mut self, name: &str) -> Result<()> {
        writeln!(self.out, "start:{name}")?;
        Ok(())
    }

    fn attribute(&mut self, name: &str, attribute: &str, value: &str) -> Result<()> {
        writeln!(self.out, "attr:({name}) {attribute}={value}")?;
        Ok(())
    }

    fn data(&mut self, name: &str, text: &str) -> Result<()> {
        writeln!(self.out, "data:({name}) {text}")?;
        Ok(())
    }

    fn end(&mut self, name: &str) -> Result<()> {
        writeln!(self.out, "end:{name}")?;
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        writeln!(self.out, "endDoc")?;
        self.out.flush()?;
        Ok(())
    }
}
