//! Record Builder
//!
//! Accumulates named fields between a start marker and an end marker and
//! writes each closed record as one line in a fixed field order.
//!
//! The handler functions in this module are meant for [`Rule::call`]:
//!
//! ```
//! use tagpath::rules::{record, RecordBuilder, Rule, RuleTable};
//!
//! let rules: RuleTable<RecordBuilder<Vec<u8>>> = RuleTable::new()
//!     .with("/Parking/Carpark", Rule::handler(record::start_rec))
//!     .with("/Parking/Carpark/Capacity/", Rule::call(record::store, ["capacity"]))
//!     .with("/Parking/Carpark~", Rule::handler(record::end_rec));
//! # let _ = rules;
//! ```
//!
//! [`Rule::call`]: super::table::Rule::call

use std::collections::HashMap;
use std::io::{self, Stdout, Write};

use log::{debug, warn};

use super::dispatch::RuleOwner;
use super::table::Params;
use crate::error::{Error, Result};

/// One output column of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub quoted: bool,
}

/// Field order, quoting and formatting of rendered records
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLayout {
    fields: Vec<Field>,
    placeholder: String,
    separator: String,
}

impl RecordLayout {
    /// Layout from `(heading, quoted)` pairs
    pub fn new<I, N>(headings: I) -> Self
    where
        I: IntoIterator<Item = (N, bool)>,
        N: Into<String>,
    {
        RecordLayout {
            fields: headings
                .into_iter()
                .map(|(name, quoted)| Field {
                    name: name.into(),
                    quoted,
                })
                .collect(),
            placeholder: "(none)".to_string(),
            separator: " ".to_string(),
        }
    }

    /// Value written for a field that was never stored
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Render one record, without line terminator
    pub fn render(&self, record: &HashMap<String, String>) -> String {
        let mut line = String::new();
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                line.push_str(&self.separator);
            }
            let value = record
                .get(&field.name)
                .map_or(self.placeholder.as_str(), String::as_str);
            if field.quoted {
                line.push('"');
                line.push_str(value);
                line.push('"');
            } else {
                line.push_str(value);
            }
        }
        line
    }
}

/// Record accumulator writing one line per closed record
pub struct RecordBuilder<W: Write = Stdout> {
    layout: RecordLayout,
    out: W,
    /// The open record, if any
    record: Option<HashMap<String, String>>,
    /// Values captured before a record opens
    pending: HashMap<String, String>,
    written: usize,
}

impl RecordBuilder<Stdout> {
    /// Builder writing to standard output
    pub fn new(layout: RecordLayout) -> Self {
        Self::with_writer(layout, io::stdout())
    }
}

impl<W: Write> RecordBuilder<W> {
    pub fn with_writer(layout: RecordLayout, out: W) -> Self {
        RecordBuilder {
            layout,
            out,
            record: None,
            pending: HashMap::new(),
            written: 0,
        }
    }

    pub fn layout(&self) -> &RecordLayout {
        &self.layout
    }

    pub fn is_open(&self) -> bool {
        self.record.is_some()
    }

    /// Number of records written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Open a new record, discarding any record still open
    pub fn start(&mut self) {
        if self.record.is_some() {
            warn!("record opened while another was open; previous fields discarded");
        }
        self.record = Some(HashMap::new());
    }

    /// Copy a pending value into the open record under the same name
    pub fn seed(&mut self, field: &str) -> Result<()> {
        let value = self.pending.get(field).cloned();
        let record = self.open_record("seed")?;
        if let Some(value) = value {
            record.insert(field.to_string(), value);
        }
        Ok(())
    }

    /// Store a field; a later store of the same field wins
    pub fn store(&mut self, field: &str, value: &str) -> Result<()> {
        let record = self.open_record("store")?;
        record.insert(field.to_string(), value.to_string());
        Ok(())
    }

    /// Capture a value to seed later records with
    pub fn set_pending(&mut self, key: &str, value: &str) {
        self.pending.insert(key.to_string(), value.to_string());
    }

    pub fn pending(&self, key: &str) -> Option<&str> {
        self.pending.get(key).map(String::as_str)
    }

    /// Close the open record and write it
    pub fn end(&mut self) -> Result<()> {
        let record = self
            .record
            .take()
            .ok_or_else(|| Error::usage("record end with no open record"))?;
        let line = self.layout.render(&record);
        writeln!(self.out, "{line}")?;
        self.written += 1;
        debug!("record {} written", self.written);
        Ok(())
    }

    fn open_record(&mut self, operation: &str) -> Result<&mut HashMap<String, String>> {
        self.record
            .as_mut()
            .ok_or_else(|| Error::usage(format!("record {operation} with no open record")))
    }
}

impl<W: Write> RuleOwner for RecordBuilder<W> {
    fn document_started(&mut self) -> Result<()> {
        self.record = None;
        self.pending.clear();
        Ok(())
    }

    fn document_finished(&mut self) -> Result<()> {
        if self.record.take().is_some() {
            warn!("record still open at document end; discarded");
        }
        self.out.flush()?;
        Ok(())
    }
}

/// Rule owner state that carries a record builder
pub trait RecordOwner {
    type Sink: Write;

    fn records(&mut self) -> &mut RecordBuilder<Self::Sink>;
}

impl<W: Write> RecordOwner for RecordBuilder<W> {
    type Sink = W;

    fn records(&mut self) -> &mut RecordBuilder<W> {
        self
    }
}

/// Open a record; each parameter names a field seeded from the pending values
pub fn start_rec<S: RecordOwner>(state: &mut S, params: &Params, _value: &str) -> Result<()> {
    let records = state.records();
    records.start();
    for field in params.iter() {
        records.seed(field)?;
    }
    Ok(())
}

/// Store the value in the field named by parameter 0
pub fn store<S: RecordOwner>(state: &mut S, params: &Params, value: &str) -> Result<()> {
    let field = params.require(0, "field name")?;
    state.records().store(field, value)
}

/// Close and write the open record
pub fn end_rec<S: RecordOwner>(state: &mut S, _params: &Params, _value: &str) -> Result<()> {
    state.records().end()
}

/// Remember the value under the key named by parameter 0
pub fn set_pending<S: RecordOwner>(state: &mut S, params: &Params, value: &str) -> Result<()> {
    let key = params.require(0, "pending key")?;
    state.records().set_pending(key, value);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder() -> RecordBuilder<Vec<u8>> {
        RecordBuilder::with_writer(RecordLayout::new([("id", false), ("name", true)]), Vec::new())
    }

    fn output(builder: RecordBuilder<Vec<u8>>) -> String {
        String::from_utf8(builder.into_inner()).unwrap()
    }

    #[test]
    fn test_record_round_trip() {
        let mut b = builder();
        b.start();
        b.store("id", "7").unwrap();
        b.store("name", "Kermit").unwrap();
        b.end().unwrap();
        assert_eq!(output(b), "7 \"Kermit\"\n");
    }

    #[test]
    fn test_missing_field_placeholder() {
        let mut b = builder();
        b.start();
        b.store("id", "7").unwrap();
        b.end().unwrap();
        assert_eq!(output(b), "7 \"(none)\"\n");
    }

    #[test]
    fn test_last_store_wins() {
        let mut b = builder();
        b.start();
        b.store("name", "Piggy").unwrap();
        b.store("name", "Gonzo").unwrap();
        b.end().unwrap();
        assert_eq!(output(b), "(none) \"Gonzo\"\n");
    }

    #[test]
    fn test_store_while_idle_is_usage_error() {
        let mut b = builder();
        assert!(matches!(b.store("id", "1"), Err(Error::Usage(_))));
        assert!(matches!(b.end(), Err(Error::Usage(_))));
        b.start();
        b.end().unwrap();
        assert!(matches!(b.end(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_pending_seeds_next_records() {
        let mut b = RecordBuilder::with_writer(
            RecordLayout::new([("type", false), ("id", false)]),
            Vec::new(),
        );
        set_pending(&mut b, &Params::new(["type"]), "Title").unwrap();
        for id in ["1", "2"] {
            start_rec(&mut b, &Params::new(["type"]), "").unwrap();
            store(&mut b, &Params::new(["id"]), id).unwrap();
            end_rec(&mut b, &Params::default(), "").unwrap();
        }
        assert_eq!(b.written(), 2);
        assert_eq!(output(b), "Title 1\nTitle 2\n");
    }

    #[test]
    fn test_custom_layout() {
        let layout = RecordLayout::new([("a", true), ("b", false)])
            .placeholder("-")
            .separator(",");
        let mut record = HashMap::new();
        record.insert("a".to_string(), "x".to_string());
        assert_eq!(layout.render(&record), "\"x\",-");
    }

    #[test]
    fn test_open_record_discarded_at_document_end() {
        let mut b = builder();
        b.start();
        b.store("id", "9").unwrap();
        b.document_finished().unwrap();
        assert!(!b.is_open());
        assert_eq!(output(b), "");
    }
}
