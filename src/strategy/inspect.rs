//! Inspection Sinks
//!
//! Variable sinks for exploring an unfamiliar document before writing a rule
//! table for it.

use std::collections::HashMap;
use std::io::{self, Stdout, Write};

use crate::error::Result;
use crate::sax::VariableSink;

/// Prints `name` for empty values and `name=value` otherwise, one per line
pub struct VariablePrinter<W: Write = Stdout> {
    out: W,
}

impl VariablePrinter<Stdout> {
    pub fn stdout() -> Self {
        VariablePrinter { out: io::stdout() }
    }
}

impl<W: Write> VariablePrinter<W> {
    pub fn new(out: W) -> Self {
        VariablePrinter { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> VariableSink for VariablePrinter<W> {
    fn variable(&mut self, name: &str, value: &str) -> Result<()> {
        if value.is_empty() {
            writeln!(self.out, "{name}")?;
        } else {
            writeln!(self.out, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Lists each distinct canonical name in order of first occurrence
///
/// A name is written to the output the first time it appears; later
/// occurrences only bump its count.
pub struct PathClassifier<W: Write = io::Sink> {
    out: W,
    names: Vec<String>,
    counts: HashMap<String, usize>,
}

impl PathClassifier<io::Sink> {
    /// Classifier that only collects
    pub fn new() -> Self {
        Self::with_writer(io::sink())
    }
}

impl Default for PathClassifier<io::Sink> {
    fn default() -> Self {
        Self::new()
    }
}

impl PathClassifier<Stdout> {
    pub fn stdout() -> Self {
        Self::with_writer(io::stdout())
    }
}

impl<W: Write> PathClassifier<W> {
    pub fn with_writer(out: W) -> Self {
        PathClassifier {
            out,
            names: Vec::new(),
            counts: HashMap::new(),
        }
    }

    /// Distinct names in first-occurrence order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of times `name` occurred
    pub fn count(&self, name: &str) -> usize {
        self.counts.get(name).copied().unwrap_or(0)
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> VariableSink for PathClassifier<W> {
    fn variable(&mut self, name: &str, _value: &str) -> Result<()> {
        if let Some(count) = self.counts.get_mut(name) {
            *count += 1;
            return Ok(());
        }
        writeln!(self.out, "{name}")?;
        self.counts.insert(name.to_string(), 1);
        self.names.push(name.to_string());
        Ok(())
    }
}

/// Collects the target of every `<a href>` in an HTML-like document
#[derive(Debug, Default)]
pub struct HrefExtractor {
    hrefs: Vec<String>,
}

impl HrefExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hrefs(&self) -> &[String] {
        &self.hrefs
    }

    pub fn into_hrefs(self) -> Vec<String> {
        self.hrefs
    }
}

impl VariableSink for HrefExtractor {
    fn variable(&mut self, name: &str, value: &str) -> Result<()> {
        if name.ends_with("a/href") {
            self.hrefs.push(value.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::parser::variable_parser;

    #[test]
    fn test_printer_format() {
        let mut printer = VariablePrinter::new(Vec::new());
        printer.variable("/a", "").unwrap();
        printer.variable("/a/", "hi").unwrap();
        assert_eq!(String::from_utf8(printer.into_inner()).unwrap(), "/a\n/a/=hi\n");
    }

    #[test]
    fn test_classifier_first_occurrence() {
        let mut parser = variable_parser(PathClassifier::with_writer(Vec::new()));
        parser
            .parse_str("<list><item>1</item><item>2</item></list>")
            .unwrap();
        let classifier = parser.into_variables();
        assert_eq!(
            classifier.names(),
            &["/", "/list", "/list/item", "/list/item/", "/list/item~", "/list~", "/~"]
        );
        assert_eq!(classifier.count("/list/item/"), 2);
        assert_eq!(classifier.count("/missing"), 0);
        let out = String::from_utf8(classifier.into_inner()).unwrap();
        assert_eq!(out.lines().count(), 7);
    }

    #[test]
    fn test_href_extractor() {
        let html = r#"<html><body><p><a href="/one">1</a></p><a href="two.html">2</a><link href="x.css"/></body></html>"#;
        let mut parser = variable_parser(HrefExtractor::new());
        parser.parse_str(html).unwrap();
        assert_eq!(parser.variables().hrefs(), &["/one", "two.html"]);
    }
}
