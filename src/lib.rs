//! tagpath - Streaming XML flattened into path-addressed variables
//!
//! Layers, leaf first:
//! - reader: incremental tokenizer driving a `ContentHandler`
//! - sax: tag adapter, path tracker and variable canonicalizer
//! - rules: exact-match rule dispatch, record builder, insert generator
//! - strategy: parser facade, inspection sinks, parallel documents
//!
//! ```
//! use tagpath::rules::{record, RecordBuilder, RecordLayout, Rule, RuleTable};
//! use tagpath::strategy::rule_parser;
//!
//! let rules = RuleTable::new()
//!     .with("/muppets/muppet", Rule::handler(record::start_rec))
//!     .with("/muppets/muppet/id", Rule::call(record::store, ["id"]))
//!     .with("/muppets/muppet/", Rule::call(record::store, ["name"]))
//!     .with("/muppets/muppet~", Rule::handler(record::end_rec));
//! let layout = RecordLayout::new([("id", false), ("name", true)]);
//!
//! let mut parser = rule_parser(rules, RecordBuilder::with_writer(layout, Vec::new()));
//! parser.parse_str(r#"<muppets><muppet id="7">Kermit</muppet></muppets>"#)?;
//!
//! let out = parser.into_state().into_inner();
//! assert_eq!(String::from_utf8(out).unwrap(), "7 \"Kermit\"\n");
//! # Ok::<(), tagpath::Error>(())
//! ```

pub mod core;
pub mod error;
pub mod reader;
pub mod rules;
pub mod sax;
pub mod strategy;

pub use error::{Error, Result};
pub use reader::{ContentHandler, Diagnostic, Severity, XmlReader};
pub use rules::{InsertGenerator, RecordBuilder, RecordLayout, Rule, RuleDispatcher, RuleOwner, RuleTable};
pub use sax::{TagEvent, TagSink, Variable, VariableSink};
pub use strategy::{path_parser, rule_parser, tag_parser, variable_parser, TagParser};
