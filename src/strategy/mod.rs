//! Parsing Strategy Module
//!
//! Ways to run the pipeline:
//! - Parser: reader plus handler chain, fed incrementally or from a str/file
//! - Inspect: sinks for exploring a document's canonical names
//! - Parallel: many independent documents on the Rayon pool

pub mod inspect;
#[cfg(feature = "parallel")]
pub mod parallel;
pub mod parser;

pub use inspect::{HrefExtractor, PathClassifier, VariablePrinter};
#[cfg(feature = "parallel")]
pub use parallel::parse_many;
pub use parser::{
    path_parser, rule_parser, tag_parser, variable_parser, PathParser, RuleParser,
    TagEventParser, TagParser, VariableParser,
};
