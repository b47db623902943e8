//! Tag, Path and Variable Layers
//!
//! Turns tokenizer callbacks into canonical name/value pairs.
//!
//! ## Architecture
//!
//! ```text
//! XmlReader ---> TagAdapter ---> PathTracker ---> Canonicalizer ---> VariableSink
//!   (bytes)     (tag events)    (path events)     (name=value)
//! ```
//!
//! Each layer owns the next one, so the whole chain is a single value that the
//! reader drives. Any layer can be the end of the chain: a `TagSink` accepts
//! either bare tag names or full paths, depending on where it is plugged in.

pub mod adapter;
pub mod collector;
pub mod events;
pub mod path;
pub mod variable;

pub use adapter::TagAdapter;
pub use collector::{EventCollector, TraceSink};
pub use events::{TagEvent, TagSink, Variable, VariableSink};
pub use path::PathTracker;
pub use variable::{Canonicalizer, DOCUMENT_END, DOCUMENT_START};
