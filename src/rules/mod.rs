//! Rule Dispatch and Handler Strategies
//!
//! A [`RuleTable`] maps canonical names to rules; the [`RuleDispatcher`]
//! runs them against an owner state as variables arrive. Two reusable owner
//! states are provided:
//!
//! - [`RecordBuilder`]: one open record of named fields, written as a line
//!   when it closes (`record::start_rec`, `store`, `end_rec`, `set_pending`)
//! - [`InsertGenerator`]: per-record tables flushed to `INSERT` statements
//!   (`insert::start_rec`, `store`, `flush`, `end_rec`, `set_pending`)
//!
//! Custom states implement [`RuleOwner`], plus [`RecordOwner`] or
//! [`InsertOwner`] to reuse the stock handlers.

pub mod dispatch;
pub mod insert;
pub mod record;
pub mod table;

pub use dispatch::{RuleDispatcher, RuleOwner};
pub use insert::{InsertGenerator, InsertOptions, InsertOwner};
pub use record::{Field, RecordBuilder, RecordLayout, RecordOwner};
pub use table::{Handler, Params, PathKey, Rule, RuleTable, ValueFn};
