//! Rule Dispatcher
//!
//! Looks up each canonical name in the rule table and runs the matching rule
//! against the owner state. Unmatched names are dropped silently.

use log::trace;

use super::table::RuleTable;
use crate::error::Result;
use crate::sax::events::VariableSink;
use crate::sax::variable::{DOCUMENT_END, DOCUMENT_START};

/// State that parameterized rules mutate
///
/// The dispatcher notifies the owner at the document brackets so per-document
/// state can be reset. `document_started` runs before any rule bound to `/`,
/// `document_finished` after any rule bound to `/~`.
pub trait RuleOwner {
    fn document_started(&mut self) -> Result<()> {
        Ok(())
    }

    fn document_finished(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Stateless owner for tables made only of value rules
impl RuleOwner for () {}

/// Variable sink that dispatches through a rule table
pub struct RuleDispatcher<S> {
    rules: RuleTable<S>,
    state: S,
    matched: u64,
    dropped: u64,
}

impl<S: RuleOwner> RuleDispatcher<S> {
    pub fn new(rules: RuleTable<S>, state: S) -> Self {
        RuleDispatcher {
            rules,
            state,
            matched: 0,
            dropped: 0,
        }
    }

    /// Run the rule for `name`, if any. Returns whether a rule matched.
    pub fn dispatch(&mut self, name: &str, value: &str) -> Result<bool> {
        let Some(rule) = self.rules.get_mut(name) else {
            self.dropped += 1;
            return Ok(false);
        };
        trace!("dispatch {name}");
        self.matched += 1;
        rule.apply(&mut self.state, value)
            .map_err(|e| e.in_rule(name))?;
        Ok(true)
    }

    pub fn rules(&self) -> &RuleTable<S> {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut RuleTable<S> {
        &mut self.rules
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn into_state(self) -> S {
        self.state
    }

    /// Number of variables that matched a rule
    pub fn matched(&self) -> u64 {
        self.matched
    }

    /// Number of variables with no rule
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl<S: RuleOwner> VariableSink for RuleDispatcher<S> {
    fn variable(&mut self, name: &str, value: &str) -> Result<()> {
        if name == DOCUMENT_START {
            self.state.document_started()?;
        }
        self.dispatch(name, value)?;
        if name == DOCUMENT_END {
            self.state.document_finished()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::rules::table::{Params, Rule};

    #[derive(Default)]
    struct Log {
        lines: Vec<String>,
        documents: usize,
    }

    impl RuleOwner for Log {
        fn document_started(&mut self) -> Result<()> {
            self.lines.clear();
            Ok(())
        }

        fn document_finished(&mut self) -> Result<()> {
            self.documents += 1;
            Ok(())
        }
    }

    fn note(state: &mut Log, params: &Params, value: &str) -> Result<()> {
        let label = params.require(0, "label")?;
        state.lines.push(format!("{label}:{value}"));
        Ok(())
    }

    #[test]
    fn test_exact_match_only() {
        let rules = RuleTable::new()
            .with("/a/b/", Rule::call(note, ["text"]))
            .with("/a/b~", Rule::call(note, ["end"]));
        let mut dispatcher = RuleDispatcher::new(rules, Log::default());

        for (name, value) in [("/", ""), ("/a", ""), ("/a/b", ""), ("/a/b/", "X"), ("/a/b~", ""), ("/a~", ""), ("/~", "")] {
            dispatcher.variable(name, value).unwrap();
        }

        assert_eq!(dispatcher.state().lines, vec!["text:X", "end:"]);
        assert_eq!(dispatcher.matched(), 2);
        assert_eq!(dispatcher.dropped(), 5);
        assert_eq!(dispatcher.into_state().documents, 1);
    }

    #[test]
    fn test_rule_error_names_the_rule() {
        let rules = RuleTable::new().with("/a/", Rule::call(note, Vec::<String>::new()));
        let mut dispatcher = RuleDispatcher::new(rules, Log::default());
        match dispatcher.variable("/a/", "v") {
            Err(Error::Rule { name, .. }) => assert_eq!(name, "/a/"),
            other => panic!("expected rule error, got {other:?}"),
        }
    }

    #[test]
    fn test_value_rule_without_state() {
        use std::cell::RefCell;
        use std::rc::Rc;

        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let rules = RuleTable::new().with(
            "/html/head/title/",
            Rule::value(move |v| {
                sink.borrow_mut().push(v.to_string());
                Ok(())
            }),
        );
        let mut dispatcher = RuleDispatcher::new(rules, ());
        dispatcher.variable("/html/head/title/", "Home").unwrap();
        dispatcher.variable("/html/head/title", "").unwrap();
        assert_eq!(*seen.borrow(), vec!["Home"]);
    }
}
