//! Rule Table
//!
//! Exact-match mapping from canonical name to a rule. A rule is either a
//! value callback or a parameterized handler that receives the rule owner
//! state, its parameters and the value.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;

use crate::error::{Error, Result};

/// Immutable canonical-name key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(Box<str>);

impl PathKey {
    pub fn new(name: impl Into<Box<str>>) -> Self {
        PathKey(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for PathKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PathKey {
    fn from(name: &str) -> Self {
        PathKey::new(name)
    }
}

impl From<String> for PathKey {
    fn from(name: String) -> Self {
        PathKey::new(name)
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments attached to a parameterized rule
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<String>);

impl Params {
    pub fn new<I>(params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Params(params.into_iter().map(Into::into).collect())
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    /// Parameter at `index`, or a rule error naming what was expected
    pub fn require(&self, index: usize, what: &str) -> Result<&str> {
        self.get(index).ok_or_else(|| Error::Rule {
            name: String::new(),
            message: format!("missing parameter {index} ({what})"),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parameterized handler: `(state, params, value)`
pub type Handler<S> = fn(&mut S, &Params, &str) -> Result<()>;

/// Callback for a value rule
pub type ValueFn = Box<dyn FnMut(&str) -> Result<()>>;

/// What to do when a canonical name matches
pub enum Rule<S> {
    /// Called with the value only
    Value(ValueFn),
    /// Called with the owner state, the attached parameters and the value
    Call(Handler<S>, Params),
}

impl<S> Rule<S> {
    pub fn value<F>(callback: F) -> Self
    where
        F: FnMut(&str) -> Result<()> + 'static,
    {
        Rule::Value(Box::new(callback))
    }

    pub fn call<I>(handler: Handler<S>, params: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Rule::Call(handler, Params::new(params))
    }

    /// Parameterized rule with no parameters
    pub fn handler(handler: Handler<S>) -> Self {
        Rule::Call(handler, Params::default())
    }

    /// Run the rule for one value
    pub fn apply(&mut self, state: &mut S, value: &str) -> Result<()> {
        match self {
            Rule::Value(callback) => callback(value),
            Rule::Call(handler, params) => handler(state, params, value),
        }
    }
}

impl<S> fmt::Debug for Rule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Value(_) => f.write_str("Rule::Value(..)"),
            Rule::Call(_, params) => f.debug_tuple("Rule::Call").field(params).finish(),
        }
    }
}

/// Exact-match table from canonical name to rule
pub struct RuleTable<S> {
    rules: HashMap<PathKey, Rule<S>>,
}

impl<S> RuleTable<S> {
    pub fn new() -> Self {
        RuleTable {
            rules: HashMap::new(),
        }
    }

    /// Insert a rule, returning any rule it replaces
    pub fn insert(&mut self, name: impl Into<PathKey>, rule: Rule<S>) -> Option<Rule<S>> {
        self.rules.insert(name.into(), rule)
    }

    /// Builder form of [`RuleTable::insert`]
    pub fn with(mut self, name: impl Into<PathKey>, rule: Rule<S>) -> Self {
        self.insert(name, rule);
        self
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Rule<S>> {
        self.rules.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Rule names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.rules.keys().map(PathKey::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<S> Default for RuleTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> fmt::Debug for RuleTable<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.rules.iter()).finish()
    }
}

impl<S, K: Into<PathKey>> FromIterator<(K, Rule<S>)> for RuleTable<S> {
    fn from_iter<I: IntoIterator<Item = (K, Rule<S>)>>(iter: I) -> Self {
        let mut table = RuleTable::new();
        table.extend(iter);
        table
    }
}

impl<S, K: Into<PathKey>> Extend<(K, Rule<S>)> for RuleTable<S> {
    fn extend<I: IntoIterator<Item = (K, Rule<S>)>>(&mut self, iter: I) {
        for (name, rule) in iter {
            self.insert(name, rule);
        }
    }
}
