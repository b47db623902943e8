//! Path Tracker
//!
//! Replaces the bare tag name on every event with the slash-delimited path of
//! open elements.

use log::trace;

use super::events::TagSink;
use crate::error::{Error, Result};

/// Stack of open tag names, forwarding path-bearing events
pub struct PathTracker<S> {
    sink: S,
    stack: Vec<String>,
    /// `/a/b` for the current stack; empty at the root
    path: String,
}

impl<S: TagSink> PathTracker<S> {
    pub fn new(sink: S) -> Self {
        PathTracker {
            sink,
            stack: Vec::with_capacity(16),
            path: String::with_capacity(128),
        }
    }

    /// Current path, `/` when no element is open
    pub fn path(&self) -> &str {
        if self.path.is_empty() {
            "/"
        } else {
            &self.path
        }
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn push(&mut self, tag: &str) {
        self.path.push('/');
        self.path.push_str(tag);
        self.stack.push(tag.to_string());
    }

    /// Check that `tag` closes the innermost element
    fn check_pop(&self, tag: &str) -> Result<()> {
        match self.stack.last() {
            Some(top) if top == tag => Ok(()),
            top => Err(Error::Nesting {
                expected: top.cloned(),
                found: tag.to_string(),
            }),
        }
    }

    fn pop(&mut self, tag: &str) {
        self.stack.pop();
        self.path.truncate(self.path.len() - tag.len() - 1);
    }
}

impl<S: TagSink> TagSink for PathTracker<S> {
    fn start_document(&mut self) -> Result<()> {
        self.stack.clear();
        self.path.clear();
        self.sink.start_document()
    }

    fn start(&mut self, tag: &str) -> Result<()> {
        self.push(tag);
        trace!("push {}", self.path);
        self.sink.start(&self.path)
    }

    fn attribute(&mut self, _tag: &str, attribute: &str, value: &str) -> Result<()> {
        let path: &str = if self.path.is_empty() { "/" } else { &self.path };
        self.sink.attribute(path, attribute, value)
    }

    fn data(&mut self, _tag: &str, text: &str) -> Result<()> {
        let path: &str = if self.path.is_empty() { "/" } else { &self.path };
        self.sink.data(path, text)
    }

    fn end(&mut self, tag: &str) -> Result<()> {
        // Validated first so no end is forwarded for the wrong path
        self.check_pop(tag)?;
        self.sink.end(&self.path)?;
        self.pop(tag);
        Ok(())
    }

    fn end_document(&mut self) -> Result<()> {
        self.sink.end_document()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sax::collector::EventCollector;
    use crate::sax::events::TagEvent;

    #[test]
    fn test_paths_follow_stack() {
        let mut tracker = PathTracker::new(EventCollector::new());
        assert_eq!(tracker.path(), "/");
        tracker.start_document().unwrap();
        tracker.start("a").unwrap();
        tracker.start("b").unwrap();
        assert_eq!(tracker.path(), "/a/b");
        tracker.data("b", "x").unwrap();
        tracker.end("b").unwrap();
        tracker.attribute("a", "k", "v").unwrap();
        tracker.end("a").unwrap();
        tracker.end_document().unwrap();
        assert_eq!(tracker.depth(), 0);
        assert_eq!(tracker.path(), "/");

        assert_eq!(
            tracker.into_sink().into_events(),
            vec![
                TagEvent::StartDocument,
                TagEvent::Start("/a".into()),
                TagEvent::Start("/a/b".into()),
                TagEvent::Data {
                    name: "/a/b".into(),
                    text: "x".into()
                },
                TagEvent::End("/a/b".into()),
                TagEvent::Attribute {
                    name: "/a".into(),
                    attribute: "k".into(),
                    value: "v".into()
                },
                TagEvent::End("/a".into()),
                TagEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_mismatched_pop_is_nesting_error() {
        let mut tracker = PathTracker::new(EventCollector::new());
        tracker.start("a").unwrap();
        tracker.start("b").unwrap();
        match tracker.end("a") {
            Err(Error::Nesting { expected, found }) => {
                assert_eq!(expected.as_deref(), Some("b"));
                assert_eq!(found, "a");
            }
            other => panic!("expected nesting error, got {other:?}"),
        }
        // Nothing forwarded for the rejected end
        assert!(!tracker
            .sink()
            .events()
            .iter()
            .any(|e| matches!(e, TagEvent::End(_))));
    }

    #[test]
    fn test_empty_stack_pop_is_nesting_error() {
        let mut tracker = PathTracker::new(EventCollector::new());
        let err = tracker.end("a").unwrap_err();
        assert!(matches!(err, Error::Nesting { expected: None, .. }));
    }

    #[test]
    fn test_repeated_siblings_share_path() {
        let mut tracker = PathTracker::new(EventCollector::new());
        tracker.start("list").unwrap();
        for _ in 0..2 {
            tracker.start("item").unwrap();
            tracker.end("item").unwrap();
        }
        tracker.end("list").unwrap();
        let starts: Vec<_> = tracker
            .sink()
            .events()
            .iter()
            .filter_map(|e| match e {
                TagEvent::Start(p) => Some(p.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec!["/list", "/list/item", "/list/item"]);
    }
}
