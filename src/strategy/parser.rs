//! Parser Facade
//!
//! Owns an [`XmlReader`] and the handler chain it drives, and exposes the
//! incremental `start` / `feed` / `finish` session plus whole-input helpers.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::reader::{ContentHandler, XmlReader};
use crate::rules::{RuleDispatcher, RuleOwner, RuleTable};
use crate::sax::{Canonicalizer, PathTracker, TagAdapter, TagSink, VariableSink};

/// Tag events with bare tag names
pub type TagEventParser<S> = TagParser<TagAdapter<S>>;
/// Tag events carrying full paths
pub type PathParser<S> = TagParser<TagAdapter<PathTracker<S>>>;
/// Canonical name/value pairs
pub type VariableParser<V> = TagParser<TagAdapter<PathTracker<Canonicalizer<V>>>>;
/// Variables dispatched through a rule table
pub type RuleParser<S> = VariableParser<RuleDispatcher<S>>;

/// Parser that owns a reader and the handler it drives
pub struct TagParser<H> {
    reader: XmlReader,
    handler: H,
}

impl<H: ContentHandler> TagParser<H> {
    pub fn new(handler: H) -> Self {
        TagParser {
            reader: XmlReader::new(),
            handler,
        }
    }

    /// Open an incremental parse session
    pub fn start(&mut self) -> Result<()> {
        self.reader.start(&mut self.handler)
    }

    /// Feed one chunk; a chunk may end anywhere, even inside a tag
    pub fn feed(&mut self, chunk: impl AsRef<[u8]>) -> Result<()> {
        self.reader.feed(chunk.as_ref(), &mut self.handler)
    }

    /// Close the session
    pub fn finish(&mut self) -> Result<()> {
        self.reader.finish(&mut self.handler)
    }

    /// True between `start` and `finish`
    pub fn is_active(&self) -> bool {
        self.reader.is_active()
    }

    /// Parse a whole document held in memory
    pub fn parse_str(&mut self, input: &str) -> Result<()> {
        self.parse_from([input])
    }

    /// Parse a document supplied as a sequence of chunks
    pub fn parse_from<I>(&mut self, chunks: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        self.start()?;
        for chunk in chunks {
            self.feed(chunk)?;
        }
        self.finish()
    }

    /// Parse a document from a reader, one line per feed
    pub fn parse_reader<R: Read>(&mut self, reader: R) -> Result<()> {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::with_capacity(256);
        self.start()?;
        loop {
            line.clear();
            let read = match reader.read_until(b'\n', &mut line) {
                Ok(read) => read,
                Err(e) => {
                    self.reader.abort();
                    return Err(e.into());
                }
            };
            if read == 0 {
                break;
            }
            self.feed(&line)?;
        }
        self.finish()
    }

    /// Parse a local file, one line per feed
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        debug!("parsing {}", path.display());
        self.parse_reader(File::open(path)?)
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    pub fn into_handler(self) -> H {
        self.handler
    }
}

impl<S: TagSink> TagParser<TagAdapter<S>> {
    /// The sink at the end of the tag adapter
    pub fn sink(&self) -> &S {
        self.handler.sink()
    }

    pub fn sink_mut(&mut self) -> &mut S {
        self.handler.sink_mut()
    }

    pub fn into_sink(self) -> S {
        self.handler.into_sink()
    }
}

impl<V: VariableSink> TagParser<TagAdapter<PathTracker<Canonicalizer<V>>>> {
    /// The variable sink at the end of the chain
    pub fn variables(&self) -> &V {
        self.handler.sink().sink().sink()
    }

    pub fn variables_mut(&mut self) -> &mut V {
        self.handler.sink_mut().sink_mut().sink_mut()
    }

    pub fn into_variables(self) -> V {
        self.handler.into_sink().into_sink().into_sink()
    }
}

impl<S: RuleOwner> TagParser<TagAdapter<PathTracker<Canonicalizer<RuleDispatcher<S>>>>> {
    pub fn dispatcher(&self) -> &RuleDispatcher<S> {
        self.variables()
    }

    /// Rule owner state
    pub fn state(&self) -> &S {
        self.variables().state()
    }

    pub fn state_mut(&mut self) -> &mut S {
        self.variables_mut().state_mut()
    }

    pub fn into_state(self) -> S {
        self.into_variables().into_state()
    }
}

/// Parser reporting tag events with bare names to `sink`
pub fn tag_parser<S: TagSink>(sink: S) -> TagEventParser<S> {
    TagParser::new(TagAdapter::new(sink))
}

/// Parser reporting tag events with full paths to `sink`
pub fn path_parser<S: TagSink>(sink: S) -> PathParser<S> {
    tag_parser(PathTracker::new(sink))
}

/// Parser reporting canonical name/value pairs to `sink`
pub fn variable_parser<V: VariableSink>(sink: V) -> VariableParser<V> {
    path_parser(Canonicalizer::new(sink))
}

/// Parser dispatching variables through `rules` against `state`
pub fn rule_parser<S: RuleOwner>(rules: RuleTable<S>, state: S) -> RuleParser<S> {
    variable_parser(RuleDispatcher::new(rules, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::sax::{EventCollector, TagEvent, TraceSink, Variable};

    #[test]
    fn test_tag_parser_trace() {
        let mut parser = tag_parser(TraceSink::new(Vec::new()));
        parser
            .parse_str("<car id=\"3\"><make>Ford</make></car>")
            .unwrap();
        let out = String::from_utf8(parser.into_sink().into_inner()).unwrap();
        assert_eq!(
            out,
            "startDoc\nstart:car\nattr:(car) id=3\nstart:make\ndata:(make) Ford\nend:make\nend:car\nendDoc\n"
        );
    }

    #[test]
    fn test_path_parser_events() {
        let mut parser = path_parser(EventCollector::new());
        parser.parse_str("<a><b>x</b></a>").unwrap();
        assert!(parser.sink().sink().events().contains(&TagEvent::Data {
            name: "/a/b".into(),
            text: "x".into()
        }));
    }

    #[test]
    fn test_variable_parser_line_chunks() {
        let mut parser = variable_parser(Vec::<Variable>::new());
        parser
            .parse_from(["<a>\n", "  <b k=\"v\">text</b>\n", "</a>\n"])
            .unwrap();
        let names: Vec<&str> = parser.variables().iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, vec!["/", "/a", "/a/b", "/a/b/k", "/a/b/", "/a/b~", "/a~", "/~"]);
    }

    #[test]
    fn test_session_ordering_errors() {
        let mut parser = variable_parser(Vec::<Variable>::new());
        assert!(matches!(parser.feed("<a/>"), Err(Error::Usage(_))));
        parser.start().unwrap();
        assert!(parser.is_active());
        assert!(matches!(parser.start(), Err(Error::Usage(_))));
        parser.feed("<a/>").unwrap();
        parser.finish().unwrap();
        assert!(matches!(parser.finish(), Err(Error::Usage(_))));
    }

    #[test]
    fn test_parser_reusable_after_finish() {
        let mut parser = variable_parser(Vec::<Variable>::new());
        parser.parse_str("<a/>").unwrap();
        parser.parse_str("<b/>").unwrap();
        assert_eq!(parser.variables().len(), 8);
        assert_eq!(parser.variables()[4], Variable::new("/", ""));
    }

    /// Yields its lines, then fails
    struct FailingReader {
        data: &'static [u8],
    }

    impl Read for FailingReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.data.is_empty() {
                return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk gone"));
            }
            let n = buf.len().min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    #[test]
    fn test_read_error_leaves_parser_reusable() {
        let mut parser = variable_parser(Vec::<Variable>::new());
        let err = parser
            .parse_reader(FailingReader { data: b"<a>\n" })
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!parser.is_active());

        parser.parse_str("<ok/>").unwrap();
        assert!(parser.variables().contains(&Variable::new("/ok", "")));
    }

    #[test]
    fn test_stray_lt_split_matches_whole() {
        let mut whole = variable_parser(Vec::<Variable>::new());
        whole.parse_str("<a>1 < 2</a>").unwrap();
        let mut split = variable_parser(Vec::<Variable>::new());
        split.parse_from(["<a>1 <", " ", "2</a>"]).unwrap();
        assert_eq!(split.into_variables(), whole.into_variables());
    }
}
