//! Markup tokenizer and chunk boundary detection
//!
//! The streaming reader only tokenizes input up to a *safe boundary*: the end
//! of the last construct that is known to be complete. Both functions here
//! classify a `<` by the byte that follows it, in the same way, so the
//! boundary finder and the tokenizer always agree on where constructs end.
//!
//! ```text
//! <name ...>  <name .../>   start tag ('>' found outside quotes)
//! </name>                   end tag
//! <!-- ... -->              comment
//! <![CDATA[ ... ]]>         CDATA section
//! <!DOCTYPE ... [ ... ]>    declaration (bracket depth and quotes tracked)
//! <? ... ?>                 processing instruction / XML declaration
//! < (anything else)         stray '<', kept as text
//! ```

use super::scanner::{is_name_start_char, Scanner};

/// Kind of construct opened by the `<` at the scanner position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Opener {
    StartTag,
    EndTag,
    Comment,
    CData,
    Declaration,
    ProcessingInstruction,
    Stray,
}

/// Classify the construct starting at `<`; `None` means more input is needed
fn classify(scanner: &Scanner<'_>) -> Option<Opener> {
    match scanner.peek_at(1)? {
        b'/' => Some(Opener::EndTag),
        b'?' => Some(Opener::ProcessingInstruction),
        b'!' => {
            let mut probe = Scanner::new(scanner.slice(scanner.position(), scanner.len()));
            probe.advance(1);
            if probe.starts_with(b"!--") {
                Some(Opener::Comment)
            } else if probe.starts_with(b"![CDATA[") {
                Some(Opener::CData)
            } else if probe.is_prefix_of(b"!--") || probe.is_prefix_of(b"![CDATA[") {
                None
            } else {
                Some(Opener::Declaration)
            }
        }
        c if is_name_start_char(c) => Some(Opener::StartTag),
        _ => Some(Opener::Stray),
    }
}

/// Find the end (exclusive) of the construct opened at the scanner position
///
/// `resume` is where an earlier search for the closing sequence gave up; the
/// sequence-terminated constructs restart from there instead of rescanning.
fn construct_end(scanner: &Scanner<'_>, opener: Opener, resume: Option<usize>) -> Option<usize> {
    let start = scanner.position();
    let mut probe = Scanner::new(scanner.slice(0, scanner.len()));
    let from = |skip: usize| resume.map_or(start + skip, |at| at.max(start + skip));
    match opener {
        Opener::StartTag => {
            probe.set_position(start + 1);
            probe.find_tag_end_quoted().map(|gt| gt + 1)
        }
        Opener::EndTag => {
            probe.set_position(from(2));
            probe.find_seq(b">").map(|gt| gt + 1)
        }
        Opener::Comment => {
            probe.set_position(from(4));
            probe.find_seq(b"-->").map(|end| end + 3)
        }
        Opener::CData => {
            probe.set_position(from(9));
            probe.find_seq(b"]]>").map(|end| end + 3)
        }
        Opener::ProcessingInstruction => {
            probe.set_position(from(2));
            probe.find_seq(b"?>").map(|end| end + 2)
        }
        Opener::Declaration => {
            probe.set_position(start + 2);
            find_declaration_end(&mut probe).map(|gt| gt + 1)
        }
        Opener::Stray => Some(start + 1),
    }
}

/// Find the '>' closing a `<!...>` declaration, skipping an internal subset
///
/// Comments and processing instructions inside the subset are skipped whole,
/// so quotes and brackets in them do not count.
fn find_declaration_end(scanner: &mut Scanner<'_>) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;

    while let Some(c) = scanner.peek() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, b'<') if depth > 0 && scanner.starts_with(b"<!--") => {
                scanner.advance(4);
                let end = scanner.find_seq(b"-->")?;
                scanner.set_position(end + 3);
                continue;
            }
            (None, b'<') if depth > 0 && scanner.starts_with(b"<?") => {
                scanner.advance(2);
                let end = scanner.find_seq(b"?>")?;
                scanner.set_position(end + 2);
                continue;
            }
            (None, b'"') | (None, b'\'') => quote = Some(c),
            (None, b'[') => depth += 1,
            (None, b']') => depth = depth.saturating_sub(1),
            (None, b'>') if depth == 0 => return Some(scanner.position()),
            _ => {}
        }
        scanner.advance(1);
    }
    None
}

/// Incremental safe-boundary finder for a buffer that grows by appending
///
/// [`BoundaryFinder::find`] returns the length of the longest prefix made
/// only of complete constructs. Text is complete once the `<` that ends it
/// has arrived; a stray `<` belongs to the text run around it, so trailing
/// text (and a trailing stray `<`) is left for the next chunk.
///
/// The caller must drop exactly the returned prefix from the buffer before
/// appending more input. Between calls the finder remembers how far the tail
/// was already searched: trailing text is not searched for `<` again, and an
/// unfinished comment, CDATA section, processing instruction or end tag
/// resumes its search for the closing sequence.
#[derive(Debug, Clone, Default)]
pub struct BoundaryFinder {
    /// Tail offset where the search for the next `<` restarts
    resume: usize,
    /// Tail offset where the closing-sequence search of the unfinished
    /// construct at `resume` restarts
    construct_resume: Option<usize>,
}

impl BoundaryFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget the remembered progress (new session)
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn find(&mut self, input: &[u8]) -> usize {
        let mut scanner = Scanner::new(input);
        let mut boundary = 0;
        let mut search_from = self.resume.min(input.len());
        let mut construct_resume = self.construct_resume.take();
        let construct_start = search_from;

        // Where the next search restarts, relative to the start of `input`
        let (resume, pending) = loop {
            scanner.set_position(search_from);
            let Some(lt) = scanner.find_tag_start() else {
                break (input.len(), None);
            };
            // Text before the '<' is complete now
            boundary = lt;
            scanner.set_position(lt);

            let Some(opener) = classify(&scanner) else {
                break (lt, None);
            };
            if opener == Opener::Stray {
                // Decided by the byte after it; it stays with the text that follows
                search_from = lt + 1;
                continue;
            }
            let hint = if lt == construct_start { construct_resume.take() } else { None };
            match construct_end(&scanner, opener, hint) {
                Some(end) => {
                    boundary = end;
                    search_from = end;
                }
                None => {
                    // Up to three bytes of a closing sequence may already be here
                    break (lt, Some(input.len().saturating_sub(3)));
                }
            }
        };

        self.resume = resume - boundary;
        self.construct_resume = pending.map(|at| at.saturating_sub(boundary));
        boundary
    }
}

/// One-shot [`BoundaryFinder::find`] over a whole buffer
pub fn find_safe_boundary(input: &[u8]) -> usize {
    BoundaryFinder::new().find(input)
}

/// A markup token borrowed from the input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind<'a> {
    /// Character data between markup (entities not yet decoded)
    Text(&'a str),
    /// A '<' that opens no construct; it stands for itself
    Stray,
    /// CDATA section content (excluding markers)
    CData(&'a str),
    /// Start tag; `attributes` is the raw text between the name and `>`/`/>`
    StartTag {
        name: &'a str,
        attributes: &'a str,
        empty: bool,
    },
    /// End tag with its name
    EndTag(&'a str),
    /// End tag without a valid name, e.g. `</ >`
    BadEndTag,
    /// Comment content (excluding markers)
    Comment(&'a str),
    /// Processing instruction or XML declaration, with its target
    ProcessingInstruction(&'a str),
    /// `<!DOCTYPE ...>` or another `<!...>` declaration
    Declaration(&'a str),
    /// Construct started but its end never arrived
    Unterminated(&'static str),
}

/// Token plus its byte offset in the tokenized input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub offset: usize,
}

/// Pull tokenizer over a slice of markup
pub struct MarkupTokenizer<'a> {
    input: &'a str,
    scanner: Scanner<'a>,
}

impl<'a> MarkupTokenizer<'a> {
    pub fn new(input: &'a str) -> Self {
        MarkupTokenizer {
            input,
            scanner: Scanner::new(input.as_bytes()),
        }
    }

    fn text_token(&mut self, start: usize) -> Token<'a> {
        let end = self.scanner.find_tag_start().unwrap_or(self.input.len());
        self.scanner.set_position(end);
        Token {
            kind: TokenKind::Text(&self.input[start..end]),
            offset: start,
        }
    }

    fn markup_token(&mut self, start: usize) -> Token<'a> {
        let Some(opener) = classify(&self.scanner) else {
            self.scanner.set_position(self.input.len());
            return Token {
                kind: TokenKind::Unterminated("markup"),
                offset: start,
            };
        };
        let Some(end) = construct_end(&self.scanner, opener, None) else {
            self.scanner.set_position(self.input.len());
            return Token {
                kind: TokenKind::Unterminated(opener_name(opener)),
                offset: start,
            };
        };
        self.scanner.set_position(end);

        let kind = match opener {
            Opener::StartTag => self.start_tag(start, end),
            Opener::EndTag => self.end_tag(start, end),
            Opener::Comment => TokenKind::Comment(&self.input[start + 4..end - 3]),
            Opener::CData => TokenKind::CData(&self.input[start + 9..end - 3]),
            Opener::ProcessingInstruction => {
                let mut probe = Scanner::new(self.input.as_bytes());
                probe.set_position(start + 2);
                let target_start = probe.position();
                probe.read_name();
                TokenKind::ProcessingInstruction(&self.input[target_start..probe.position()])
            }
            Opener::Declaration => TokenKind::Declaration(&self.input[start + 2..end - 1]),
            Opener::Stray => TokenKind::Stray,
        };
        Token { kind, offset: start }
    }

    fn start_tag(&self, start: usize, end: usize) -> TokenKind<'a> {
        let mut probe = Scanner::new(self.input.as_bytes());
        probe.set_position(start + 1);
        let name_start = probe.position();
        // classify() guarantees a name start byte here
        probe.read_name();
        let name_end = probe.position();

        let body_end = end - 1;
        let empty = body_end > name_end && self.input.as_bytes()[body_end - 1] == b'/';
        let attributes_end = if empty { body_end - 1 } else { body_end };

        TokenKind::StartTag {
            name: &self.input[name_start..name_end],
            attributes: &self.input[name_end..attributes_end.max(name_end)],
            empty,
        }
    }

    fn end_tag(&self, start: usize, end: usize) -> TokenKind<'a> {
        let mut probe = Scanner::new(self.input.as_bytes());
        probe.set_position(start + 2);
        let name_start = probe.position();
        if probe.read_name().is_none() {
            return TokenKind::BadEndTag;
        }
        let name_end = probe.position();
        probe.skip_whitespace();
        if probe.position() != end - 1 {
            return TokenKind::BadEndTag;
        }
        TokenKind::EndTag(&self.input[name_start..name_end])
    }
}

impl<'a> Iterator for MarkupTokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let start = self.scanner.position();
        match self.scanner.peek()? {
            b'<' => Some(self.markup_token(start)),
            _ => Some(self.text_token(start)),
        }
    }
}

fn opener_name(opener: Opener) -> &'static str {
    match opener {
        Opener::StartTag => "start tag",
        Opener::EndTag => "end tag",
        Opener::Comment => "comment",
        Opener::CData => "CDATA section",
        Opener::Declaration => "declaration",
        Opener::ProcessingInstruction => "processing instruction",
        Opener::Stray => "markup",
    }
}
