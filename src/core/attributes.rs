//! XML Attribute Parsing
//!
//! Parses XML attributes from tag content. Parsing is lenient: malformed
//! attributes are recorded as issues and skipped (or kept with an empty value
//! for HTML-style bare names) so the caller can report them and carry on.

use super::entities::decode_text;
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use memchr::memchr;
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute<'a> {
    /// Attribute name (may include namespace prefix)
    pub name: &'a str,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, str>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute
    pub fn new(name: &'a str, value: impl Into<Cow<'a, str>>) -> Self {
        Attribute {
            name,
            value: value.into(),
        }
    }

    /// Namespace prefix (before colon), if any
    pub fn prefix(&self) -> Option<&'a str> {
        memchr(b':', self.name.as_bytes()).map(|pos| &self.name[..pos])
    }

    /// Local name (after colon, if namespaced)
    pub fn local_name(&self) -> &'a str {
        match memchr(b':', self.name.as_bytes()) {
            Some(pos) => &self.name[pos + 1..],
            None => self.name,
        }
    }
}

/// What went wrong with one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Byte that cannot start an attribute name
    InvalidName,
    /// Name without `=value`; kept with an empty value
    MissingValue(String),
    /// Value not wrapped in quotes; kept as read
    Unquoted(String),
    /// Closing quote never found; value runs to the end of the tag
    Unterminated(String),
    /// Second occurrence of a name; dropped
    Duplicate(String),
    /// Entity reference in a value that could not be resolved
    UnresolvedEntity(String),
}

/// A problem found while parsing an attribute list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeIssue {
    /// Byte offset within the parsed attribute text
    pub offset: usize,
    pub kind: IssueKind,
}

impl AttributeIssue {
    /// Unresolved entities are informational; everything else is a recoverable error
    pub fn is_warning(&self) -> bool {
        matches!(self.kind, IssueKind::UnresolvedEntity(_))
    }

    pub fn message(&self) -> String {
        match &self.kind {
            IssueKind::InvalidName => "invalid character in attribute list".to_string(),
            IssueKind::MissingValue(name) => format!("attribute {name:?} has no value"),
            IssueKind::Unquoted(name) => format!("attribute {name:?} value is not quoted"),
            IssueKind::Unterminated(name) => format!("attribute {name:?} value is not terminated"),
            IssueKind::Duplicate(name) => format!("duplicate attribute {name:?} ignored"),
            IssueKind::UnresolvedEntity(entity) => format!("unknown entity reference {entity}"),
        }
    }
}

/// Attributes of one tag plus any issues met on the way
#[derive(Debug, Default)]
pub struct ParsedAttributes<'a> {
    pub attributes: Vec<Attribute<'a>>,
    pub issues: Vec<AttributeIssue>,
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'
pub fn parse_attributes(input: &str) -> ParsedAttributes<'_> {
    let bytes = input.as_bytes();
    let mut parsed = ParsedAttributes::default();
    let mut pos = 0;

    while pos < bytes.len() {
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }
        if pos >= bytes.len() {
            break;
        }

        // Parse attribute name
        let name_start = pos;
        if !is_name_start_char(bytes[pos]) {
            parsed.issues.push(AttributeIssue {
                offset: pos,
                kind: IssueKind::InvalidName,
            });
            // Skip to the next whitespace so one bad run is reported once
            while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                pos += 1;
            }
            continue;
        }
        while pos < bytes.len() && is_name_char(bytes[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        // Skip whitespace around '='
        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        if pos >= bytes.len() || bytes[pos] != b'=' {
            // Attribute without value (like HTML boolean attributes)
            parsed.issues.push(AttributeIssue {
                offset: name_start,
                kind: IssueKind::MissingValue(name.to_string()),
            });
            push_attribute(&mut parsed, name_start, Attribute::new(name, ""));
            continue;
        }
        pos += 1; // Skip '='

        while pos < bytes.len() && is_whitespace(bytes[pos]) {
            pos += 1;
        }

        let (raw, value_offset) = match bytes.get(pos) {
            Some(&quote) if quote == b'"' || quote == b'\'' => {
                let value_start = pos + 1;
                match memchr(quote, &bytes[value_start..]) {
                    Some(len) => {
                        pos = value_start + len + 1;
                        (&input[value_start..value_start + len], value_start)
                    }
                    None => {
                        parsed.issues.push(AttributeIssue {
                            offset: name_start,
                            kind: IssueKind::Unterminated(name.to_string()),
                        });
                        pos = bytes.len();
                        (&input[value_start..], value_start)
                    }
                }
            }
            _ => {
                // Unquoted value (non-standard but handle it)
                let value_start = pos;
                while pos < bytes.len() && !is_whitespace(bytes[pos]) {
                    pos += 1;
                }
                parsed.issues.push(AttributeIssue {
                    offset: name_start,
                    kind: IssueKind::Unquoted(name.to_string()),
                });
                (&input[value_start..pos], value_start)
            }
        };

        let mut unresolved = Vec::new();
        let value = decode_text(raw, &mut unresolved);
        for entity in unresolved {
            parsed.issues.push(AttributeIssue {
                offset: value_offset,
                kind: IssueKind::UnresolvedEntity(entity.to_string()),
            });
        }
        push_attribute(&mut parsed, name_start, Attribute::new(name, value));
    }

    parsed
}

fn push_attribute<'a>(parsed: &mut ParsedAttributes<'a>, offset: usize, attribute: Attribute<'a>) {
    if parsed.attributes.iter().any(|a| a.name == attribute.name) {
        parsed.issues.push(AttributeIssue {
            offset,
            kind: IssueKind::Duplicate(attribute.name.to_string()),
        });
        return;
    }
    parsed.attributes.push(attribute);
}
