//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//! - Common HTML named entities (&nbsp;, &copy;, ...)
//!
//! Uses Cow for zero-copy when no entities are present.

use memchr::memchr;
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy), Owned otherwise.
/// References that cannot be resolved are kept literally and their source
/// text (`&name;`, or just `&name` / `&` when no `;` closes it) pushed onto
/// `unresolved`.
pub fn decode_text<'a>(input: &'a str, unresolved: &mut Vec<&'a str>) -> Cow<'a, str> {
    // Fast path: check if there are any entities using SIMD
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }
    Cow::Owned(decode_entities(input, unresolved))
}

fn decode_entities<'a>(input: &'a str, unresolved: &mut Vec<&'a str>) -> String {
    let bytes = input.as_bytes();
    let mut result = String::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &bytes[pos..]) {
        // Copy everything before the entity
        result.push_str(&input[pos..pos + amp_offset]);
        pos += amp_offset;

        // A reference body runs up to ';' and never spans whitespace or another '&'
        let rest = &bytes[pos + 1..];
        let body_len = rest
            .iter()
            .position(|&b| matches!(b, b';' | b'&' | b' ' | b'\t' | b'\n' | b'\r'))
            .unwrap_or(rest.len());
        let terminated = rest.get(body_len) == Some(&b';');
        if terminated {
            if let Some(c) = decode_entity(&input[pos + 1..pos + 1 + body_len]) {
                result.push(c);
                pos += body_len + 2;
                continue;
            }
        }

        // Unknown entity or bare '&', keep as-is
        let reference_end = pos + 1 + body_len + usize::from(terminated);
        unresolved.push(&input[pos..reference_end]);
        result.push('&');
        pos += 1;
    }

    result.push_str(&input[pos..]);
    result
}

/// Decode a single entity body (without & and ;)
fn decode_entity(entity: &str) -> Option<char> {
    if let Some(numeric) = entity.strip_prefix('#') {
        return decode_numeric_entity(numeric);
    }

    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        // HTML5 named entities (common ones)
        "nbsp" => Some('\u{00A0}'),
        "copy" => Some('\u{00A9}'),
        "reg" => Some('\u{00AE}'),
        "trade" => Some('\u{2122}'),
        "mdash" => Some('\u{2014}'),
        "ndash" => Some('\u{2013}'),
        "lsquo" => Some('\u{2018}'),
        "rsquo" => Some('\u{2019}'),
        "ldquo" => Some('\u{201C}'),
        "rdquo" => Some('\u{201D}'),
        "hellip" => Some('\u{2026}'),
        "pound" => Some('\u{00A3}'),
        "euro" => Some('\u{20AC}'),
        _ => None,
    }
}

/// Decode a numeric character reference body (after '#')
fn decode_numeric_entity(entity: &str) -> Option<char> {
    let codepoint = match entity.strip_prefix('x').or_else(|| entity.strip_prefix('X')) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => entity.parse::<u32>().ok()?,
    };

    if !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}
