//! Core XML parsing primitives
//!
//! This module contains the fundamental building blocks for XML parsing:
//! - Scanner: SIMD-accelerated delimiter detection using memchr
//! - Markup: construct classification, safe chunk boundaries and tokenization
//! - Entities: XML entity decoding with Cow (zero-copy when possible)
//! - Attributes: Attribute parsing and extraction
//! - Encoding: byte order mark and UTF-16 detection

pub mod attributes;
pub mod encoding;
pub mod entities;
pub mod markup;
pub mod scanner;
