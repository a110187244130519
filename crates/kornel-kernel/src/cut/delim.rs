//! Word and line delimiters, plus the byte classification table.

use super::CutError;
use crate::locale::Locale;

/// A delimiter character and its encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiter {
    ch: char,
    bytes: Vec<u8>,
}

impl Delimiter {
    /// Tab, the default word delimiter.
    pub fn tab() -> Self {
        Self::byte(b'\t')
    }

    /// Newline, the default line delimiter.
    pub fn newline() -> Self {
        Self::byte(b'\n')
    }

    /// A single-byte delimiter.
    pub fn byte(b: u8) -> Self {
        Self {
            ch: char::from(b),
            bytes: vec![b],
        }
    }

    /// Parse a user-supplied delimiter. An empty string means NUL.
    pub fn parse(text: &str, locale: Locale) -> Result<Self, CutError> {
        let mut chars = text.chars();
        let Some(ch) = chars.next() else {
            return Ok(Self::byte(0));
        };
        if chars.next().is_some() {
            return Err(CutError::Delimiter(text.to_string()));
        }
        if !locale.is_multibyte() && ch.len_utf8() > 1 {
            return Err(CutError::Delimiter(text.to_string()));
        }
        let mut buf = [0u8; 4];
        Ok(Self {
            ch,
            bytes: ch.encode_utf8(&mut buf).as_bytes().to_vec(),
        })
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The byte value, when the delimiter encodes to exactly one byte.
    pub fn single_byte(&self) -> Option<u8> {
        match self.bytes.as_slice() {
            [b] => Some(*b),
            _ => None,
        }
    }
}

/// What a byte means to the field scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteClass {
    Ordinary,
    /// Single-byte word delimiter.
    Word,
    /// Single-byte line delimiter.
    Line,
    /// Part of a multibyte character; decode to classify.
    Wide,
}

/// 256-entry byte classification table.
#[derive(Debug, Clone)]
pub struct ClassTable {
    classes: [ByteClass; 256],
}

impl ClassTable {
    pub fn new(word: &Delimiter, line: &Delimiter, locale: Locale) -> Self {
        let mut classes = [ByteClass::Ordinary; 256];
        if locale.is_multibyte() {
            for class in &mut classes[0x80..] {
                *class = ByteClass::Wide;
            }
        }
        if let Some(b) = word.single_byte() {
            classes[usize::from(b)] = ByteClass::Word;
        }
        // a line delimiter wins over an identical word delimiter
        if let Some(b) = line.single_byte() {
            classes[usize::from(b)] = ByteClass::Line;
        }
        Self { classes }
    }

    #[inline]
    pub fn class(&self, b: u8) -> ByteClass {
        self.classes[usize::from(b)]
    }
}
