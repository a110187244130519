//! Incremental UTF-8 decoding.
//!
//! Unlike `str::from_utf8`, the decoder distinguishes a broken sequence
//! from one that is merely cut short by the end of the buffer, so callers
//! reading in chunks can hold the tail and retry with more input.

/// Longest encoded character.
pub const MAX_CHAR_LEN: usize = 4;

/// Result of decoding the character at the start of a byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    /// A complete character and its encoded length.
    Char { ch: char, len: usize },
    /// Not a valid sequence; callers treat the lead byte as one unit.
    Invalid,
    /// A valid prefix that needs more bytes.
    Incomplete,
}

fn sequence_len(lead: u8) -> Option<usize> {
    match lead {
        0x00..=0x7f => Some(1),
        0xc2..=0xdf => Some(2),
        0xe0..=0xef => Some(3),
        0xf0..=0xf4 => Some(4),
        _ => None,
    }
}

/// Decode the first character of `bytes`.
pub fn decode(bytes: &[u8]) -> Decoded {
    let Some(&lead) = bytes.first() else {
        return Decoded::Incomplete;
    };
    let Some(len) = sequence_len(lead) else {
        return Decoded::Invalid;
    };
    if bytes.len() < len {
        let continuation = bytes[1..].iter().all(|b| b & 0xc0 == 0x80);
        return if continuation { Decoded::Incomplete } else { Decoded::Invalid };
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => match s.chars().next() {
            Some(ch) => Decoded::Char { ch, len },
            None => Decoded::Invalid,
        },
        Err(_) => Decoded::Invalid,
    }
}

/// Length of the unit at the start of `bytes` within a complete record.
///
/// Invalid and truncated sequences count as a single byte.
pub fn unit_len(bytes: &[u8], multibyte: bool) -> usize {
    match bytes.first() {
        None => 0,
        Some(b) if !multibyte || *b < 0x80 => 1,
        Some(_) => match decode(bytes) {
            Decoded::Char { len, .. } => len,
            Decoded::Invalid | Decoded::Incomplete => 1,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_and_wide() {
        assert_eq!(decode(b"a"), Decoded::Char { ch: 'a', len: 1 });
        assert_eq!(decode("αβ".as_bytes()), Decoded::Char { ch: 'α', len: 2 });
        assert_eq!(decode("€".as_bytes()), Decoded::Char { ch: '€', len: 3 });
        assert_eq!(decode("🦀".as_bytes()), Decoded::Char { ch: '🦀', len: 4 });
    }

    #[test]
    fn truncated_sequence_needs_more() {
        let euro = "€".as_bytes();
        assert_eq!(decode(&euro[..1]), Decoded::Incomplete);
        assert_eq!(decode(&euro[..2]), Decoded::Incomplete);
    }

    #[test]
    fn broken_sequences_are_invalid() {
        assert_eq!(decode(&[0x80]), Decoded::Invalid);
        assert_eq!(decode(&[0xc3, b'a']), Decoded::Invalid);
        assert_eq!(decode(&[0xe2, b'a']), Decoded::Invalid);
        assert_eq!(decode(&[0xff, 0x80]), Decoded::Invalid);
    }

    #[test]
    fn unit_len_in_single_byte_locale() {
        assert_eq!(unit_len("é".as_bytes(), false), 1);
        assert_eq!(unit_len("é".as_bytes(), true), 2);
        assert_eq!(unit_len(&[0xc3], true), 1);
        assert_eq!(unit_len(b"", true), 0);
    }
}
