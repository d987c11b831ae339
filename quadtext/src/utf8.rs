// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lossy, always-progressing UTF-8 decoding.
//!
//! Text reaches this crate as raw bytes with an explicit length. Decoding never fails as a whole:
//! each step yields either a scalar value or an [`InvalidSequence`], and every step consumes at
//! least one byte, so a decoder over `n` bytes is exhausted after at most `n` steps no matter
//! what the bytes are.

/// A malformed sequence that was skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidSequence {
    /// The number of bytes skipped. Always at least one.
    pub len: usize,
}

/// Decodes a byte slice one scalar value at a time.
///
/// Cloning a decoder snapshots its position, so decoding can be restarted from any point.
#[derive(Clone, Debug)]
pub struct Utf8Decoder<'a> {
    bytes: &'a [u8],
}

impl<'a> Utf8Decoder<'a> {
    /// Create a decoder over `bytes`.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// The bytes not decoded yet.
    pub fn remaining(&self) -> &'a [u8] {
        self.bytes
    }

    /// Whether every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode the next scalar value, or `None` once the input is exhausted.
    pub fn decode_next(&mut self) -> Option<Result<char, InvalidSequence>> {
        let (result, len) = decode(self.bytes)?;
        self.bytes = &self.bytes[len..];
        Some(result)
    }
}

impl Iterator for Utf8Decoder<'_> {
    type Item = Result<char, InvalidSequence>;

    fn next(&mut self) -> Option<Self::Item> {
        self.decode_next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.bytes.len().div_ceil(4), Some(self.bytes.len()))
    }
}

/// Decode one sequence from the front of `bytes`, returning it with its length in bytes.
fn decode(bytes: &[u8]) -> Option<(Result<char, InvalidSequence>, usize)> {
    // A malformed sequence only consumes its leading byte, so decoding resynchronizes on the
    // very next byte, which may start a valid sequence.
    const INVALID: (Result<char, InvalidSequence>, usize) = (Err(InvalidSequence { len: 1 }), 1);

    let &lead = bytes.first()?;
    let (len, init, min) = match lead {
        0x00..=0x7f => return Some((Ok(char::from(lead)), 1)),
        0xc0..=0xdf => (2, u32::from(lead & 0x1f), 0x80),
        0xe0..=0xef => (3, u32::from(lead & 0x0f), 0x800),
        0xf0..=0xf7 => (4, u32::from(lead & 0x07), 0x1_0000),
        // Stray continuation byte, or a lead byte no encoding uses.
        _ => return Some(INVALID),
    };
    let Some(tail) = bytes.get(1..len) else {
        return Some(INVALID);
    };
    let mut cp = init;
    for &b in tail {
        if b & 0xc0 != 0x80 {
            return Some(INVALID);
        }
        cp = (cp << 6) | u32::from(b & 0x3f);
    }
    // Overlong encodings, surrogates and values past U+10FFFF.
    match char::from_u32(cp) {
        Some(c) if cp >= min => Some((Ok(c), len)),
        _ => Some(INVALID),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_all(bytes: &[u8]) -> Vec<Result<char, InvalidSequence>> {
        Utf8Decoder::new(bytes).collect()
    }

    #[test]
    fn round_trips_valid_text() {
        let text = "A\u{0}é€𝄞 Zürich 中文 🙂";
        let decoded: Vec<char> = decode_all(text.as_bytes())
            .into_iter()
            .map(Result::unwrap)
            .collect();
        assert_eq!(decoded, text.chars().collect::<Vec<_>>());
    }

    #[test]
    fn consumes_everything() {
        let mut decoder = Utf8Decoder::new("héllo".as_bytes());
        while decoder.decode_next().is_some() {}
        assert!(decoder.is_empty());
        assert!(decoder.remaining().is_empty());
    }

    #[test]
    fn stray_continuation_byte_makes_progress() {
        let mut decoder = Utf8Decoder::new(&[0x80]);
        assert_eq!(
            decoder.decode_next(),
            Some(Err(InvalidSequence { len: 1 }))
        );
        assert!(decoder.is_empty());
        assert_eq!(decoder.decode_next(), None);
    }

    #[test]
    fn garbage_terminates_within_input_length() {
        let bytes = [0x80_u8; 64];
        let mut decoder = Utf8Decoder::new(&bytes);
        let mut steps = 0;
        while decoder.decode_next().is_some() {
            steps += 1;
            assert!(steps <= bytes.len());
        }
        assert_eq!(steps, bytes.len());
    }

    #[test]
    fn truncated_sequence_resynchronizes() {
        // A three byte lead followed by ASCII: the lead is skipped, the ASCII survives.
        assert_eq!(
            decode_all(&[0xe2, b'a', b'b']),
            [Err(InvalidSequence { len: 1 }), Ok('a'), Ok('b')]
        );
        // Truncated at the end of input.
        assert_eq!(
            decode_all(&[b'x', 0xf0, 0x9f]),
            [
                Ok('x'),
                Err(InvalidSequence { len: 1 }),
                Err(InvalidSequence { len: 1 })
            ]
        );
    }

    #[test]
    fn rejects_invalid_lead_bytes() {
        for lead in [0xf8_u8, 0xfc, 0xfe, 0xff] {
            assert_eq!(
                decode_all(&[lead, b'a']),
                [Err(InvalidSequence { len: 1 }), Ok('a')]
            );
        }
    }

    #[test]
    fn rejects_overlong_and_surrogates() {
        // Overlong NUL and overlong '/'.
        assert_eq!(decode_all(&[0xc0, 0x80])[0], Err(InvalidSequence { len: 1 }));
        assert_eq!(decode_all(&[0xe0, 0x80, 0xaf])[0], Err(InvalidSequence { len: 1 }));
        // U+D800.
        assert_eq!(decode_all(&[0xed, 0xa0, 0x80])[0], Err(InvalidSequence { len: 1 }));
        // Past U+10FFFF.
        assert_eq!(
            decode_all(&[0xf4, 0x90, 0x80, 0x80])[0],
            Err(InvalidSequence { len: 1 })
        );
    }

    #[test]
    fn embedded_nul_is_content() {
        assert_eq!(decode_all(b"a\0b"), [Ok('a'), Ok('\0'), Ok('b')]);
    }

    #[test]
    fn clone_restarts_from_snapshot() {
        let mut decoder = Utf8Decoder::new(b"abc");
        decoder.next();
        let snapshot = decoder.clone();
        assert_eq!(decoder.collect::<Vec<_>>(), snapshot.collect::<Vec<_>>());
    }
}
