// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pair kerning from the legacy `kern` table.
//!
//! Only the Microsoft table layout is read, and only its first horizontal format 0 subtable:
//! a flat list of glyph pairs, sorted by left then right glyph. Everything else (Apple's layout,
//! class-based and cross-stream subtables, the GPOS table) yields no kerning.

/// One pair as stored in the font, in font units.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct KernEntry {
    pub(crate) left: u16,
    pub(crate) right: u16,
    pub(crate) value: i16,
}

/// Subtable coverage of a horizontal, format 0 subtable with no special flags.
const HORIZONTAL_FORMAT_0: u16 = 0x0001;
/// Subtable header plus the format 0 header.
const PAIRS_OFFSET: usize = 6 + 8;

/// Read the kerning pairs of the table `data`. Truncated data gives the pairs that are complete.
pub(crate) fn parse(data: &[u8]) -> Vec<KernEntry> {
    let (Some(0), Some(num_tables)) = (read_u16(data, 0), read_u16(data, 2)) else {
        return Vec::new();
    };
    let mut offset = 4;
    for _ in 0..num_tables {
        let length = read_u16(data, offset + 2);
        let coverage = read_u16(data, offset + 4);
        let (Some(length), Some(coverage)) = (length, coverage) else {
            break;
        };
        if coverage == HORIZONTAL_FORMAT_0 {
            let Some(num_pairs) = read_u16(data, offset + 6) else {
                break;
            };
            let pairs = data.get(offset + PAIRS_OFFSET..).unwrap_or_default();
            return pairs
                .chunks_exact(6)
                .take(usize::from(num_pairs))
                .map(|pair| KernEntry {
                    left: u16::from_be_bytes([pair[0], pair[1]]),
                    right: u16::from_be_bytes([pair[2], pair[3]]),
                    value: i16::from_be_bytes([pair[4], pair[5]]),
                })
                .collect();
        }
        if length == 0 {
            break;
        }
        offset += usize::from(length);
    }
    Vec::new()
}

fn read_u16(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
