// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-codepoint glyph records and the sorted table they live in.

use crate::storage::{self, StorageBudget, StorageError};

/// Metrics and atlas location of the glyph drawn for one codepoint.
///
/// ```text
///              width
///          |-----------|
///  bearing_x
///  |-------|
///           -----------   -            -
///          |  ggggg  g |  | bearing_y  |
///          | g     g g |  | (negative) |
///  o-------|--ggggg--g-|--o----        | height
///  origin  |  g     g  |               |
///          |   ggggg   |               |
///           -----------                -
///  |----------------------|
///          advance
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Glyph {
    /// The Unicode scalar value this glyph is drawn for.
    pub codepoint: u32,
    /// Index of the glyph in the font file, used for kerning lookups only.
    ///
    /// Index 0 is the font's missing-glyph shape; a table built from a font file contains such
    /// entries for every requested codepoint the font does not cover.
    pub glyph_index: u32,
    /// Horizontal offset from the pen origin to the left edge of the bounding box.
    pub bearing_x: f32,
    /// Vertical offset from the baseline to the top edge of the bounding box (down is positive).
    pub bearing_y: f32,
    /// Width of the bounding box.
    pub width: f32,
    /// Height of the bounding box.
    pub height: f32,
    /// Pen movement after placing this glyph.
    pub advance: f32,
    /// Left edge of the glyph in normalized atlas coordinates.
    pub u0: f32,
    /// Top edge of the glyph in normalized atlas coordinates.
    pub v0: f32,
    /// Right edge of the glyph in normalized atlas coordinates.
    pub u1: f32,
    /// Bottom edge of the glyph in normalized atlas coordinates.
    pub v1: f32,
}

/// Glyphs sorted by codepoint.
///
/// Codepoints are mirrored in a separate dense array: every decoded codepoint of every laid out
/// string is looked up here, and searching plain `u32`s keeps that loop cache friendly.
#[derive(Clone, Debug, Default)]
pub(crate) struct GlyphTable {
    glyphs: Vec<Glyph>,
    codepoints: Vec<u32>,
}

impl GlyphTable {
    /// Build a table from glyphs sorted strictly ascending by codepoint.
    ///
    /// Returns `None` if the glyphs are out of order or a codepoint appears twice.
    #[cfg(test)]
    fn from_sorted(glyphs: Vec<Glyph>) -> Option<Self> {
        let codepoints: Vec<u32> = glyphs.iter().map(|g| g.codepoint).collect();
        is_strictly_sorted_by_key(&codepoints, |&cp| cp).then_some(Self { glyphs, codepoints })
    }

    pub(crate) fn copy_sorted(
        budget: &dyn StorageBudget,
        glyphs: &[Glyph],
    ) -> Result<Option<Self>, StorageError> {
        let mut codepoints = storage::reserve_vec(budget, glyphs.len())?;
        codepoints.extend(glyphs.iter().map(|g| g.codepoint));
        if !is_strictly_sorted_by_key(&codepoints, |&cp| cp) {
            storage::release_vec(budget, &mut codepoints, glyphs.len());
            return Ok(None);
        }
        let glyphs = match storage::reserve_copy(budget, glyphs) {
            Ok(glyphs) => glyphs,
            Err(err) => {
                storage::release_vec(budget, &mut codepoints, glyphs.len());
                return Err(err);
            }
        };
        Ok(Some(Self { glyphs, codepoints }))
    }

    /// Find the glyph for `codepoint`, if the table has one.
    pub(crate) fn find(&self, codepoint: u32) -> Option<&Glyph> {
        let idx = self.codepoints.binary_search(&codepoint).ok()?;
        Some(&self.glyphs[idx])
    }

    /// All glyphs, sorted by codepoint.
    pub(crate) fn as_slice(&self) -> &[Glyph] {
        &self.glyphs
    }

    /// The number of glyphs.
    pub(crate) fn len(&self) -> usize {
        self.glyphs.len()
    }

    pub(crate) fn release(&mut self, budget: &dyn StorageBudget) {
        let len = self.glyphs.len();
        storage::release_vec(budget, &mut self.glyphs, len);
        storage::release_vec(budget, &mut self.codepoints, len);
    }
}

/// Whether `items` are strictly ascending by `key`, i.e. sorted without duplicate keys.
pub(crate) fn is_strictly_sorted_by_key<T, K: Ord>(items: &[T], key: impl Fn(&T) -> K) -> bool {
    items.windows(2).all(|w| key(&w[0]) < key(&w[1]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glyph(codepoint: u32) -> Glyph {
        Glyph {
            codepoint,
            glyph_index: codepoint + 100,
            ..Glyph::default()
        }
    }

    #[test]
    fn finds_every_present_codepoint() {
        let cps = [0x20, 0x41, 0x42, 0x7a, 0xe9, 0x4e2d, 0x1f600];
        let table = GlyphTable::from_sorted(cps.iter().copied().map(glyph).collect()).unwrap();
        for cp in cps {
            assert_eq!(table.find(cp).map(|g| g.codepoint), Some(cp));
        }
    }

    #[test]
    fn reports_absent_codepoints() {
        let table = GlyphTable::from_sorted([0x41, 0x43, 0x45].map(glyph).to_vec()).unwrap();
        for cp in [0, 0x40, 0x42, 0x44, 0x46, u32::MAX] {
            assert!(table.find(cp).is_none(), "U+{cp:04X} should be absent");
        }
    }

    #[test]
    fn empty_table_finds_nothing() {
        let table = GlyphTable::default();
        assert!(table.find(0x41).is_none());
        assert!(table.as_slice().is_empty());
    }

    #[test]
    fn rejects_unsorted_and_duplicates() {
        assert!(GlyphTable::from_sorted([0x42, 0x41].map(glyph).to_vec()).is_none());
        assert!(GlyphTable::from_sorted([0x41, 0x41].map(glyph).to_vec()).is_none());
    }
}
