// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fonts: an atlas, vertical metrics, and sorted glyph and kerning tables.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::storage::{self, StorageBudget, StorageError, Unlimited};
use crate::glyph::{Glyph, GlyphTable};
use crate::kerning::{KerningPair, KerningTable};

/// Vertical metrics of a font, in pixels. Down is positive, like everything else here, except
/// that `ascent` and `descent` keep the font file's convention: ascent above the baseline is
/// positive and descent below it is negative.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Maximum extent of glyphs above the baseline.
    pub ascent: f32,
    /// Maximum extent of glyphs below the baseline (usually negative).
    pub descent: f32,
    /// Spacing between one line's descent and the next line's ascent.
    pub line_gap: f32,
    /// Distance between the baselines of consecutive lines: `ascent - descent + line_gap`.
    pub line_height: f32,
}

impl FontMetrics {
    /// Metrics with `line_height` derived from the other three values.
    pub fn new(ascent: f32, descent: f32, line_gap: f32) -> Self {
        Self {
            ascent,
            descent,
            line_gap,
            line_height: ascent - descent + line_gap,
        }
    }
}

/// A glyph atlas image, rows top to bottom, channels interleaved.
#[derive(Clone, PartialEq, Eq)]
pub struct Atlas {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u32,
}

impl Atlas {
    /// The pixel data, `width * height * channels` bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Bytes per pixel.
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// The value of channel 0 at `(x, y)`, or `None` outside the image.
    pub fn coverage(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * self.channels as usize;
        self.data.get(idx).copied()
    }
}

impl fmt::Debug for Atlas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Atlas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// Pre-baked font data, for fonts that were rasterized offline or come from a bitmap format.
#[derive(Clone, Copy, Debug)]
pub struct FontParts<'a> {
    /// Atlas pixels, `atlas_width * atlas_height * atlas_channels` bytes, if any.
    pub atlas_data: Option<&'a [u8]>,
    /// Atlas width in pixels.
    pub atlas_width: u32,
    /// Atlas height in pixels.
    pub atlas_height: u32,
    /// Bytes per atlas pixel. Zero means one.
    pub atlas_channels: u32,
    /// Vertical metrics.
    pub metrics: FontMetrics,
    /// Glyphs sorted strictly ascending by codepoint.
    pub glyphs: &'a [Glyph],
    /// Kerning pairs sorted strictly ascending by `(first_glyph, second_glyph)`.
    pub kerning_pairs: &'a [KerningPair],
}

impl Default for FontParts<'_> {
    fn default() -> Self {
        Self {
            atlas_data: None,
            atlas_width: 0,
            atlas_height: 0,
            atlas_channels: 1,
            metrics: FontMetrics::default(),
            glyphs: &[],
            kerning_pairs: &[],
        }
    }
}

/// Errors that can occur while constructing a [`Font`].
#[derive(Debug, Error)]
pub enum FontError {
    /// The font file could not be read.
    #[error("could not read font file: {0}")]
    Io(#[from] std::io::Error),
    /// The data contains no fonts.
    #[error("no fonts in file")]
    NoFonts,
    /// The requested face does not exist in the collection.
    #[error("font index {index} out of range, file has {count} fonts")]
    FontIndexOutOfRange {
        /// The requested index.
        index: u32,
        /// The number of fonts in the file.
        count: u32,
    },
    /// The font data could not be parsed.
    #[error("could not load font: {0}")]
    Parse(String),
    /// Construction parameters are unusable.
    #[error("invalid parameters: {0}")]
    InvalidParams(&'static str),
    /// The requested glyphs do not fit into the atlas.
    #[error("failed to pack character bitmaps into a {size}x{size} atlas")]
    AtlasFull {
        /// The atlas side length in pixels.
        size: u32,
    },
    /// Pre-baked atlas data does not match its declared size.
    #[error("atlas data is {actual} bytes, expected {expected}")]
    AtlasSize {
        /// `width * height * channels`.
        expected: usize,
        /// The length of the supplied data.
        actual: usize,
    },
    /// Pre-baked glyphs are not sorted by codepoint, or contain duplicates.
    #[error("glyphs must be sorted by codepoint without duplicates")]
    UnsortedGlyphs,
    /// Pre-baked kerning pairs are not sorted, or contain duplicates.
    #[error("kerning pairs must be sorted by first, then second glyph without duplicates")]
    UnsortedKerning,
    /// The storage budget refused a buffer, or memory ran out.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// A font ready for layout: immutable, and safe to share between threads.
///
/// All storage is charged to the font's [`StorageBudget`] and handed back to it on drop.
pub struct Font {
    budget: Arc<dyn StorageBudget>,
    atlas: Option<Atlas>,
    metrics: FontMetrics,
    glyphs: GlyphTable,
    kerning: KerningTable,
}

impl Font {
    /// Create a font from pre-baked parts, copying them.
    pub fn from_parts(parts: FontParts<'_>) -> Result<Self, FontError> {
        Self::from_parts_with_budget(parts, Arc::new(Unlimited))
    }

    /// Create a font from pre-baked parts, copying them into storage charged to
    /// `budget`.
    pub fn from_parts_with_budget(
        parts: FontParts<'_>,
        budget: Arc<dyn StorageBudget>,
    ) -> Result<Self, FontError> {
        let atlas = match parts.atlas_data {
            Some(data) => {
                let channels = parts.atlas_channels.max(1);
                let expected =
                    parts.atlas_width as usize * parts.atlas_height as usize * channels as usize;
                if data.len() != expected {
                    return Err(FontError::AtlasSize {
                        expected,
                        actual: data.len(),
                    });
                }
                Some((data, parts.atlas_width, parts.atlas_height, channels))
            }
            None => None,
        };

        // Storage taken before a later step fails is handed back by `Drop`.
        let mut font = Self {
            budget,
            atlas: None,
            metrics: parts.metrics,
            glyphs: GlyphTable::default(),
            kerning: KerningTable::default(),
        };
        font.glyphs = GlyphTable::copy_sorted(&*font.budget, parts.glyphs)?
            .ok_or(FontError::UnsortedGlyphs)?;
        font.kerning = KerningTable::copy_sorted(&*font.budget, parts.kerning_pairs)?
            .ok_or(FontError::UnsortedKerning)?;
        if let Some((data, width, height, channels)) = atlas {
            font.atlas = Some(Atlas {
                data: storage::reserve_copy(&*font.budget, data)?,
                width,
                height,
                channels,
            });
        }
        Ok(font)
    }

    /// The glyph atlas, if the font has one.
    pub fn atlas(&self) -> Option<&Atlas> {
        self.atlas.as_ref()
    }

    /// Vertical metrics.
    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// All glyphs, sorted by codepoint.
    pub fn glyphs(&self) -> &[Glyph] {
        self.glyphs.as_slice()
    }

    /// All kerning pairs, sorted by `(first_glyph, second_glyph)`.
    pub fn kerning_pairs(&self) -> &[KerningPair] {
        self.kerning.as_slice()
    }

    /// The glyph drawn for `codepoint`, if the font has one.
    pub fn find_glyph(&self, codepoint: u32) -> Option<&Glyph> {
        self.glyphs.find(codepoint)
    }

    /// The kerning between two font glyph indices, or `0.0` if the pair has none.
    pub fn kerning(&self, first_glyph: u32, second_glyph: u32) -> f32 {
        self.kerning.get(first_glyph, second_glyph)
    }
}

static_assertions::assert_impl_all!(Font: Send, Sync);

impl Drop for Font {
    fn drop(&mut self) {
        let budget = &*self.budget;
        if let Some(atlas) = &mut self.atlas {
            let len = atlas.data.len();
            storage::release_vec(budget, &mut atlas.data, len);
        }
        self.glyphs.release(budget);
        self.kerning.release(budget);
    }
}

impl fmt::Debug for Font {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Font")
            .field("atlas", &self.atlas)
            .field("metrics", &self.metrics)
            .field("glyphs", &self.glyphs.len())
            .field("kerning_pairs", &self.kerning.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Tally {
        live: AtomicUsize,
        calls: AtomicUsize,
    }

    impl StorageBudget for Tally {
        fn resize(&self, old_size: usize, new_size: usize) -> Result<(), StorageError> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            self.live.fetch_add(new_size, Ordering::Relaxed);
            self.live.fetch_sub(old_size, Ordering::Relaxed);
            Ok(())
        }
    }

    fn glyph(codepoint: u32) -> Glyph {
        Glyph {
            codepoint,
            glyph_index: codepoint,
            advance: 10.0,
            ..Glyph::default()
        }
    }

    #[test]
    fn metrics_line_height() {
        let m = FontMetrics::new(18.0, -5.0, 2.0);
        assert_eq!(m.line_height, 25.0);
    }

    #[test]
    fn copies_parts() {
        let glyphs = [glyph(0x41), glyph(0x42)];
        let pairs = [KerningPair {
            first_glyph: 0x41,
            second_glyph: 0x42,
            amount: -1.0,
        }];
        let atlas = [0_u8, 64, 128, 255];
        let font = Font::from_parts(FontParts {
            atlas_data: Some(&atlas),
            atlas_width: 2,
            atlas_height: 2,
            atlas_channels: 0,
            metrics: FontMetrics::new(10.0, -2.0, 0.0),
            glyphs: &glyphs,
            kerning_pairs: &pairs,
        })
        .unwrap();
        assert_eq!(font.glyphs(), &glyphs);
        assert_eq!(font.kerning_pairs(), &pairs);
        assert_eq!(font.kerning(0x41, 0x42), -1.0);
        assert_eq!(font.find_glyph(0x42).map(|g| g.codepoint), Some(0x42));
        let atlas = font.atlas().unwrap();
        assert_eq!(atlas.channels(), 1);
        assert_eq!(atlas.coverage(1, 1), Some(255));
        assert_eq!(atlas.coverage(2, 0), None);
    }

    #[test]
    fn rejects_unsorted_parts() {
        let glyphs = [glyph(0x42), glyph(0x41)];
        let err = Font::from_parts(FontParts {
            glyphs: &glyphs,
            ..FontParts::default()
        })
        .unwrap_err();
        assert!(matches!(err, FontError::UnsortedGlyphs));

        let pairs = [
            KerningPair {
                first_glyph: 2,
                second_glyph: 0,
                amount: 1.0,
            },
            KerningPair {
                first_glyph: 1,
                second_glyph: 0,
                amount: 1.0,
            },
        ];
        let err = Font::from_parts(FontParts {
            kerning_pairs: &pairs,
            ..FontParts::default()
        })
        .unwrap_err();
        assert!(matches!(err, FontError::UnsortedKerning));
    }

    #[test]
    fn rejects_short_atlas() {
        let err = Font::from_parts(FontParts {
            atlas_data: Some(&[0; 3]),
            atlas_width: 2,
            atlas_height: 2,
            ..FontParts::default()
        })
        .unwrap_err();
        assert!(matches!(
            err,
            FontError::AtlasSize {
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn drop_returns_all_storage() {
        let tally = Arc::new(Tally::default());
        let glyphs = [glyph(0x41), glyph(0x42), glyph(0x43)];
        let font = Font::from_parts_with_budget(
            FontParts {
                atlas_data: Some(&[1; 16]),
                atlas_width: 4,
                atlas_height: 4,
                glyphs: &glyphs,
                ..FontParts::default()
            },
            tally.clone(),
        )
        .unwrap();
        assert!(tally.live.load(Ordering::Relaxed) > 0);
        drop(font);
        assert_eq!(tally.live.load(Ordering::Relaxed), 0);
        // Glyphs, codepoints, and atlas: one reservation and one release each.
        assert_eq!(tally.calls.load(Ordering::Relaxed), 6);
    }
}
