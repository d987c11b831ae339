// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Single-line measurement.

use crate::font::Font;
use crate::glyph::Glyph;
use crate::utf8::Utf8Decoder;

/// Resolve each decoded codepoint of `text` to a glyph of `font`.
///
/// Yields `None` for invalid sequences and for codepoints the font has no glyph for; callers
/// skip those and forget the previous glyph for kerning purposes.
pub(crate) fn resolve<'f>(
    font: &'f Font,
    text: &'f [u8],
) -> impl Iterator<Item = Option<&'f Glyph>> + 'f {
    Utf8Decoder::new(text).map(move |c| c.ok().and_then(|c| font.find_glyph(u32::from(c))))
}

/// Adds kerning between consecutive glyphs, forgetting the previous glyph on a gap.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct KernContext {
    prev: Option<u32>,
}

impl KernContext {
    /// The adjustment to apply before `glyph`, which then becomes the previous glyph.
    pub(crate) fn advance(&mut self, font: &Font, glyph: &Glyph) -> f32 {
        let kern = match self.prev {
            Some(prev) => font.kerning(prev, glyph.glyph_index),
            None => 0.0,
        };
        self.prev = Some(glyph.glyph_index);
        kern
    }

    pub(crate) fn reset(&mut self) {
        self.prev = None;
    }
}

impl Font {
    /// The visual width of `text` laid out on a single line.
    ///
    /// This is the distance from the left edge of the first glyph's bounding box to the right edge
    /// of the last one's, so side bearings at either end do not count. Invalid sequences and
    /// codepoints without a glyph are skipped. Returns `0.0` if no glyph was found.
    pub fn text_width(&self, text: impl AsRef<[u8]>) -> f32 {
        let mut cursor = 0.0;
        let mut kern = KernContext::default();
        let mut first: Option<&Glyph> = None;
        let mut last: Option<&Glyph> = None;
        for glyph in resolve(self, text.as_ref()) {
            let Some(glyph) = glyph else {
                kern.reset();
                continue;
            };
            cursor += kern.advance(self, glyph) + glyph.advance;
            first.get_or_insert(glyph);
            last = Some(glyph);
        }
        match (first, last) {
            (Some(first), Some(last)) => {
                (cursor - last.advance + last.bearing_x + last.width) - first.bearing_x
            }
            _ => 0.0,
        }
    }
}
