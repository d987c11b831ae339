// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quads, and drawing a single line of text into them.

use bytemuck::{Pod, Zeroable};

use crate::font::Font;
use crate::glyph::Glyph;
use crate::metrics::{resolve, KernContext};

/// A textured rectangle: a screen-space box and the atlas region drawn into it.
///
/// The layout is fixed so slices of quads can be uploaded as vertex or instance data with
/// [`bytemuck::cast_slice`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Quad {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub w: f32,
    /// Height.
    pub h: f32,
    /// Left edge in normalized atlas coordinates.
    pub u0: f32,
    /// Top edge in normalized atlas coordinates.
    pub v0: f32,
    /// Right edge in normalized atlas coordinates.
    pub u1: f32,
    /// Bottom edge in normalized atlas coordinates.
    pub v1: f32,
}

static_assertions::const_assert_eq!(std::mem::size_of::<Quad>(), 32);

impl Quad {
    /// The quad for `glyph` with its box's top left corner at `(x, y)`.
    pub(crate) fn for_glyph(glyph: &Glyph, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            w: glyph.width,
            h: glyph.height,
            u0: glyph.u0,
            v0: glyph.v0,
            u1: glyph.u1,
            v1: glyph.v1,
        }
    }
}

impl Font {
    /// Draw `text` as a single line with the pen starting at `(x, y)`, `y` being the baseline.
    ///
    /// With `quads` set, writes one quad per glyph until the slice is full. Either way, returns
    /// the number of quads the whole text needs, so a result larger than the slice means the
    /// output was truncated. Passing `None` only counts.
    ///
    /// No wrapping happens here and `\n` is an ordinary codepoint; use a [`Layout`] for
    /// anything more than one line.
    ///
    /// [`Layout`]: crate::Layout
    pub fn draw_text(
        &self,
        text: impl AsRef<[u8]>,
        x: f32,
        y: f32,
        mut quads: Option<&mut [Quad]>,
    ) -> usize {
        let mut count = 0;
        let mut cursor = x;
        let mut kern = KernContext::default();
        for glyph in resolve(self, text.as_ref()) {
            let Some(glyph) = glyph else {
                kern.reset();
                continue;
            };
            cursor += kern.advance(self, glyph);
            if let Some(slot) = quads.as_deref_mut().and_then(|q| q.get_mut(count)) {
                *slot = Quad::for_glyph(glyph, cursor + glyph.bearing_x, y + glyph.bearing_y);
            }
            cursor += glyph.advance;
            count += 1;
        }
        count
    }
}
