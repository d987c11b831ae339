// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glyph coverage bitmaps, rendered by swash.

use swash::scale::{Render, ScaleContext, Scaler, Source};
use swash::zeno::{Format, Transform};

use crate::font::FontError;

use super::PADDING;

const SOURCES: &[Source] = &[Source::Outline];

/// 8-bit coverage of one glyph, positioned relative to the pen origin with y down, in
/// oversampled pixels.
#[derive(Clone, Debug, Default)]
pub(super) struct Bitmap {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

impl Bitmap {
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn row(&self, y: u32) -> &[u8] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.data[start..start + w]
    }
}

/// Renders glyphs of one face at one size, refusing any glyph that cannot fit the atlas.
pub(super) struct GlyphRenderer<'a> {
    scaler: Scaler<'a>,
    render: Render<'static>,
    oversampling: (f32, f32),
    atlas_size: u32,
}

impl<'a> GlyphRenderer<'a> {
    pub fn new(
        context: &'a mut ScaleContext,
        font: swash::FontRef<'a>,
        ppem: f32,
        oversampling: (u32, u32),
        atlas_size: u32,
    ) -> Self {
        let oversampling = (oversampling.0 as f32, oversampling.1 as f32);
        let mut render = Render::new(SOURCES);
        render
            .format(Format::Alpha)
            .transform(Some(Transform::scale(oversampling.0, oversampling.1)));
        Self {
            scaler: context.builder(font).size(ppem).hint(false).build(),
            render,
            oversampling,
            atlas_size,
        }
    }

    /// Coverage of `glyph_id`, or an empty bitmap if it has no outline.
    pub fn render(&mut self, glyph_id: u16) -> Result<Bitmap, FontError> {
        if let Some(outline) = self.scaler.scale_outline(glyph_id) {
            let points = outline.points().iter().map(|p| (p.x, p.y));
            if let Some((w, h)) = texel_extent(points, self.oversampling) {
                let limit = self.atlas_size as f32 - PADDING as f32;
                let fits = w.is_finite() && h.is_finite() && w <= limit && h <= limit;
                if !fits {
                    return Err(FontError::AtlasFull {
                        size: self.atlas_size,
                    });
                }
            }
        }
        let Some(image) = self.render.render(&mut self.scaler, glyph_id) else {
            return Ok(Bitmap::default());
        };
        Ok(Bitmap {
            left: image.placement.left,
            // swash measures `top` upwards from the baseline.
            top: -image.placement.top,
            width: image.placement.width,
            height: image.placement.height,
            data: image.data,
        })
    }
}

/// Width and height in whole texels of the box around `points`, once oversampled.
fn texel_extent(
    points: impl Iterator<Item = (f32, f32)>,
    (scale_x, scale_y): (f32, f32),
) -> Option<(f32, f32)> {
    let mut points = points.peekable();
    points.peek()?;
    let (mut x0, mut y0) = (f32::INFINITY, f32::INFINITY);
    let (mut x1, mut y1) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
    for (x, y) in points {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    Some((
        (x1 * scale_x).ceil() - (x0 * scale_x).floor(),
        (y1 * scale_y).ceil() - (y0 * scale_y).floor(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_covers_partial_texels() {
        let square = [(2.0, 0.0), (10.0, 0.0), (10.0, 11.0), (2.0, 11.0)];
        assert_eq!(texel_extent(square.into_iter(), (1.0, 1.0)), Some((8.0, 11.0)));
        assert_eq!(texel_extent(square.into_iter(), (2.0, 3.0)), Some((16.0, 33.0)));
        let offset = [(0.25, -0.5), (1.5, 0.75)];
        assert_eq!(texel_extent(offset.into_iter(), (1.0, 1.0)), Some((2.0, 2.0)));
    }

    #[test]
    fn no_points_no_extent() {
        assert_eq!(texel_extent(std::iter::empty(), (2.0, 2.0)), None);
    }

    #[test]
    fn huge_outlines_overflow_to_infinity() {
        let (w, _) = texel_extent([(-f32::MAX, 0.0), (f32::MAX, 1.0)].into_iter(), (8.0, 1.0))
            .unwrap();
        assert!(!w.is_finite());
    }

    #[test]
    fn rows_slice_the_data() {
        let bitmap = Bitmap {
            width: 3,
            height: 2,
            data: vec![1, 2, 3, 4, 5, 6],
            ..Bitmap::default()
        };
        assert_eq!(bitmap.row(1), [4, 5, 6]);
        assert!(!bitmap.is_empty());
        assert!(Bitmap::default().is_empty());
    }
}
