// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Building fonts from TrueType and OpenType data.
//!
//! Every requested codepoint is rasterized into a single-channel atlas at the requested pixel
//! size. Codepoints the font does not cover are given the font's missing-glyph shape, glyph
//! index 0, so the glyph table always holds exactly one entry per requested codepoint.

mod kern;
mod raster;

use std::ops::RangeInclusive;
use std::path::Path;
use std::sync::Arc;

use guillotiere::{size2, AtlasAllocator};
use skrifa::instance::{LocationRef, Size};
use skrifa::raw::types::Tag;
use skrifa::raw::FileRef;
use skrifa::{FontRef, GlyphId, MetadataProvider};
use swash::scale::ScaleContext;

use crate::font::{Font, FontError, FontMetrics, FontParts};
use crate::glyph::{is_strictly_sorted_by_key, Glyph};
use crate::kerning::KerningPair;
use crate::storage::{StorageBudget, Unlimited};

use raster::{Bitmap, GlyphRenderer};

/// The largest supported atlas side length.
pub const MAX_ATLAS_SIZE: u32 = 1 << 15;

/// The largest supported oversampling factor.
pub const MAX_OVERSAMPLING: u32 = 8;

/// Pixels left empty to the right of and below every glyph in the atlas, so that bilinear
/// filtering never picks up a neighbor.
const PADDING: i32 = 1;

/// Parameters for building a font from TrueType or OpenType data.
#[derive(Clone, Debug, PartialEq)]
pub struct TtfParams {
    /// The pixel distance between ascent and descent.
    pub size: f32,
    /// Side length of the square atlas. Must be a power of two.
    pub atlas_size: u32,
    /// The face to load from a font collection. Zero for plain font files.
    pub font_index: u32,
    /// Horizontal oversampling factor. Glyphs are rasterized this many times wider, which
    /// improves quality when the quads are drawn at fractional positions.
    pub oversampling_h: u32,
    /// Vertical oversampling factor.
    pub oversampling_v: u32,
    /// The codepoints to rasterize: sorted, disjoint inclusive ranges.
    pub ranges: Vec<RangeInclusive<u32>>,
}

impl Default for TtfParams {
    fn default() -> Self {
        Self {
            size: 24.0,
            atlas_size: 256,
            font_index: 0,
            oversampling_h: 2,
            oversampling_v: 2,
            ranges: Self::default_ranges(),
        }
    }
}

impl TtfParams {
    /// Parameters for `size` pixel text in a `atlas_size` square atlas, with default
    /// oversampling and codepoint ranges.
    pub fn new(size: f32, atlas_size: u32) -> Self {
        Self {
            size,
            atlas_size,
            ..Self::default()
        }
    }

    /// Basic Latin and the Latin-1 Supplement.
    pub fn default_ranges() -> Vec<RangeInclusive<u32>> {
        vec![0x20..=0x7f, 0xa0..=0xff]
    }

    /// Check that these parameters can be used to build a font.
    pub fn validate(&self) -> Result<(), FontError> {
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(FontError::InvalidParams("size must be positive"));
        }
        if !self.atlas_size.is_power_of_two() {
            return Err(FontError::InvalidParams("atlas size must be a power of two"));
        }
        if self.atlas_size > MAX_ATLAS_SIZE {
            return Err(FontError::InvalidParams("atlas size is too large"));
        }
        let oversampling = 1..=MAX_OVERSAMPLING;
        if !oversampling.contains(&self.oversampling_h)
            || !oversampling.contains(&self.oversampling_v)
        {
            return Err(FontError::InvalidParams(
                "oversampling must be between 1 and 8",
            ));
        }
        if self.ranges.is_empty() {
            return Err(FontError::InvalidParams("no codepoint ranges"));
        }
        if self
            .ranges
            .iter()
            .any(|r| r.start() > r.end() || *r.end() > u32::from(char::MAX))
        {
            return Err(FontError::InvalidParams(
                "codepoint ranges must be non-empty and within U+10FFFF",
            ));
        }
        if !self.ranges.windows(2).all(|w| w[0].end() < w[1].start()) {
            return Err(FontError::InvalidParams(
                "codepoint ranges must be sorted and must not overlap",
            ));
        }
        Ok(())
    }

    fn codepoints(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|r| r.clone())
    }
}

/// A rasterized glyph waiting for its place in the atlas.
struct Rasterized {
    codepoint: u32,
    glyph_id: GlyphId,
    advance: f32,
    bitmap: Bitmap,
}

impl Font {
    /// Build a font from TrueType or OpenType data.
    pub fn from_ttf(data: &[u8], params: &TtfParams) -> Result<Self, FontError> {
        Self::from_ttf_with_budget(data, params, Arc::new(Unlimited))
    }

    /// Build a font from TrueType or OpenType data, with storage charged to `budget`.
    pub fn from_ttf_with_budget(
        data: &[u8],
        params: &TtfParams,
        budget: Arc<dyn StorageBudget>,
    ) -> Result<Self, FontError> {
        params.validate()?;
        let face = font_ref(data, params.font_index)?;

        let unscaled = face.metrics(Size::unscaled(), LocationRef::default());
        let extent = unscaled.ascent - unscaled.descent;
        if extent.is_nan() || extent <= 0.0 {
            return Err(FontError::Parse("font has no vertical extent".into()));
        }
        let scale = params.size / extent;
        let ppem = scale * f32::from(unscaled.units_per_em);
        let metrics = FontMetrics {
            ascent: (scale * unscaled.ascent).round(),
            descent: (scale * unscaled.descent).round(),
            line_gap: (scale * unscaled.leading).round(),
            line_height: (scale * (extent + unscaled.leading)).round(),
        };

        let rasterized = rasterize_all(data, &face, params, ppem)?;
        let (atlas, glyphs) = pack(&rasterized, params)?;
        let kerning_pairs = kerning_pairs(&face, scale);

        let size = params.atlas_size;
        let font = Self::from_parts_with_budget(
            FontParts {
                atlas_data: Some(&atlas),
                atlas_width: size,
                atlas_height: size,
                atlas_channels: 1,
                metrics,
                glyphs: &glyphs,
                kerning_pairs: &kerning_pairs,
            },
            budget,
        )?;
        log::debug!(
            "loaded font: {} glyphs, {} kerning pairs, {size}x{size} atlas",
            glyphs.len(),
            kerning_pairs.len(),
        );
        Ok(font)
    }

    /// Read a TrueType or OpenType file and build a font from it.
    pub fn load_ttf(path: impl AsRef<Path>, params: &TtfParams) -> Result<Self, FontError> {
        Self::load_ttf_with_budget(path, params, Arc::new(Unlimited))
    }

    /// Read a TrueType or OpenType file and build a font from it, with storage charged to
    /// `budget`.
    pub fn load_ttf_with_budget(
        path: impl AsRef<Path>,
        params: &TtfParams,
        budget: Arc<dyn StorageBudget>,
    ) -> Result<Self, FontError> {
        let data = std::fs::read(path)?;
        Self::from_ttf_with_budget(&data, params, budget)
    }
}

/// The face at `index` of a font file or collection.
fn font_ref(data: &[u8], index: u32) -> Result<FontRef<'_>, FontError> {
    let file = FileRef::new(data).map_err(|_| FontError::NoFonts)?;
    match file {
        FileRef::Font(font) if index == 0 => Ok(font),
        FileRef::Font(_) => Err(FontError::FontIndexOutOfRange { index, count: 1 }),
        FileRef::Collection(collection) => {
            let count = collection.len();
            if count == 0 {
                return Err(FontError::NoFonts);
            }
            if index >= count {
                return Err(FontError::FontIndexOutOfRange { index, count });
            }
            collection
                .get(index)
                .map_err(|err| FontError::Parse(err.to_string()))
        }
    }
}

/// Render every requested codepoint, failing before any bitmap is built for a glyph too large
/// for the atlas.
fn rasterize_all(
    data: &[u8],
    face: &FontRef<'_>,
    params: &TtfParams,
    ppem: f32,
) -> Result<Vec<Rasterized>, FontError> {
    let scale_font = swash::FontRef::from_index(data, params.font_index as usize)
        .ok_or_else(|| FontError::Parse("face cannot be scaled".into()))?;
    let charmap = face.charmap();
    let glyph_metrics = face.glyph_metrics(Size::new(ppem), LocationRef::default());
    let mut context = ScaleContext::new();
    let mut renderer = GlyphRenderer::new(
        &mut context,
        scale_font,
        ppem,
        (params.oversampling_h, params.oversampling_v),
        params.atlas_size,
    );

    params
        .codepoints()
        .map(|codepoint| {
            let glyph_id = charmap.map(codepoint).unwrap_or(GlyphId::NOTDEF);
            let bitmap = match u16::try_from(glyph_id.to_u32()) {
                Ok(id) => renderer.render(id)?,
                Err(_) => {
                    log::warn!(
                        "glyph {} for U+{codepoint:04X} is out of range",
                        glyph_id.to_u32()
                    );
                    Bitmap::default()
                }
            };
            Ok(Rasterized {
                codepoint,
                glyph_id,
                advance: glyph_metrics.advance_width(glyph_id).unwrap_or_default(),
                bitmap,
            })
        })
        .collect()
}

/// Place every bitmap in a new atlas and describe the glyphs in their final positions.
fn pack(
    rasterized: &[Rasterized],
    params: &TtfParams,
) -> Result<(Vec<u8>, Vec<Glyph>), FontError> {
    let size = params.atlas_size;
    let side = size as usize;
    let mut packer = AtlasAllocator::new(size2(size as i32, size as i32));
    let mut atlas = vec![0_u8; side * side];
    let mut glyphs = Vec::with_capacity(rasterized.len());
    let (over_h, over_v) = (params.oversampling_h as f32, params.oversampling_v as f32);
    let atlas_f = size as f32;

    for r in rasterized {
        let bitmap = &r.bitmap;
        let mut glyph = Glyph {
            codepoint: r.codepoint,
            glyph_index: r.glyph_id.to_u32(),
            advance: r.advance,
            ..Glyph::default()
        };
        if !bitmap.is_empty() {
            let (w, h) = (bitmap.width as i32, bitmap.height as i32);
            let allocation = packer
                .allocate(size2(w + PADDING, h + PADDING))
                .ok_or(FontError::AtlasFull { size })?;
            let (x, y) = (
                allocation.rectangle.min.x as usize,
                allocation.rectangle.min.y as usize,
            );
            for row in 0..bitmap.height {
                let start = (y + row as usize) * side + x;
                atlas[start..start + bitmap.width as usize].copy_from_slice(bitmap.row(row));
            }
            glyph.bearing_x = bitmap.left as f32 / over_h;
            glyph.bearing_y = bitmap.top as f32 / over_v;
            glyph.width = bitmap.width as f32 / over_h;
            glyph.height = bitmap.height as f32 / over_v;
            glyph.u0 = x as f32 / atlas_f;
            glyph.v0 = y as f32 / atlas_f;
            glyph.u1 = (x + bitmap.width as usize) as f32 / atlas_f;
            glyph.v1 = (y + bitmap.height as usize) as f32 / atlas_f;
        }
        glyphs.push(glyph);
    }
    Ok((atlas, glyphs))
}

/// Kerning pairs from the `kern` table, scaled to pixels.
fn kerning_pairs(face: &FontRef<'_>, scale: f32) -> Vec<KerningPair> {
    let Some(table) = face.table_data(Tag::new(b"kern")) else {
        return Vec::new();
    };
    let mut pairs: Vec<KerningPair> = kern::parse(table.as_bytes())
        .into_iter()
        .map(|entry| KerningPair {
            first_glyph: u32::from(entry.left),
            second_glyph: u32::from(entry.right),
            amount: scale * f32::from(entry.value),
        })
        .collect();
    if !is_strictly_sorted_by_key(&pairs, KerningPair::key) {
        log::warn!("kern table is not sorted, sorting {} pairs", pairs.len());
        pairs.sort_by_key(KerningPair::key);
        pairs.dedup_by_key(|pair| pair.key());
    }
    pairs
}
