// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Fonts built from TrueType data.
//!
//! At 16 pixels, one pixel of [`tiny_ttf`] is 64 font units, so the square glyphs land on pixel
//! boundaries. Metrics are exact; rendered boxes are allowed one texel of slack.

#![allow(missing_docs, clippy::missing_assert_message, clippy::float_cmp)]

use std::sync::Arc;

use quadtext::{Align, Font, FontError, Layout, Style, TtfParams};
use quadtext_tests::{tiny_ttf, CountingBudget};

fn tiny(params: &TtfParams) -> Result<Font, FontError> {
    Font::from_ttf(&tiny_ttf(), params)
}

fn params() -> TtfParams {
    TtfParams::new(16.0, 64)
}

#[test]
fn metrics_are_scaled_to_the_size() {
    let font = tiny(&params()).unwrap();
    let metrics = font.metrics();
    assert_eq!(metrics.ascent, 12.0);
    assert_eq!(metrics.descent, -4.0);
    assert_eq!(metrics.line_gap, 0.0);
    assert_eq!(metrics.line_height, 16.0);
}

#[test]
fn every_requested_codepoint_gets_a_glyph() {
    let font = tiny(&params()).unwrap();
    assert_eq!(font.glyphs().len(), 192);
    assert!(font.find_glyph(0x7f).is_some());
    assert!(font.find_glyph(0x80).is_none());

    // Uncovered codepoints use the empty missing glyph.
    for c in [' ', 'a', 'é'] {
        let glyph = font.find_glyph(u32::from(c)).unwrap();
        assert_eq!(glyph.glyph_index, 0, "{c}");
        assert_eq!(glyph.advance, 8.0, "{c}");
        assert_eq!((glyph.width, glyph.height), (0.0, 0.0), "{c}");
    }
}

/// Whether `actual` is within one texel of `expected`.
fn within_texel(actual: f32, expected: f32, oversampling: u32) -> bool {
    (actual - expected).abs() <= 1.0 / oversampling as f32
}

#[test]
fn glyph_boxes_are_in_pixels() {
    for oversampling in [1, 2, 3] {
        let font = tiny(&TtfParams {
            oversampling_h: oversampling,
            oversampling_v: oversampling,
            ..params()
        })
        .unwrap();
        for (c, index) in [('A', 1), ('B', 2)] {
            let glyph = font.find_glyph(u32::from(c)).unwrap();
            let at = format!("{c} at {oversampling}x");
            assert_eq!(glyph.glyph_index, index);
            assert_eq!(glyph.advance, 12.0);
            // The square spans (2, -11) to (10, 0) in pixels, y down.
            assert!(within_texel(glyph.bearing_x, 2.0, oversampling), "{at}");
            assert!(within_texel(glyph.bearing_y, -11.0, oversampling), "{at}");
            assert!(glyph.width >= 8.0, "{at}");
            assert!(within_texel(glyph.width, 8.0, oversampling), "{at}");
            assert!(glyph.height >= 11.0, "{at}");
            assert!(within_texel(glyph.height, 11.0, oversampling), "{at}");
            let texels = glyph.width * oversampling as f32 / 64.0;
            assert!((glyph.u1 - glyph.u0 - texels).abs() < 1e-6, "{at}");
        }
    }
}

#[test]
fn atlas_holds_padded_coverage() {
    let font = tiny(&params()).unwrap();
    let atlas = font.atlas().unwrap();
    assert_eq!((atlas.width(), atlas.height(), atlas.channels()), (64, 64, 1));

    for c in ['A', 'B'] {
        let glyph = font.find_glyph(u32::from(c)).unwrap();
        let (x, y) = ((glyph.u0 * 64.0).round() as u32, (glyph.v0 * 64.0).round() as u32);
        let (w, h) = (
            ((glyph.u1 - glyph.u0) * 64.0).round() as u32,
            ((glyph.v1 - glyph.v0) * 64.0).round() as u32,
        );
        // 2x oversampling: at least 16 by 22 texels, solid in the middle.
        assert!(w >= 16 && h >= 22, "{c}: {w}x{h}");
        assert_eq!(atlas.coverage(x + w / 2, y + h / 2), Some(255));
        // Padding right of and below the glyph stays empty.
        assert_eq!(atlas.coverage(x + w, y + h / 2), Some(0));
        assert_eq!(atlas.coverage(x + w / 2, y + h), Some(0));
    }
}

#[test]
fn kerning_comes_from_the_kern_table() {
    let font = tiny(&params()).unwrap();
    assert_eq!(font.kerning_pairs().len(), 1);
    assert_eq!(font.kerning(1, 2), -2.0);
    assert_eq!(font.kerning(2, 1), 0.0);
    // 12 - 2 + 2 + 8, less the leading bearing.
    assert!((font.text_width("AB") - 18.0).abs() <= 1.0);
}

#[test]
fn fonts_feed_layout() {
    let font = tiny(&params()).unwrap();
    let style = Style::new(&font, ());
    let mut layout = Layout::new(16);
    layout.reset(30.0, Align::Left);
    layout.add_text(&style, "AB AB");
    layout.compute();

    let pos: Vec<(f32, f32)> = layout.glyphs().iter().map(|g| (g.x, g.y)).collect();
    assert_eq!(pos.len(), 4);
    // Kerned by -2 within a word, then one 16 pixel line down.
    assert_eq!(pos[1].0 - pos[0].0, 10.0);
    assert_eq!(pos[1].1, pos[0].1);
    assert_eq!(pos[2], (pos[0].0, pos[0].1 + 16.0));
    assert_eq!(pos[3], (pos[1].0, pos[1].1 + 16.0));
}

#[test]
fn ranges_select_the_glyphs() {
    let font = tiny(&TtfParams {
        ranges: vec![0x41..=0x42],
        ..params()
    })
    .unwrap();
    let codepoints: Vec<u32> = font.glyphs().iter().map(|g| g.codepoint).collect();
    assert_eq!(codepoints, [0x41, 0x42]);
}

#[test]
fn small_atlas_is_full() {
    let err = tiny(&TtfParams::new(16.0, 16)).unwrap_err();
    assert!(matches!(err, FontError::AtlasFull { size: 16 }));
}

#[test]
fn oversized_glyphs_fail_before_rendering() {
    // Glyphs this large would need gigabytes of coverage; the loader must refuse them first.
    let params = TtfParams::new(200_000.0, 256);
    params.validate().unwrap();
    let err = tiny(&params).unwrap_err();
    assert!(matches!(err, FontError::AtlasFull { size: 256 }));

    let err = tiny(&TtfParams {
        oversampling_h: 8,
        ..TtfParams::new(16.0, 64)
    })
    .unwrap_err();
    assert!(matches!(err, FontError::AtlasFull { size: 64 }));
}

#[test]
fn plain_fonts_have_one_face() {
    let err = tiny(&TtfParams {
        font_index: 1,
        ..params()
    })
    .unwrap_err();
    assert!(matches!(
        err,
        FontError::FontIndexOutOfRange { index: 1, count: 1 }
    ));
}

#[test]
fn garbage_is_not_a_font() {
    let err = Font::from_ttf(b"definitely not a font", &params()).unwrap_err();
    assert!(matches!(err, FontError::NoFonts));
}

#[test]
fn parameters_are_checked_first() {
    let err = tiny(&TtfParams {
        size: -1.0,
        ..params()
    })
    .unwrap_err();
    assert!(matches!(err, FontError::InvalidParams(_)));
    let err = tiny(&TtfParams::new(16.0, 100)).unwrap_err();
    assert!(matches!(err, FontError::InvalidParams(_)));
}

#[test]
fn load_from_file() {
    let path = std::env::temp_dir().join(format!("quadtext-tiny-{}.ttf", std::process::id()));
    std::fs::write(&path, tiny_ttf()).unwrap();
    let loaded = Font::load_ttf(&path, &params());
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded.unwrap().glyphs().len(), 192);

    let err = Font::load_ttf(&path, &params()).unwrap_err();
    assert!(matches!(err, FontError::Io(_)));
}

#[test]
fn storage_is_charged_to_the_budget() {
    let counter = Arc::new(CountingBudget::new());
    let font = Font::from_ttf_with_budget(&tiny_ttf(), &params(), counter.clone()).unwrap();
    assert!(counter.live() >= 64 * 64);
    drop(font);
    assert_eq!(counter.live(), 0);

    let counter = Arc::new(CountingBudget::with_limit(1024));
    let err = Font::from_ttf_with_budget(&tiny_ttf(), &params(), counter.clone()).unwrap_err();
    assert!(matches!(err, FontError::Storage(_)));
    assert_eq!(counter.live(), 0);
}
