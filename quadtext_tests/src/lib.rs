// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared fixtures for Quadtext's integration tests.
//!
//! Fonts here are synthetic, so expected positions can be computed by hand: [`block_font`] is
//! built from pre-baked parts, [`tiny_ttf`] is a complete TrueType file small enough to spell
//! out byte by byte.

// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![allow(missing_docs, clippy::missing_assert_message)]

use std::sync::atomic::{AtomicUsize, Ordering};

use quadtext::{
    Font, FontMetrics, FontParts, Glyph, KerningPair, Layout, StorageBudget, StorageError,
};

/// Advance of the space glyph in [`block_font`].
pub const SPACE_ADVANCE: f32 = 5.0;
/// Advance of every other narrow glyph in [`block_font`].
pub const ADVANCE: f32 = 10.0;
/// Advance and width of the wide (CJK) glyphs in [`block_font`].
pub const WIDE: f32 = 16.0;

/// Kerning between `A` and `V` in [`block_font`].
pub const KERN_AV: f32 = -2.0;

/// A font with a glyph for printable ASCII, `é`, `€` and `中文`.
///
/// Narrow glyphs advance by [`ADVANCE`], with a box 8 wide starting 1 right of the pen and
/// 8 above the baseline. The glyph index of every glyph is its codepoint. `A` `V` is kerned by
/// [`KERN_AV`], `T` `o` by -1.
pub fn block_font(line_height: f32) -> Font {
    let narrow = |c: char| Glyph {
        codepoint: u32::from(c),
        glyph_index: u32::from(c),
        bearing_x: 1.0,
        bearing_y: -8.0,
        width: 8.0,
        height: 8.0,
        advance: ADVANCE,
        u1: 1.0,
        v1: 1.0,
        ..Glyph::default()
    };
    let wide = |c: char| Glyph {
        bearing_x: 0.0,
        bearing_y: -12.0,
        width: WIDE,
        height: 14.0,
        advance: WIDE,
        ..narrow(c)
    };
    let mut glyphs = vec![Glyph {
        advance: SPACE_ADVANCE,
        width: 0.0,
        height: 0.0,
        ..narrow(' ')
    }];
    glyphs.extend(('!'..='~').map(narrow));
    glyphs.push(narrow('é'));
    glyphs.push(narrow('€'));
    glyphs.push(wide('中'));
    glyphs.push(wide('文'));

    let kerning_pairs = [
        KerningPair {
            first_glyph: u32::from('A'),
            second_glyph: u32::from('V'),
            amount: KERN_AV,
        },
        KerningPair {
            first_glyph: u32::from('T'),
            second_glyph: u32::from('o'),
            amount: -1.0,
        },
    ];
    Font::from_parts(FontParts {
        metrics: FontMetrics::new(line_height - 4.0, -4.0, 0.0),
        glyphs: &glyphs,
        kerning_pairs: &kerning_pairs,
        ..FontParts::default()
    })
    .unwrap()
}

/// The `(x, y)` of every glyph in `layout`.
pub fn positions<U>(layout: &Layout<'_, U>) -> Vec<(f32, f32)> {
    layout.glyphs().iter().map(|g| (g.x, g.y)).collect()
}

/// The codepoints of `layout`, one string per line, top to bottom. Whitespace has no glyph and
/// so does not show up.
pub fn lines<U>(layout: &Layout<'_, U>) -> Vec<String> {
    let mut lines: Vec<(f32, String)> = Vec::new();
    for g in layout.glyphs() {
        let c = char::from_u32(g.glyph.codepoint).unwrap_or(char::REPLACEMENT_CHARACTER);
        let baseline = g.y - g.glyph.bearing_y;
        match lines.last_mut() {
            Some((y, line)) if *y == baseline => line.push(c),
            _ => lines.push((baseline, c.to_string())),
        }
    }
    lines.into_iter().map(|(_, line)| line).collect()
}

/// A budget that counts the bytes charged to it and refuses anything past a limit.
#[derive(Debug)]
pub struct CountingBudget {
    limit: usize,
    live: AtomicUsize,
    requests: AtomicUsize,
}

impl CountingBudget {
    pub fn new() -> Self {
        Self::with_limit(usize::MAX)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            live: AtomicUsize::new(0),
            requests: AtomicUsize::new(0),
        }
    }

    /// Bytes currently charged.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Number of reservations and releases seen.
    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

impl Default for CountingBudget {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBudget for CountingBudget {
    fn resize(&self, old_size: usize, new_size: usize) -> Result<(), StorageError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        let live = self.live.load(Ordering::SeqCst) - old_size;
        if new_size > self.limit.saturating_sub(live) {
            return Err(StorageError::Refused {
                requested: new_size,
            });
        }
        self.live.store(live + new_size, Ordering::SeqCst);
        Ok(())
    }
}

/// Units per em of [`tiny_ttf`].
pub const TINY_UPEM: u16 = 1024;

/// A minimal TrueType font.
///
/// Three glyphs at 1024 units per em with ascender 768 and descender -256:
///
/// - 0: `.notdef`, empty, advance 512
/// - 1: `A`, the square (128, 0) to (640, 704), advance 768
/// - 2: `B`, the same square, advance 768
///
/// The `kern` table holds one pair, `A` `B` = -128. At a size of 16 pixels every metric is a
/// whole number of pixels: one pixel is 64 units.
pub fn tiny_ttf() -> Vec<u8> {
    let tables: [(&[u8; 4], Vec<u8>); 8] = [
        (b"cmap", cmap()),
        (b"glyf", glyf()),
        (b"head", head()),
        (b"hhea", hhea()),
        (b"hmtx", hmtx()),
        (b"kern", kern()),
        (b"loca", loca()),
        (b"maxp", maxp()),
    ];
    sfnt(&tables)
}

/// Big-endian byte writer.
#[derive(Default)]
struct Be(Vec<u8>);

impl Be {
    fn u16(mut self, v: u16) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn i16(mut self, v: i16) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn u32(mut self, v: u32) -> Self {
        self.0.extend_from_slice(&v.to_be_bytes());
        self
    }

    fn bytes(mut self, v: &[u8]) -> Self {
        self.0.extend_from_slice(v);
        self
    }
}

fn sfnt(tables: &[(&[u8; 4], Vec<u8>)]) -> Vec<u8> {
    let num_tables = tables.len() as u16;
    let entry_selector = 15 - num_tables.leading_zeros() as u16;
    let search_range = 16 << entry_selector;
    let mut header = Be::default()
        .u32(0x0001_0000)
        .u16(num_tables)
        .u16(search_range)
        .u16(entry_selector)
        .u16(num_tables * 16 - search_range);
    let mut offset = 12 + 16 * tables.len();
    let mut body = Vec::new();
    for (tag, data) in tables {
        header = header
            .bytes(*tag)
            .u32(0)
            .u32(offset as u32)
            .u32(data.len() as u32);
        body.extend_from_slice(data);
        while body.len() % 4 != 0 {
            body.push(0);
        }
        offset = 12 + 16 * tables.len() + body.len();
    }
    header.0.extend_from_slice(&body);
    header.0
}

fn head() -> Vec<u8> {
    Be::default()
        .u32(0x0001_0000)
        .u32(0x0001_0000)
        // Checksum adjustment, then the magic number.
        .u32(0)
        .u32(0x5F0F_3CF5)
        .u16(0)
        .u16(TINY_UPEM)
        // Created and modified.
        .u32(0)
        .u32(0)
        .u32(0)
        .u32(0)
        .i16(0)
        .i16(0)
        .i16(640)
        .i16(704)
        .u16(0)
        .u16(8)
        .i16(2)
        // Short loca offsets.
        .i16(0)
        .i16(0)
        .0
}

fn hhea() -> Vec<u8> {
    Be::default()
        .u32(0x0001_0000)
        .i16(768)
        .i16(-256)
        .i16(0)
        .u16(768)
        .i16(0)
        .i16(0)
        .i16(640)
        .i16(1)
        .i16(0)
        .i16(0)
        .bytes(&[0; 8])
        .i16(0)
        .u16(3)
        .0
}

fn maxp() -> Vec<u8> {
    let be = Be::default().u32(0x0001_0000).u16(3).u16(4).u16(1);
    // No composites, two zones, and no hinting resources.
    let be = be.u16(0).u16(0).u16(2);
    (0..8).fold(be, |be, _| be.u16(0)).0
}

fn hmtx() -> Vec<u8> {
    Be::default()
        .u16(512)
        .i16(0)
        .u16(768)
        .i16(128)
        .u16(768)
        .i16(128)
        .0
}

fn square() -> Be {
    let mut be = Be::default()
        .i16(1)
        .i16(128)
        .i16(0)
        .i16(640)
        .i16(704)
        // End point of the only contour, no instructions, four on-curve points.
        .u16(3)
        .u16(0)
        .bytes(&[1, 1, 1, 1]);
    for dx in [128, 0, 512, 0] {
        be = be.i16(dx);
    }
    for dy in [0, 704, 0, -704] {
        be = be.i16(dy);
    }
    be
}

fn glyf() -> Vec<u8> {
    let mut data = square().0;
    data.extend_from_slice(&square().0);
    data
}

fn loca() -> Vec<u8> {
    let glyph_len = square().0.len() as u16;
    Be::default()
        .u16(0)
        .u16(0)
        .u16(glyph_len / 2)
        .u16(glyph_len)
        .0
}

fn cmap() -> Vec<u8> {
    Be::default()
        .u16(0)
        .u16(1)
        // Windows, Unicode BMP.
        .u16(3)
        .u16(1)
        .u32(12)
        // Format 4: 'A' and 'B' map to glyphs 1 and 2, plus the final 0xFFFF segment.
        .u16(4)
        .u16(32)
        .u16(0)
        .u16(4)
        .u16(4)
        .u16(1)
        .u16(0)
        .u16(0x42)
        .u16(0xFFFF)
        .u16(0)
        .u16(0x41)
        .u16(0xFFFF)
        .i16(1 - 0x41)
        .i16(1)
        .u16(0)
        .u16(0)
        .0
}

fn kern() -> Vec<u8> {
    Be::default()
        .u16(0)
        .u16(1)
        .u16(0)
        .u16(20)
        .u16(0x0001)
        .u16(1)
        .u16(6)
        .u16(0)
        .u16(0)
        .u16(1)
        .u16(2)
        .i16(-128)
        .0
}
