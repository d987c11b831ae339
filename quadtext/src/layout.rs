// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Multi-line, multi-style text layout.
//!
//! A [`Layout`] accumulates text from any number of [`add_text`](Layout::add_text) and
//! [`add_glyphs`](Layout::add_glyphs) calls, each with its own [`Style`], into a fixed-capacity
//! buffer of [`PositionedGlyph`]s. Lines wrap at the layout's wrap width and are aligned as they
//! close; [`compute`](Layout::compute) aligns the last, still open line.
//!
//! Text is consumed in *chunks*: runs of glyphs that may not be split across lines. With
//! `add_text` a chunk is a word, delimited by space, `\n` or `\r`. With `add_glyphs` every glyph
//! is its own chunk, which suits scripts that do not separate words with spaces.
//!
//! A chunk that does not fit on a line that already has content moves to the next line. A chunk
//! that does not fit on an empty line stays there and overflows. A chunk that does not fit into
//! the remaining capacity is dropped together with the rest of the text of that call.

use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::storage::{self, StorageBudget, StorageError, Unlimited};
use crate::draw::Quad;
use crate::font::Font;
use crate::glyph::Glyph;
use crate::metrics::KernContext;
use crate::utf8::Utf8Decoder;

/// Horizontal alignment of lines within the wrap width.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Align {
    /// Lines start at x = 0.
    #[default]
    Left,
    /// Lines are centered between 0 and the wrap width.
    Center,
    /// Lines end at the wrap width.
    Right,
}

/// A font together with caller data carried along to every glyph laid out with it.
///
/// The payload is never inspected; use it for colors, material ids or anything else the
/// renderer needs per glyph.
#[derive(Clone, Debug)]
pub struct Style<'a, U = ()> {
    /// The font glyphs are taken from.
    pub font: &'a Font,
    /// Caller data.
    pub user_data: U,
}

impl<'a, U> Style<'a, U> {
    /// Create a style drawing with `font`.
    pub fn new(font: &'a Font, user_data: U) -> Self {
        Self { font, user_data }
    }
}

/// A glyph placed by a [`Layout`].
#[derive(Debug)]
pub struct PositionedGlyph<'a, U = ()> {
    /// The style the glyph was added with.
    pub style: &'a Style<'a, U>,
    /// The glyph.
    pub glyph: &'a Glyph,
    /// Left edge of the glyph's box, relative to the layout origin. Includes the bearing.
    pub x: f32,
    /// Top edge of the glyph's box, relative to the layout origin. Includes the bearing.
    pub y: f32,
}

impl<U> Clone for PositionedGlyph<'_, U> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<U> Copy for PositionedGlyph<'_, U> {}

impl<U> PositionedGlyph<'_, U> {
    /// The quad for this glyph with the layout origin at `(ox, oy)`.
    pub fn quad(&self, ox: f32, oy: f32) -> Quad {
        Quad::for_glyph(self.glyph, self.x + ox, self.y + oy)
    }

    /// The x position the pen had when this glyph was placed.
    fn pen_x(&self) -> f32 {
        self.x - self.glyph.bearing_x
    }
}

/// Write the quads of `glyphs` with the layout origin at `(ox, oy)` into `out`.
///
/// Stops when either side runs out and returns the number of quads written.
pub fn write_quads<U>(
    glyphs: &[PositionedGlyph<'_, U>],
    out: &mut [Quad],
    ox: f32,
    oy: f32,
) -> usize {
    let mut written = 0;
    for (glyph, quad) in glyphs.iter().zip(out.iter_mut()) {
        *quad = glyph.quad(ox, oy);
        written += 1;
    }
    written
}

/// The visual width of a line or chunk: from the left edge of the first glyph's box to the right
/// edge of the last one's, with the first glyph's bearing counted from its pen position.
fn visual_width<U>(glyphs: &[PositionedGlyph<'_, U>]) -> f32 {
    match (glyphs.first(), glyphs.last()) {
        (Some(first), Some(last)) => last.x + last.glyph.width - first.pen_x(),
        _ => 0.0,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Phase {
    Accumulating,
    /// The open line has been aligned, shifting it by `shift`.
    Finalized { shift: f32 },
}

/// Glyphs that are committed to a line together.
///
/// Positions are relative to the pen position the chunk starts at.
struct Chunk<'a, U> {
    glyphs: SmallVec<[PositionedGlyph<'a, U>; 32]>,
    /// Pen movement over the whole chunk.
    advance: f32,
    /// Kerning against the glyph before the chunk, skipped when the chunk starts a line.
    lead: f32,
}

impl<U> Chunk<'_, U> {
    fn new() -> Self {
        Self {
            glyphs: SmallVec::new(),
            advance: 0.0,
            lead: 0.0,
        }
    }

    fn clear(&mut self) {
        self.glyphs.clear();
        self.advance = 0.0;
        self.lead = 0.0;
    }
}

/// Reusable multi-line text layout with a fixed glyph capacity.
///
/// Coordinates start at the baseline of the first line, so pass the ascent of the first line's
/// font as the y origin when drawing if the origin should be the top of the text.
pub struct Layout<'a, U = ()> {
    budget: Arc<dyn StorageBudget>,
    glyphs: Vec<PositionedGlyph<'a, U>>,
    capacity: usize,
    wrap_width: f32,
    align: Align,
    cursor_x: f32,
    cursor_y: f32,
    /// Index of the first glyph of the open line.
    line_start: usize,
    /// Tallest line height of all styles on the open line.
    line_height: f32,
    phase: Phase,
}

impl<'a, U> Layout<'a, U> {
    /// Create a layout holding up to `capacity` glyphs.
    ///
    /// The wrap width starts out as zero, so call [`reset`](Self::reset) before adding text.
    pub fn new(capacity: usize) -> Self {
        Self::with_storage(Arc::new(Unlimited), Vec::with_capacity(capacity), capacity)
    }

    /// Create a layout holding up to `capacity` glyphs, with storage charged to `budget`.
    pub fn with_budget(
        capacity: usize,
        budget: Arc<dyn StorageBudget>,
    ) -> Result<Self, StorageError> {
        let glyphs = storage::reserve_vec(&*budget, capacity)?;
        Ok(Self::with_storage(budget, glyphs, capacity))
    }

    fn with_storage(
        budget: Arc<dyn StorageBudget>,
        glyphs: Vec<PositionedGlyph<'a, U>>,
        capacity: usize,
    ) -> Self {
        Self {
            budget,
            glyphs,
            capacity,
            wrap_width: 0.0,
            align: Align::Left,
            cursor_x: 0.0,
            cursor_y: 0.0,
            line_start: 0,
            line_height: 0.0,
            phase: Phase::Accumulating,
        }
    }

    /// Remove all glyphs and start over with a new wrap width and alignment.
    pub fn reset(&mut self, wrap_width: f32, align: Align) {
        self.glyphs.clear();
        self.wrap_width = wrap_width;
        self.align = align;
        self.cursor_x = 0.0;
        self.cursor_y = 0.0;
        self.line_start = 0;
        self.line_height = 0.0;
        self.phase = Phase::Accumulating;
    }

    /// Add `text`, wrapping between words.
    ///
    /// Returns the total number of glyphs in the layout. Invalid UTF-8 and codepoints without a
    /// glyph in the style's font are skipped. Kerning applies within this call only.
    pub fn add_text(&mut self, style: &'a Style<'a, U>, text: impl AsRef<[u8]>) -> usize {
        let font = style.font;
        self.begin_add(font);
        let mut space_advance = None;
        let mut kern = KernContext::default();
        let mut chunk = Chunk::new();
        for c in Utf8Decoder::new(text.as_ref()) {
            let Ok(c) = c else {
                kern.reset();
                continue;
            };
            if is_whitespace(c) {
                if !self.flush(font, &mut chunk) {
                    return self.glyphs.len();
                }
                kern.reset();
                self.whitespace(font, c, &mut space_advance);
                continue;
            }
            let Some(glyph) = font.find_glyph(u32::from(c)) else {
                kern.reset();
                continue;
            };
            chunk.advance += kern.advance(font, glyph);
            chunk.glyphs.push(PositionedGlyph {
                style,
                glyph,
                x: chunk.advance + glyph.bearing_x,
                y: glyph.bearing_y,
            });
            chunk.advance += glyph.advance;
        }
        self.flush(font, &mut chunk);
        self.glyphs.len()
    }

    /// Add `text`, wrapping between any two glyphs.
    ///
    /// Otherwise the same as [`add_text`](Self::add_text): spaces, `\n` and `\r` behave as they
    /// do there, and the return value is the total number of glyphs in the layout.
    pub fn add_glyphs(&mut self, style: &'a Style<'a, U>, text: impl AsRef<[u8]>) -> usize {
        let font = style.font;
        self.begin_add(font);
        let mut space_advance = None;
        let mut kern = KernContext::default();
        let mut chunk = Chunk::new();
        for c in Utf8Decoder::new(text.as_ref()) {
            let Ok(c) = c else {
                kern.reset();
                continue;
            };
            if is_whitespace(c) {
                kern.reset();
                self.whitespace(font, c, &mut space_advance);
                continue;
            }
            let Some(glyph) = font.find_glyph(u32::from(c)) else {
                kern.reset();
                continue;
            };
            chunk.lead = kern.advance(font, glyph);
            chunk.advance = glyph.advance;
            chunk.glyphs.push(PositionedGlyph {
                style,
                glyph,
                x: glyph.bearing_x,
                y: glyph.bearing_y,
            });
            if !self.flush(font, &mut chunk) {
                break;
            }
        }
        self.glyphs.len()
    }

    /// Align the open line. Calling this again without adding text in between does nothing.
    pub fn compute(&mut self) {
        if self.phase == Phase::Accumulating {
            let shift = self.align_line();
            self.phase = Phase::Finalized { shift };
        }
    }

    /// The glyphs laid out so far.
    pub fn glyphs(&self) -> &[PositionedGlyph<'a, U>] {
        &self.glyphs
    }

    /// The glyphs laid out so far, for adjusting positions after layout.
    pub fn glyphs_mut(&mut self) -> &mut [PositionedGlyph<'a, U>] {
        &mut self.glyphs
    }

    /// The number of glyphs laid out so far.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Whether no glyphs have been laid out.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// The maximum number of glyphs.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The width lines wrap at.
    pub fn wrap_width(&self) -> f32 {
        self.wrap_width
    }

    /// The alignment of lines.
    pub fn align(&self) -> Align {
        self.align
    }

    /// The quads of all glyphs with the layout origin at `(ox, oy)`.
    pub fn quads(&self, ox: f32, oy: f32) -> impl Iterator<Item = Quad> + '_ {
        self.glyphs.iter().map(move |g| g.quad(ox, oy))
    }

    fn begin_add(&mut self, font: &Font) {
        if let Phase::Finalized { shift } = self.phase {
            // The open line may still grow, so it is aligned again by the next `compute`.
            shift_glyphs(&mut self.glyphs[self.line_start..], -shift);
            self.phase = Phase::Accumulating;
        }
        self.line_height = self.line_height.max(font.metrics().line_height);
    }

    fn whitespace(&mut self, font: &Font, c: char, space_advance: &mut Option<f32>) {
        match c {
            '\n' => self.break_line(font),
            ' ' if self.cursor_x > 0.0 => {
                self.cursor_x += *space_advance.get_or_insert_with(|| space_advance_of(font));
            }
            _ => {}
        }
    }

    /// Commit `chunk` to the layout, breaking the line first if it does not fit.
    ///
    /// Returns `false`, leaving the layout untouched, if the chunk exceeds the remaining capacity.
    fn flush(&mut self, font: &Font, chunk: &mut Chunk<'a, U>) -> bool {
        if chunk.glyphs.is_empty() {
            return true;
        }
        if self.glyphs.len() + chunk.glyphs.len() > self.capacity {
            return false;
        }
        let width = visual_width(&chunk.glyphs);
        if self.cursor_x > 0.0 && self.cursor_x + chunk.lead + width > self.wrap_width {
            self.break_line(font);
        }
        let lead = if self.cursor_x > 0.0 { chunk.lead } else { 0.0 };
        let (dx, dy) = (self.cursor_x + lead, self.cursor_y);
        self.glyphs.extend(chunk.glyphs.drain(..).map(|mut g| {
            g.x += dx;
            g.y += dy;
            g
        }));
        // Advance by the pen movement rather than the visual width, which would lose the gap
        // between the last glyph's box and its advance.
        self.cursor_x += lead + chunk.advance;
        chunk.clear();
        true
    }

    fn break_line(&mut self, font: &Font) {
        self.cursor_x = 0.0;
        self.cursor_y += self.line_height;
        self.align_line();
        self.line_start = self.glyphs.len();
        self.line_height = font.metrics().line_height;
    }

    /// Shift the open line into place, returning the shift applied.
    fn align_line(&mut self) -> f32 {
        let line = &mut self.glyphs[self.line_start..];
        if line.is_empty() {
            return 0.0;
        }
        let shift = match self.align {
            Align::Left => return 0.0,
            Align::Center => self.wrap_width / 2.0 - visual_width(line) / 2.0,
            Align::Right => self.wrap_width - visual_width(line),
        };
        shift_glyphs(line, shift);
        shift
    }
}

impl<U> Drop for Layout<'_, U> {
    fn drop(&mut self) {
        storage::release_vec(&*self.budget, &mut self.glyphs, self.capacity);
    }
}

impl<U> fmt::Debug for Layout<'_, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Layout")
            .field("len", &self.glyphs.len())
            .field("capacity", &self.capacity)
            .field("wrap_width", &self.wrap_width)
            .field("align", &self.align)
            .field("cursor", &(self.cursor_x, self.cursor_y))
            .finish_non_exhaustive()
    }
}

fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\n' | '\r')
}

fn shift_glyphs<U>(glyphs: &mut [PositionedGlyph<'_, U>], shift: f32) {
    for g in glyphs {
        g.x += shift;
    }
}

fn space_advance_of(font: &Font) -> f32 {
    match font.find_glyph(u32::from(' ')) {
        Some(space) => space.advance,
        None => {
            log::warn!("font has no glyph for U+0020, spaces will not advance the pen");
            0.0
        }
    }
}
