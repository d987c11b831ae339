// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quadtext maps UTF-8 text to glyphs of a font and tells you where to draw those glyphs as
//! textured quads.
//!
//! It knows nothing about your renderer. A [`Font`] owns a single-channel coverage atlas, its
//! [`FontMetrics`], a sorted glyph table and a sorted kerning table. Text is positioned either
//! one line at a time with [`Font::draw_text`], or with a reusable [`Layout`] that wraps words
//! (or individual glyphs), breaks lines and aligns them, mixing any number of [`Style`]s.
//!
//! # Coordinates
//!
//! Positive y is down. A glyph drawn "at" a position is drawn with its *origin* there; the
//! origin's y is the baseline. The glyph's bounding box starts at `(bearing_x, bearing_y)`
//! relative to the origin and may extend left of it or below the baseline. The pen moves by
//! `advance` after each glyph, plus any kerning between adjacent glyphs.
//!
//! # Usage
//!
//! ```
//! use quadtext::{Align, Font, FontMetrics, FontParts, Glyph, Layout, Style};
//!
//! // Sorted by codepoint: space first, then the lowercase letters.
//! let glyphs: Vec<Glyph> = [b' ']
//!     .into_iter()
//!     .chain(b'a'..=b'z')
//!     .map(|c| Glyph {
//!         codepoint: u32::from(c),
//!         glyph_index: u32::from(c),
//!         width: 8.0,
//!         height: 10.0,
//!         bearing_y: -10.0,
//!         advance: 9.0,
//!         ..Glyph::default()
//!     })
//!     .collect();
//! let font = Font::from_parts(FontParts {
//!     metrics: FontMetrics::new(12.0, -3.0, 1.0),
//!     glyphs: &glyphs,
//!     ..FontParts::default()
//! })
//! .unwrap();
//!
//! let style = Style::new(&font, ());
//! let mut layout = Layout::new(64);
//! layout.reset(100.0, Align::Center);
//! layout.add_text(&style, "hello quads");
//! layout.compute();
//! let quads: Vec<_> = layout.quads(0.0, font.metrics().ascent).collect();
//! assert_eq!(quads.len(), 10);
//! ```
//!
//! # Features
//!
//! - `ttf` (enabled by default): Build fonts from TrueType/OpenType data with
//!   [`Font::from_ttf`] and [`Font::load_ttf`].

// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod draw;
mod font;
mod glyph;
mod kerning;
pub mod layout;
mod metrics;
pub mod storage;
#[cfg(feature = "ttf")]
pub mod ttf;
pub mod utf8;

pub use draw::Quad;
pub use font::{Atlas, Font, FontError, FontMetrics, FontParts};
pub use glyph::Glyph;
pub use kerning::KerningPair;
pub use layout::{Align, Layout, PositionedGlyph, Style, write_quads};
pub use storage::{StorageBudget, StorageError, Unlimited};
#[cfg(feature = "ttf")]
pub use ttf::TtfParams;
