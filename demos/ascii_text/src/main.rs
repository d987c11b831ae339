// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lays out text with a TrueType font and prints the resulting quads as ASCII art.
//!
//! ```text
//! cargo run -p ascii_text -- path/to/font.ttf --size 24 --width 400 "Hello, quads"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use quadtext::{Align, Atlas, Font, Layout, Quad, Style, TtfParams};

/// Darkest last; indexed by coverage / 32.
const RAMP: &[u8; 8] = b" .:ioVM@";

#[derive(Parser, Debug)]
#[command(about, long_about = None)]
struct Args {
    /// The TrueType or OpenType font to draw with
    font: PathBuf,
    /// The text to lay out
    #[arg(default_value = "The quick brown fox jumps over the lazy dog.")]
    text: String,
    /// Pixel distance between ascent and descent
    #[arg(long, short, default_value_t = 16.0)]
    size: f32,
    /// Wrap width in pixels
    #[arg(long, short, default_value_t = 160.0)]
    width: f32,
    #[arg(long, short, value_enum, default_value_t = AlignArg::Left)]
    align: AlignArg,
    /// Wrap between any two glyphs instead of between words
    #[arg(long)]
    glyph_wrap: bool,
    /// Index of the face in a font collection
    #[arg(long, default_value_t = 0)]
    index: u32,
    /// Side length of the glyph atlas
    #[arg(long, default_value_t = 512)]
    atlas_size: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum AlignArg {
    Left,
    Center,
    Right,
}

impl From<AlignArg> for Align {
    fn from(align: AlignArg) -> Self {
        match align {
            AlignArg::Left => Self::Left,
            AlignArg::Center => Self::Center,
            AlignArg::Right => Self::Right,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    if args.width.is_nan() || args.width <= 0.0 {
        bail!("wrap width must be positive, got {}", args.width);
    }

    let params = TtfParams {
        font_index: args.index,
        // Text is sampled once per character cell, so oversampling would be wasted.
        oversampling_h: 1,
        oversampling_v: 1,
        ..TtfParams::new(args.size, args.atlas_size)
    };
    let font = Font::load_ttf(&args.font, &params)
        .with_context(|| format!("loading {}", args.font.display()))?;
    let atlas = font.atlas().context("font has no atlas")?;

    let style = Style::new(&font, ());
    let mut layout = Layout::new(args.text.len());
    layout.reset(args.width, args.align.into());
    let count = if args.glyph_wrap {
        layout.add_glyphs(&style, &args.text)
    } else {
        layout.add_text(&style, &args.text)
    };
    layout.compute();
    log::info!("laid out {count} glyphs");

    let quads: Vec<Quad> = layout.quads(0.0, font.metrics().ascent).collect();
    let height = quads
        .iter()
        .map(|q| q.y + q.h)
        .fold(font.metrics().line_height, f32::max);
    let mut canvas = Canvas::new(args.width.ceil() as usize, height.ceil() as usize);
    for quad in &quads {
        canvas.draw(quad, atlas);
    }
    for row in canvas.rows() {
        println!("{}", row.trim_end());
    }
    Ok(())
}

/// One coverage value per character cell.
struct Canvas {
    width: usize,
    height: usize,
    cells: Vec<u8>,
}

impl Canvas {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0; width * height],
        }
    }

    /// Sample the atlas at the center of every cell the quad covers, nearest neighbor.
    fn draw(&mut self, quad: &Quad, atlas: &Atlas) {
        if quad.w <= 0.0 || quad.h <= 0.0 {
            return;
        }
        let x0 = quad.x.floor().max(0.0) as usize;
        let y0 = quad.y.floor().max(0.0) as usize;
        let x1 = ((quad.x + quad.w).ceil().max(0.0) as usize).min(self.width);
        let y1 = ((quad.y + quad.h).ceil().max(0.0) as usize).min(self.height);
        let (aw, ah) = (atlas.width() as f32, atlas.height() as f32);
        for y in y0..y1 {
            let t = (y as f32 + 0.5 - quad.y) / quad.h;
            if !(0.0..1.0).contains(&t) {
                continue;
            }
            let v = quad.v0 + t * (quad.v1 - quad.v0);
            for x in x0..x1 {
                let s = (x as f32 + 0.5 - quad.x) / quad.w;
                if !(0.0..1.0).contains(&s) {
                    continue;
                }
                let u = quad.u0 + s * (quad.u1 - quad.u0);
                let coverage = atlas
                    .coverage((u * aw) as u32, (v * ah) as u32)
                    .unwrap_or_default();
                let cell = &mut self.cells[y * self.width + x];
                *cell = (*cell).max(coverage);
            }
        }
    }

    fn rows(&self) -> impl Iterator<Item = String> + '_ {
        self.cells.chunks(self.width.max(1)).map(|row| {
            row.iter()
                .map(|&c| char::from(RAMP[usize::from(c >> 5)]))
                .collect()
        })
    }
}
