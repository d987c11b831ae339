// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::Criterion;
use quadtext::{Align, Layout, Quad, Style};
use quadtext_tests::block_font;

use crate::{CJK, PROSE};

pub fn layout(c: &mut Criterion) {
    let mut g = c.benchmark_group("layout");
    let font = block_font(16.0);
    let style = Style::new(&font, ());
    let mut layout = Layout::new(2048);

    macro_rules! wrap_single {
        ($name:ident, $align:expr, $add:ident, $text:expr) => {
            g.bench_function(stringify!($name), |b| {
                b.iter(|| {
                    layout.reset(400.0, $align);
                    layout.$add(&style, $text);
                    layout.compute();
                    layout.len()
                })
            });
        };
    }

    wrap_single!(words_left, Align::Left, add_text, PROSE);
    wrap_single!(words_center, Align::Center, add_text, PROSE);
    wrap_single!(words_right, Align::Right, add_text, PROSE);
    wrap_single!(glyphs_left, Align::Left, add_glyphs, CJK);

    let mut quads = vec![Quad::default(); 2048];
    layout.reset(400.0, Align::Left);
    layout.add_text(&style, PROSE);
    layout.compute();
    g.bench_function("write_quads", |b| {
        b.iter(|| quadtext::write_quads(layout.glyphs(), &mut quads, 0.0, 12.0))
    });
}
