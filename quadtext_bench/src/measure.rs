// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::Criterion;
use quadtext::Quad;
use quadtext_tests::block_font;

use crate::PROSE;

pub fn measure(c: &mut Criterion) {
    let mut g = c.benchmark_group("measure");
    let font = block_font(16.0);

    g.bench_function("text_width", |b| b.iter(|| font.text_width(PROSE)));

    let mut quads = vec![Quad::default(); PROSE.len()];
    g.bench_function("draw_text", |b| {
        b.iter(|| font.draw_text(PROSE, 0.0, 0.0, Some(&mut quads)))
    });
    g.bench_function("draw_text_count", |b| {
        b.iter(|| font.draw_text(PROSE, 0.0, 0.0, None))
    });
}
