// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::Criterion;
use quadtext::{Font, TtfParams};
use quadtext_tests::tiny_ttf;

pub fn load(c: &mut Criterion) {
    let mut g = c.benchmark_group("load");
    let data = tiny_ttf();

    for size in [16.0, 64.0] {
        let params = TtfParams::new(size, 512);
        g.bench_function(format!("tiny_{size}px"), |b| {
            b.iter(|| Font::from_ttf(&data, &params).map(|font| font.glyphs().len()))
        });
    }
}
