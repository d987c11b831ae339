// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "Not needed for benchmarks")]

use criterion::{criterion_group, criterion_main};
use quadtext_bench::{layout, load, measure};

criterion_group!(l, layout::layout);
criterion_group!(m, measure::measure);
criterion_group!(t, load::load);
criterion_main!(l, m, t);
