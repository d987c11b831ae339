// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![allow(missing_docs, reason = "Not needed for benchmarks")]

pub mod layout;
pub mod load;
pub mod measure;

/// A paragraph of plain ASCII prose, about 1000 glyphs.
pub const PROSE: &str = "The quick brown fox jumps over the lazy dog while the five boxing \
    wizards jump quickly. Pack my box with five dozen liquor jugs, then sphinx of black quartz, \
    judge my vow. How vexingly quick daft zebras jump! Bright vixens jump; dozy fowl quack. \
    Jackdaws love my big sphinx of quartz. Waltz, bad nymph, for quick jigs vex. Glib jocks \
    quiz nymph to vex dwarf. The five boxing wizards jump quickly over the lazy dog again and \
    again, until the fox gets tired and the dog falls asleep by the fire. To be or not to be, \
    that is the question: whether it is nobler in the mind to suffer the slings and arrows of \
    outrageous fortune, or to take arms against a sea of troubles and by opposing end them. \
    AVAVAV To To To, kerned pairs show up in headlines more often than anyone expects. \
    Then the paragraph ends, with a last line that is rather short.";

/// Text without spaces, for glyph wrapping.
pub const CJK: &str = "中文中文中文中文中文中文中文中文中文中文中文中文中文中文中文中文\
    中文中文中文中文中文中文中文中文中文中文中文中文中文中文中文中文";
