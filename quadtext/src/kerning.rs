// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pairwise kerning adjustments.

use crate::glyph::is_strictly_sorted_by_key;
use crate::storage::{self, StorageBudget, StorageError};

/// Horizontal adjustment applied between two adjacent glyphs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KerningPair {
    /// Font glyph index of the left glyph.
    pub first_glyph: u32,
    /// Font glyph index of the right glyph.
    pub second_glyph: u32,
    /// Signed offset added to the pen between the two glyphs, in pixels.
    pub amount: f32,
}

impl KerningPair {
    /// The composite sort key: first glyph, then second glyph.
    pub fn key(&self) -> u64 {
        pair_key(self.first_glyph, self.second_glyph)
    }
}

fn pair_key(first: u32, second: u32) -> u64 {
    (u64::from(first) << 32) | u64::from(second)
}

/// Kerning pairs sorted by `(first_glyph, second_glyph)`.
#[derive(Clone, Debug, Default)]
pub(crate) struct KerningTable {
    pairs: Vec<KerningPair>,
}

impl KerningTable {
    /// Build a table from pairs sorted strictly ascending by [`KerningPair::key`].
    ///
    /// Returns `None` if the pairs are out of order or a pair appears twice.
    #[cfg(test)]
    fn from_sorted(pairs: Vec<KerningPair>) -> Option<Self> {
        is_strictly_sorted_by_key(&pairs, KerningPair::key).then_some(Self { pairs })
    }

    pub(crate) fn copy_sorted(
        budget: &dyn StorageBudget,
        pairs: &[KerningPair],
    ) -> Result<Option<Self>, StorageError> {
        if !is_strictly_sorted_by_key(pairs, KerningPair::key) {
            return Ok(None);
        }
        let pairs = storage::reserve_copy(budget, pairs)?;
        Ok(Some(Self { pairs }))
    }

    /// The adjustment between `first` and `second`, or exactly `0.0` if the pair has none.
    pub(crate) fn get(&self, first: u32, second: u32) -> f32 {
        let key = pair_key(first, second);
        match self.pairs.binary_search_by_key(&key, KerningPair::key) {
            Ok(idx) => self.pairs[idx].amount,
            Err(_) => 0.0,
        }
    }

    /// All pairs, sorted.
    pub(crate) fn as_slice(&self) -> &[KerningPair] {
        &self.pairs
    }

    /// The number of pairs.
    pub(crate) fn len(&self) -> usize {
        self.pairs.len()
    }

    pub(crate) fn release(&mut self, budget: &dyn StorageBudget) {
        let len = self.pairs.len();
        storage::release_vec(budget, &mut self.pairs, len);
    }
}
