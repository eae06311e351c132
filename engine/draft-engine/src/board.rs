// engine/draft-engine/src/board.rs

use std::sync::Arc;

use crate::bitset::Bitset;
use crate::pool::CandidatePool;
use crate::ranking::RankOrder;
use crate::types::{CandidateId, CategoryId, CategoryMask};

/// Availability of every candidate, navigated by rank position.
///
/// One bitset per base category over board positions, plus a cursor per
/// category pointing at its best remaining position. Removal clears a bit and
/// advances the cursor only when the head was taken, so a draft walks each
/// bitset once and `best_available` is a min over at most one cursor per
/// category.
///
/// Cloning copies the bitsets and cursors; the rank order itself is shared.
#[derive(Clone, Debug)]
pub struct RankingBoard {
    order: Arc<RankOrder>,
    category_at: Arc<[CategoryId]>,
    available: Vec<Bitset>,
    cursors: Vec<Option<usize>>,
    remaining: usize,
}

impl RankingBoard {
    /// Every candidate available.
    pub fn new(order: Arc<RankOrder>, pool: &CandidatePool, base_count: usize) -> Self {
        let n = order.len();
        let mut available = vec![Bitset::with_len(n); base_count];
        let category_at: Arc<[CategoryId]> =
            (0..n).map(|pos| pool.get(order.candidate_at(pos)).category).collect();
        for (pos, c) in category_at.iter().enumerate() {
            available[c.index()].set(pos);
        }
        let cursors = available.iter().map(|bs| bs.next_one_at_or_after(0)).collect();
        Self { order, category_at, available, cursors, remaining: n }
    }

    #[inline]
    pub fn order(&self) -> &Arc<RankOrder> {
        &self.order
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_available(&self, id: CandidateId) -> bool {
        let pos = self.order.position_of(id);
        self.available[self.category_at[pos].index()].get(pos)
    }

    /// Take a candidate off the board. Returns false if it was already gone.
    pub fn remove(&mut self, id: CandidateId) -> bool {
        let pos = self.order.position_of(id);
        let c = self.category_at[pos].index();
        let bs = &mut self.available[c];
        if !bs.get(pos) {
            return false;
        }
        bs.clear(pos);
        if self.cursors[c] == Some(pos) {
            self.cursors[c] = bs.next_one_at_or_after(pos + 1);
        }
        self.remaining -= 1;
        true
    }

    /// Best-ranked remaining candidate whose category is in `eligible`.
    pub fn best_available(&self, eligible: CategoryMask) -> Option<CandidateId> {
        eligible
            .iter()
            .filter_map(|c| self.cursors.get(c.index()).copied().flatten())
            .min()
            .map(|pos| self.order.candidate_at(pos))
    }

    /// Remaining candidates of one category, best rank first.
    pub fn available_in_category(&self, c: CategoryId) -> impl Iterator<Item = CandidateId> + '_ {
        let start = self.cursors[c.index()].unwrap_or(self.order.len());
        self.available[c.index()].ones_from(start).map(|pos| self.order.candidate_at(pos))
    }
}
