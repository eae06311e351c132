//! Draft rankings (ADP) and the rank-ordered index derived from them

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::pool::CandidatePool;
use crate::types::CandidateId;

/// Rank number per candidate, indexed by [`CandidateId`]. Lower = drafted earlier.
#[derive(Debug, Clone, PartialEq)]
pub struct Ranking {
    ranks: Vec<f64>,
}

impl Ranking {
    pub fn from_ranks(ranks: Vec<f64>) -> Self {
        Self { ranks }
    }

    /// Dense ranking: `order[i]` receives rank `i + 1`.
    pub fn dense_from_order(order: &[CandidateId]) -> Self {
        let mut ranks = vec![0.0; order.len()];
        for (pos, id) in order.iter().enumerate() {
            ranks[id.index()] = (pos + 1) as f64;
        }
        Self { ranks }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    #[inline]
    pub fn rank(&self, id: CandidateId) -> f64 {
        self.ranks[id.index()]
    }

    #[inline]
    pub fn ranks(&self) -> &[f64] {
        &self.ranks
    }

    /// Ranks are exactly `{1, ..., N}` with no duplicates.
    pub fn is_dense(&self) -> bool {
        let n = self.ranks.len();
        let mut seen = vec![false; n];
        for &r in &self.ranks {
            if r.fract() != 0.0 || r < 1.0 || r > n as f64 {
                return false;
            }
            let i = r as usize - 1;
            if seen[i] {
                return false;
            }
            seen[i] = true;
        }
        true
    }

    /// Dense integer rank; only meaningful on a dense ranking.
    #[inline]
    pub fn position(&self, id: CandidateId) -> u32 {
        self.ranks[id.index()] as u32
    }

    /// Candidates in draft order: ascending rank, ties by identity.
    pub fn draft_order(&self, pool: &CandidatePool) -> Vec<CandidateId> {
        let mut ids: Vec<CandidateId> = (0..self.ranks.len() as u32).map(CandidateId).collect();
        ids.sort_by(|&a, &b| {
            self.rank(a).total_cmp(&self.rank(b)).then_with(|| pool.get(a).name.cmp(&pool.get(b).name))
        });
        ids
    }

    /// Sum of absolute rank deltas between two dense rankings of the same pool.
    pub fn position_changes(&self, next: &Ranking) -> u64 {
        self.ranks
            .iter()
            .zip(&next.ranks)
            .map(|(a, b)| (*a as i64 - *b as i64).unsigned_abs())
            .sum()
    }

    /// Rank by candidate name, for handing to collaborators.
    pub fn by_name(&self, pool: &CandidatePool) -> BTreeMap<String, f64> {
        pool.iter().map(|c| (c.name.clone(), self.rank(c.id))).collect()
    }
}

/// Candidate whose dense rank moved between two rankings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankMove {
    pub candidate: CandidateId,
    pub from: u32,
    pub to: u32,
}

impl RankMove {
    pub fn distance(&self) -> u32 {
        self.from.abs_diff(self.to)
    }

    /// Moved toward the front of the draft.
    pub fn is_rise(&self) -> bool {
        self.to < self.from
    }
}

/// Every moved candidate, largest moves first, then by identity.
pub fn rank_moves(old: &Ranking, new: &Ranking, pool: &CandidatePool) -> Vec<RankMove> {
    let mut moves: Vec<RankMove> = pool
        .iter()
        .filter_map(|c| {
            let (from, to) = (old.position(c.id), new.position(c.id));
            (from != to).then_some(RankMove { candidate: c.id, from, to })
        })
        .collect();
    moves.sort_by(|a, b| match b.distance().cmp(&a.distance()) {
        Ordering::Equal => pool.get(a.candidate).name.cmp(&pool.get(b.candidate).name),
        o => o,
    });
    moves
}

/// Board position <-> candidate lookup for one ranking.
///
/// Position 0 is the candidate drafted first when unconstrained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankOrder {
    by_position: Vec<CandidateId>,
    position_of: Vec<u32>,
}

impl RankOrder {
    pub fn from_ranking(ranking: &Ranking, pool: &CandidatePool) -> Self {
        let by_position = ranking.draft_order(pool);
        let mut position_of = vec![0u32; by_position.len()];
        for (pos, id) in by_position.iter().enumerate() {
            position_of[id.index()] = pos as u32;
        }
        Self { by_position, position_of }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }

    #[inline]
    pub fn candidate_at(&self, pos: usize) -> CandidateId {
        self.by_position[pos]
    }

    #[inline]
    pub fn position_of(&self, id: CandidateId) -> usize {
        self.position_of[id.index()] as usize
    }

    pub fn as_slice(&self) -> &[CandidateId] {
        &self.by_position
    }
}
