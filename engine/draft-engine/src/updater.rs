//! Regret-driven rank update

use tracing::debug;

use crate::pool::CandidatePool;
use crate::ranking::Ranking;
use crate::regret::RegretMap;
use crate::types::CandidateId;

#[derive(Debug, Clone, PartialEq)]
pub struct RankUpdate {
    pub ranking: Ranking,
    /// Candidates whose position changed in the hierarchy repair
    pub repaired: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankUpdater {
    learning_rate: f64,
}

impl RankUpdater {
    pub fn new(learning_rate: f64) -> Self {
        Self { learning_rate }
    }

    /// `old + lr * regret` for drafted candidates, then re-linearize and repair.
    pub fn update(&self, prev: &Ranking, regrets: &RegretMap, pool: &CandidatePool) -> RankUpdate {
        let mut raw = prev.ranks().to_vec();
        for (id, regret) in regrets {
            raw[id.index()] += self.learning_rate * regret;
        }
        let mut ranking = relinearize(&raw, pool);
        let repaired = enforce_category_hierarchy(&mut ranking, pool);
        if repaired > 0 {
            debug!("Hierarchy repair moved {repaired} candidates");
        }
        RankUpdate { ranking, repaired }
    }
}

/// Dense ranks 1..N by raw value ascending, then average descending, then identity.
pub fn relinearize(raw: &[f64], pool: &CandidatePool) -> Ranking {
    let mut ids: Vec<CandidateId> = (0..raw.len() as u32).map(CandidateId).collect();
    ids.sort_by(|&a, &b| {
        let (ca, cb) = (pool.get(a), pool.get(b));
        raw[a.index()]
            .total_cmp(&raw[b.index()])
            .then_with(|| cb.avg.total_cmp(&ca.avg))
            .then_with(|| ca.name.cmp(&cb.name))
    });
    Ranking::dense_from_order(&ids)
}

/// Within each category, hand the category's rank positions to its members in
/// descending average order. The set of positions a category holds is
/// unchanged, so density survives. Returns how many candidates moved.
pub fn enforce_category_hierarchy(ranking: &mut Ranking, pool: &CandidatePool) -> usize {
    let mut by_category: Vec<Vec<CandidateId>> = Vec::new();
    for c in pool.iter() {
        let idx = c.category.index();
        if by_category.len() <= idx {
            by_category.resize_with(idx + 1, Vec::new);
        }
        by_category[idx].push(c.id);
    }

    let mut ranks = ranking.ranks().to_vec();
    let mut moved = 0;
    for mut members in by_category {
        let mut slots: Vec<f64> = members.iter().map(|id| ranks[id.index()]).collect();
        slots.sort_by(f64::total_cmp);
        members.sort_by(|&a, &b| {
            let (ca, cb) = (pool.get(a), pool.get(b));
            cb.avg.total_cmp(&ca.avg).then_with(|| ca.name.cmp(&cb.name))
        });
        for (id, slot) in members.into_iter().zip(slots) {
            if ranks[id.index()] != slot {
                ranks[id.index()] = slot;
                moved += 1;
            }
        }
    }
    *ranking = Ranking::from_ranks(ranks);
    moved
}
