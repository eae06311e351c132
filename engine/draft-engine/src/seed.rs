//! Initial rankings: value-above-baseline, caller-provided, and seeded perturbation.

use std::collections::BTreeMap;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use tracing::debug;

use crate::config::PerturbationConfig;
use crate::error::{DraftError, Result};
use crate::pool::CandidatePool;
use crate::ranking::Ranking;
use crate::roster::SlotTable;
use crate::types::{CandidateId, CategoryId};
use crate::updater::relinearize;

/// One row of the value-above-baseline seed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeedRow {
    pub candidate: CandidateId,
    pub vbr: f64,
    pub rank: u32,
}

/// Seed ranking plus the rows it was derived from (empty for explicit seeds).
#[derive(Debug, Clone, PartialEq)]
pub struct Seed {
    pub ranking: Ranking,
    pub rows: Vec<SeedRow>,
}

/// Baseline per category is the average of its k-th best candidate
/// (1-indexed), or of its worst if it has fewer than k. Categories without a
/// configured k use a zero baseline.
pub fn vbr_seed(pool: &CandidatePool, table: &SlotTable, baselines: &BTreeMap<String, u32>) -> Seed {
    let mut averages: Vec<Vec<f64>> = vec![Vec::new(); table.base_count()];
    for c in pool.iter() {
        averages[c.category.index()].push(c.avg);
    }

    let baseline: Vec<f64> = averages
        .iter_mut()
        .enumerate()
        .map(|(i, avgs)| {
            avgs.sort_by(|a, b| b.total_cmp(a));
            let name = table.base_name(CategoryId(i as u8));
            match baselines.get(name) {
                Some(&k) => avgs.get((k as usize).saturating_sub(1)).or(avgs.last()).copied().unwrap_or(0.0),
                None => 0.0,
            }
        })
        .collect();

    let vbr = |id: CandidateId| {
        let c = pool.get(id);
        c.avg - baseline[c.category.index()]
    };
    let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
    ids.sort_by(|&a, &b| {
        let (ca, cb) = (pool.get(a), pool.get(b));
        vbr(b).total_cmp(&vbr(a)).then_with(|| cb.avg.total_cmp(&ca.avg)).then_with(|| ca.name.cmp(&cb.name))
    });

    let rows = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| SeedRow { candidate: id, vbr: vbr(id), rank: i as u32 + 1 })
        .collect();
    debug!("VBR baselines {:?}", baseline);
    Seed { ranking: Ranking::dense_from_order(&ids), rows }
}

/// Densify a caller-supplied ranking. Every pool candidate must be present.
pub fn explicit_seed(pool: &CandidatePool, ranks: &BTreeMap<String, f64>) -> Result<Seed> {
    if let Some(unknown) = ranks.keys().find(|name| pool.id_of(name).is_none()) {
        return Err(DraftError::input(format!("seed ranking names unknown candidate {unknown}")));
    }
    let mut raw = Vec::with_capacity(pool.len());
    for c in pool.iter() {
        match ranks.get(&c.name) {
            Some(r) if r.is_finite() => raw.push(*r),
            Some(r) => return Err(DraftError::input(format!("seed rank {r} for {} is not finite", c.name))),
            None => return Err(DraftError::input(format!("seed ranking is missing {}", c.name))),
        }
    }
    Ok(Seed { ranking: relinearize(&raw, pool), rows: Vec::new() })
}

/// Scale each rank by `1 + U(-f, f)`, round, clamp at 1, then re-densify by
/// (perturbed, original). Same seed, same output.
pub fn perturb(ranking: &Ranking, pool: &CandidatePool, cfg: PerturbationConfig) -> Ranking {
    if cfg.factor == 0.0 {
        return ranking.clone();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(cfg.seed);
    let order = ranking.draft_order(pool);
    let mut keyed: Vec<(f64, f64, CandidateId)> = order
        .into_iter()
        .map(|id| {
            let r = ranking.rank(id);
            let noise: f64 = rng.gen_range(-cfg.factor..=cfg.factor);
            ((r * (1.0 + noise)).round_ties_even().max(1.0), r, id)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.total_cmp(&b.1)));
    let ids: Vec<CandidateId> = keyed.into_iter().map(|(_, _, id)| id).collect();
    Ranking::dense_from_order(&ids)
}
