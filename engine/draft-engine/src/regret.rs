//! Counterfactual regret of every pick in a completed draft.

use std::collections::BTreeMap;
use std::sync::Arc;

use rayon::prelude::*;
use tracing::debug;

use crate::config::PenaltyConfig;
use crate::draft::{CompletedDraft, DraftEngine, DraftState, PickRecord};
use crate::error::Result;
use crate::pool::CandidatePool;
use crate::types::{CandidateId, PickIdx, TeamIdx};

/// Regret per drafted candidate. Undrafted candidates have no entry.
pub type RegretMap = BTreeMap<CandidateId, f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct PickRegret {
    pub pick: PickIdx,
    pub team: TeamIdx,
    pub candidate: CandidateId,
    pub original_total: f64,
    pub counterfactual_total: f64,
    /// Same-category candidate with a strictly higher average that was still available.
    pub passed_over: Option<CandidateId>,
    /// Value after the hierarchy penalty, which replaces the raw delta on a violation.
    pub regret: f64,
}

impl PickRegret {
    /// `counterfactual_total - original_total`
    #[inline]
    pub fn delta(&self) -> f64 {
        self.counterfactual_total - self.original_total
    }

    #[inline]
    pub fn is_violation(&self) -> bool {
        self.passed_over.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegretReport {
    pub picks: Vec<PickRegret>,
    pub regrets: RegretMap,
}

impl RegretReport {
    pub fn violations(&self) -> usize {
        self.picks.iter().filter(|p| p.is_violation()).count()
    }
}

/// Largest ordinary regret magnitude seen so far in a run. Owned by the run
/// context and threaded through every evaluation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RunningMax(f64);

impl RunningMax {
    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }

    #[inline]
    fn observe(&mut self, delta: f64) {
        self.0 = self.0.max(delta.abs());
    }
}

pub struct RegretEvaluator<'a> {
    engine: DraftEngine<'a>,
    penalty: PenaltyConfig,
    parallel: bool,
}

impl<'a> RegretEvaluator<'a> {
    pub fn new(engine: DraftEngine<'a>, penalty: PenaltyConfig, parallel: bool) -> Self {
        Self { engine, penalty, parallel }
    }

    /// Replay the rest of the draft once per pick with that pick's candidate
    /// removed, then apply the hierarchy penalty in pick order.
    pub fn evaluate(&self, draft: &CompletedDraft, running_max: &mut RunningMax) -> Result<RegretReport> {
        let snapshots = self.pre_pick_snapshots(draft)?;
        let log = draft.log();

        let mut picks: Vec<PickRegret> = if self.parallel {
            snapshots
                .into_par_iter()
                .zip(log.par_iter())
                .map(|(snap, record)| self.replay(draft, snap, *record))
                .collect::<Result<_>>()?
        } else {
            snapshots
                .into_iter()
                .zip(log)
                .map(|(snap, record)| self.replay(draft, snap, *record))
                .collect::<Result<_>>()?
        };

        let mut regrets = RegretMap::new();
        for p in &mut picks {
            running_max.observe(p.delta());
            if p.is_violation() {
                p.regret = match self.penalty {
                    PenaltyConfig::RunningMax { floor } => running_max.get().max(floor),
                    PenaltyConfig::Fixed { value } => value,
                };
            }
            regrets.insert(p.candidate, p.regret);
        }
        Ok(RegretReport { picks, regrets })
    }

    fn pre_pick_snapshots(&self, draft: &CompletedDraft) -> Result<Vec<DraftState>> {
        let mut state = self.engine.initial_state(Arc::clone(draft.order()));
        let mut snapshots = Vec::with_capacity(draft.log().len());
        for p in draft.log() {
            snapshots.push(state.clone());
            self.engine.apply_pick(&mut state, p.candidate)?;
        }
        Ok(snapshots)
    }

    fn replay(&self, draft: &CompletedDraft, snapshot: DraftState, record: PickRecord) -> Result<PickRegret> {
        let pool = self.engine.pool();
        let passed_over = better_in_category(pool, &snapshot, record.candidate);
        let cf = self.engine.simulate_suffix(snapshot, Some(record.candidate))?;

        let original_total = draft.totals()[record.team];
        let counterfactual_total = cf.team_value(record.team, pool);
        let delta = counterfactual_total - original_total;
        debug!(
            "Regret pick {}: {} delta {:.3}{}",
            record.pick + 1,
            pool.get(record.candidate).name,
            delta,
            if passed_over.is_some() { " (hierarchy violation)" } else { "" }
        );
        Ok(PickRegret {
            pick: record.pick,
            team: record.team,
            candidate: record.candidate,
            original_total,
            counterfactual_total,
            passed_over,
            regret: delta,
        })
    }
}

/// Best-average candidate of the same category still on the board, if it beats `picked`.
fn better_in_category(pool: &CandidatePool, snapshot: &DraftState, picked: CandidateId) -> Option<CandidateId> {
    let pick = pool.get(picked);
    snapshot
        .board()
        .available_in_category(pick.category)
        .filter(|&id| pool.get(id).avg > pick.avg)
        .max_by(|&a, &b| pool.get(a).avg.total_cmp(&pool.get(b).avg).then_with(|| b.cmp(&a)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::PickOrder;
    use crate::ranking::{RankOrder, Ranking};
    use crate::test_support::{exact_pool, small_pool};

    fn setup() -> (CandidatePool, crate::roster::SlotTable, PickOrder) {
        let (pool, table, league) = small_pool();
        let order = PickOrder::snake(league.num_teams as usize, league.rounds() as usize);
        (pool, table, order)
    }

    fn ranked_by_avg(pool: &CandidatePool) -> Arc<RankOrder> {
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.sort_by(|&a, &b| pool.get(b).avg.total_cmp(&pool.get(a).avg));
        Arc::new(RankOrder::from_ranking(&Ranking::dense_from_order(&ids), pool))
    }

    #[test]
    fn one_entry_per_drafted_candidate() {
        let (pool, table, order) = setup();
        let engine = DraftEngine::new(&pool, &table, &order);
        let draft = engine.simulate_full(ranked_by_avg(&pool)).unwrap();
        let eval = RegretEvaluator::new(engine, PenaltyConfig::default(), false);
        let report = eval.evaluate(&draft, &mut RunningMax::default()).unwrap();

        assert_eq!(report.picks.len(), draft.log().len());
        assert_eq!(report.regrets.len(), draft.log().len());
        for p in draft.log() {
            assert!(report.regrets.contains_key(&p.candidate));
        }
        // ranked by average: nobody is ever passed over within a category
        assert_eq!(report.violations(), 0);
    }

    #[test]
    fn parallel_and_sequential_are_identical() {
        let (pool, table, order) = setup();
        let engine = DraftEngine::new(&pool, &table, &order);
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.reverse();
        let ro = Arc::new(RankOrder::from_ranking(&Ranking::dense_from_order(&ids), &pool));
        let draft = engine.simulate_full(ro).unwrap();

        let mut seq_max = RunningMax::default();
        let mut par_max = RunningMax::default();
        let seq = RegretEvaluator::new(engine, PenaltyConfig::default(), false).evaluate(&draft, &mut seq_max).unwrap();
        let par = RegretEvaluator::new(engine, PenaltyConfig::default(), true).evaluate(&draft, &mut par_max).unwrap();
        assert_eq!(seq, par);
        assert_eq!(seq_max, par_max);
    }

    #[test]
    fn reversed_ranking_triggers_fixed_penalty() {
        let (pool, table, order) = setup();
        let engine = DraftEngine::new(&pool, &table, &order);
        // worst average first: every early pick passes over a better teammate
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.sort_by(|&a, &b| pool.get(a).avg.total_cmp(&pool.get(b).avg));
        let draft = engine.simulate_full(Arc::new(RankOrder::from_ranking(&Ranking::dense_from_order(&ids), &pool))).unwrap();

        let eval = RegretEvaluator::new(engine, PenaltyConfig::Fixed { value: 42.0 }, false);
        let report = eval.evaluate(&draft, &mut RunningMax::default()).unwrap();
        assert!(report.violations() > 0);
        for p in report.picks.iter().filter(|p| p.is_violation()) {
            assert_eq!(p.regret, 42.0);
            let better = p.passed_over.unwrap();
            assert!(pool.get(better).avg > pool.get(p.candidate).avg);
            assert_eq!(pool.get(better).category, pool.get(p.candidate).category);
        }
    }

    #[test]
    fn running_max_penalty_never_below_floor() {
        let (pool, table, order) = setup();
        let engine = DraftEngine::new(&pool, &table, &order);
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.sort_by(|&a, &b| pool.get(a).avg.total_cmp(&pool.get(b).avg));
        let draft = engine.simulate_full(Arc::new(RankOrder::from_ranking(&Ranking::dense_from_order(&ids), &pool))).unwrap();

        let eval = RegretEvaluator::new(engine, PenaltyConfig::RunningMax { floor: 1000.0 }, true);
        let mut max = RunningMax::default();
        let report = eval.evaluate(&draft, &mut max).unwrap();
        for p in report.picks.iter().filter(|p| p.is_violation()) {
            assert_eq!(p.regret, 1000.0);
        }
        // the running max tracks ordinary deltas only
        let largest = report.picks.iter().map(|p| p.delta().abs()).fold(0.0, f64::max);
        assert_eq!(max.get(), largest);
    }

    fn worst_first(pool: &CandidatePool) -> Arc<RankOrder> {
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.sort_by(|&a, &b| pool.get(a).avg.total_cmp(&pool.get(b).avg));
        Arc::new(RankOrder::from_ranking(&Ranking::dense_from_order(&ids), pool))
    }

    #[test]
    fn running_max_penalty_is_largest_delta_so_far() {
        let (pool, table, order) = setup();
        let engine = DraftEngine::new(&pool, &table, &order);
        let draft = engine.simulate_full(worst_first(&pool)).unwrap();

        let eval = RegretEvaluator::new(engine, PenaltyConfig::RunningMax { floor: 0.0 }, false);
        let mut max = RunningMax::default();
        let report = eval.evaluate(&draft, &mut max).unwrap();
        assert!(report.violations() > 0);

        let mut so_far = 0.0f64;
        for p in &report.picks {
            so_far = so_far.max(p.delta().abs());
            if p.is_violation() {
                assert_eq!(p.regret, so_far, "pick {}", p.pick);
            } else {
                assert_eq!(p.regret, p.delta());
            }
        }
        assert_eq!(max.get(), so_far);

        // the maximum carries into the next evaluation of the run
        let again = eval.evaluate(&draft, &mut max).unwrap();
        for p in again.picks.iter().filter(|p| p.is_violation()) {
            assert_eq!(p.regret, so_far);
        }
        assert_eq!(max.get(), so_far);
    }

    #[test]
    fn replay_that_runs_dry_counts_only_picks_made() {
        let (pool, table, league) = exact_pool();
        let order = PickOrder::snake(league.num_teams as usize, league.rounds() as usize);
        let engine = DraftEngine::new(&pool, &table, &order);
        let ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        let draft = engine.simulate_full(Arc::new(RankOrder::from_ranking(&Ranking::dense_from_order(&ids), &pool))).unwrap();

        let report = RegretEvaluator::new(engine, PenaltyConfig::default(), false)
            .evaluate(&draft, &mut RunningMax::default())
            .unwrap();
        let first = &report.picks[0];
        assert_eq!(first.original_total, 37.0);
        // the replay ends at pick 4, so team 1 never gets B3 back
        assert_eq!(first.counterfactual_total, 20.0);
        assert_eq!(first.regret, -17.0);
        assert!(!first.is_violation());
    }
}
