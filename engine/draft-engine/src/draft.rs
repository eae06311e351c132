//! Greedy snake-draft simulation.
//!
//! A [`DraftState`] is everything needed to continue a draft: team rosters,
//! the availability board, the pick log and the next pick index. It is plain
//! owned data, so a counterfactual replay clones the state at a pick boundary
//! and runs forward on its own copy.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::board::RankingBoard;
use crate::error::{DraftError, Result};
use crate::pool::CandidatePool;
use crate::ranking::RankOrder;
use crate::roster::{SlotTable, TeamState};
use crate::types::{CandidateId, PickIdx, TeamIdx};

/// Team on the clock for every pick, generated once per league.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickOrder {
    teams: Vec<TeamIdx>,
    num_teams: usize,
    rounds: usize,
}

impl PickOrder {
    /// Round-robin order reversed every other round.
    pub fn snake(num_teams: usize, rounds: usize) -> Self {
        let mut teams = Vec::with_capacity(num_teams * rounds);
        for round in 0..rounds {
            if round % 2 == 0 {
                teams.extend(0..num_teams);
            } else {
                teams.extend((0..num_teams).rev());
            }
        }
        Self { teams, num_teams, rounds }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    #[inline]
    pub fn num_teams(&self) -> usize {
        self.num_teams
    }

    #[inline]
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    #[inline]
    pub fn team_for(&self, pick: PickIdx) -> TeamIdx {
        self.teams[pick]
    }

    /// Zero-based round of a pick.
    #[inline]
    pub fn round_of(&self, pick: PickIdx) -> usize {
        pick / self.num_teams
    }

    pub fn as_slice(&self) -> &[TeamIdx] {
        &self.teams
    }
}

/// One entry of the draft log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickRecord {
    pub pick: PickIdx,
    pub team: TeamIdx,
    pub candidate: CandidateId,
}

/// Where a drafted candidate went, with 1-based round and overall pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickDetail {
    pub candidate: CandidateId,
    pub team: TeamIdx,
    pub round: u32,
    pub overall: u32,
}

/// What a pick does when the team on the clock has nobody eligible left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exhaustion {
    Fail,
    /// End the draft at this pick and leave the remaining slots empty. Only
    /// counterfactual replays do this: with the pool exactly covering the
    /// slots, removing one candidate leaves some team one short.
    Stop,
}

#[derive(Debug, Clone)]
pub struct DraftState {
    teams: Vec<TeamState>,
    board: RankingBoard,
    log: Vec<PickRecord>,
    next_pick: PickIdx,
    stopped_at: Option<PickIdx>,
}

impl DraftState {
    #[inline]
    pub fn teams(&self) -> &[TeamState] {
        &self.teams
    }

    #[inline]
    pub fn board(&self) -> &RankingBoard {
        &self.board
    }

    #[inline]
    pub fn log(&self) -> &[PickRecord] {
        &self.log
    }

    /// Index of the pick about to be made.
    #[inline]
    pub fn next_pick(&self) -> PickIdx {
        self.next_pick
    }

    /// Pick at which a replay ran out of eligible candidates and ended early.
    #[inline]
    pub fn stopped_at(&self) -> Option<PickIdx> {
        self.stopped_at
    }

    pub fn team_value(&self, team: TeamIdx, pool: &CandidatePool) -> f64 {
        self.teams[team].value(pool)
    }

    pub fn team_totals(&self, pool: &CandidatePool) -> Vec<f64> {
        self.teams.iter().map(|t| t.value(pool)).collect()
    }
}

/// A full draft run to completion.
#[derive(Debug, Clone)]
pub struct CompletedDraft {
    state: DraftState,
    totals: Vec<f64>,
}

impl CompletedDraft {
    #[inline]
    pub fn state(&self) -> &DraftState {
        &self.state
    }

    #[inline]
    pub fn log(&self) -> &[PickRecord] {
        &self.state.log
    }

    #[inline]
    pub fn order(&self) -> &Arc<RankOrder> {
        self.state.board.order()
    }

    /// Final value per team, indexed by team.
    #[inline]
    pub fn totals(&self) -> &[f64] {
        &self.totals
    }

    pub fn pick_details(&self, pick_order: &PickOrder) -> Vec<PickDetail> {
        self.state
            .log
            .iter()
            .map(|p| PickDetail {
                candidate: p.candidate,
                team: p.team,
                round: pick_order.round_of(p.pick) as u32 + 1,
                overall: p.pick as u32 + 1,
            })
            .collect()
    }
}

/// Runs drafts over a fixed pool, slot table and pick order.
#[derive(Debug, Clone, Copy)]
pub struct DraftEngine<'a> {
    pool: &'a CandidatePool,
    table: &'a SlotTable,
    pick_order: &'a PickOrder,
}

impl<'a> DraftEngine<'a> {
    pub fn new(pool: &'a CandidatePool, table: &'a SlotTable, pick_order: &'a PickOrder) -> Self {
        Self { pool, table, pick_order }
    }

    #[inline]
    pub fn pool(&self) -> &'a CandidatePool {
        self.pool
    }

    #[inline]
    pub fn pick_order(&self) -> &'a PickOrder {
        self.pick_order
    }

    /// Empty rosters, every candidate available.
    pub fn initial_state(&self, order: Arc<RankOrder>) -> DraftState {
        DraftState {
            teams: (0..self.pick_order.num_teams()).map(|t| TeamState::new(t, self.table)).collect(),
            board: RankingBoard::new(order, self.pool, self.table.base_count()),
            log: Vec::with_capacity(self.pick_order.len()),
            next_pick: 0,
            stopped_at: None,
        }
    }

    pub fn simulate_full(&self, order: Arc<RankOrder>) -> Result<CompletedDraft> {
        let mut state = self.initial_state(order);
        while state.next_pick < self.pick_order.len() {
            if let Some(p) = self.step(&mut state, Exhaustion::Fail)? {
                debug!(
                    "Pick {}: team {} takes {}",
                    p.pick + 1,
                    p.team + 1,
                    self.pool.get(p.candidate).name
                );
            }
        }
        let totals = state.team_totals(self.pool);
        Ok(CompletedDraft { state, totals })
    }

    /// Continue a draft from `snapshot` to the end, with `excluded` taken off
    /// the board first. The replay ends at the first pick whose team has
    /// nobody eligible left; later picks are not made.
    pub fn simulate_suffix(&self, mut snapshot: DraftState, excluded: Option<CandidateId>) -> Result<DraftState> {
        if let Some(id) = excluded {
            snapshot.board.remove(id);
        }
        while snapshot.next_pick < self.pick_order.len() {
            if self.step(&mut snapshot, Exhaustion::Stop)?.is_none() {
                let pick = snapshot.next_pick;
                warn!(
                    "Replay stopped at pick {}: team {} has no eligible candidate",
                    pick + 1,
                    self.pick_order.team_for(pick) + 1
                );
                snapshot.stopped_at = Some(pick);
                break;
            }
        }
        Ok(snapshot)
    }

    /// Make the greedy pick for the team on the clock.
    pub fn make_pick(&self, state: &mut DraftState) -> Result<PickRecord> {
        if state.next_pick >= self.pick_order.len() {
            return Err(DraftError::InvalidPick { pick: state.next_pick, len: self.pick_order.len() });
        }
        match self.step(state, Exhaustion::Fail)? {
            Some(p) => Ok(p),
            None => Err(self.no_eligible(state.next_pick)),
        }
    }

    /// Record a known pick for the team on the clock without searching.
    pub fn apply_pick(&self, state: &mut DraftState, candidate: CandidateId) -> Result<PickRecord> {
        let pick = state.next_pick;
        if pick >= self.pick_order.len() {
            return Err(DraftError::InvalidPick { pick, len: self.pick_order.len() });
        }
        let team = self.pick_order.team_for(pick);
        let category = self.pool.get(candidate).category;
        if !state.board.is_available(candidate) || state.teams[team].assign(self.table, candidate, category).is_none()
        {
            return Err(self.no_eligible(pick));
        }
        state.board.remove(candidate);
        let record = PickRecord { pick, team, candidate };
        state.log.push(record);
        state.next_pick += 1;
        Ok(record)
    }

    /// State immediately before pick `pick` of a completed draft, rebuilt by
    /// replaying its log.
    pub fn snapshot_before(&self, draft: &CompletedDraft, pick: PickIdx) -> Result<DraftState> {
        let log = draft.log();
        if pick >= log.len() {
            return Err(DraftError::InvalidPick { pick, len: log.len() });
        }
        let mut state = self.initial_state(Arc::clone(draft.order()));
        for p in &log[..pick] {
            self.apply_pick(&mut state, p.candidate)?;
        }
        Ok(state)
    }

    fn step(&self, state: &mut DraftState, on_empty: Exhaustion) -> Result<Option<PickRecord>> {
        let pick = state.next_pick;
        let team = self.pick_order.team_for(pick);
        let eligible = state.teams[team].eligible(self.table);
        match state.board.best_available(eligible) {
            Some(candidate) => self.apply_pick(state, candidate).map(Some),
            None => match on_empty {
                Exhaustion::Fail => Err(self.no_eligible(pick)),
                Exhaustion::Stop => Ok(None),
            },
        }
    }

    fn no_eligible(&self, pick: PickIdx) -> DraftError {
        DraftError::NoEligibleCandidate { pick, team: self.pick_order.team_for(pick) }
    }
}
