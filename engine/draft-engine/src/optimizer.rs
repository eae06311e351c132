//! The regret optimization loop.
//!
//! [`Optimizer`] owns everything that is fixed for a run (pool, slot table,
//! pick order and configuration). Everything that changes between iterations
//! lives in a run context created per call to [`Optimizer::run_from`], so
//! one optimizer can serve any number of independent runs.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{LeagueConfig, OptimizerConfig, SeedConfig};
use crate::convergence::{ConvergenceMonitor, RunState};
use crate::draft::{CompletedDraft, DraftEngine, PickDetail, PickOrder};
use crate::error::{DraftError, Result};
use crate::pool::CandidatePool;
use crate::ranking::{RankMove, RankOrder, Ranking, rank_moves};
use crate::regret::{PickRegret, RegretEvaluator, RegretMap, RunningMax};
use crate::roster::SlotTable;
use crate::seed::{Seed, explicit_seed, perturb, vbr_seed};
use crate::types::CandidateRecord;
use crate::updater::{RankUpdater, relinearize};
use crate::validation::validate_category_hierarchy;

/// How many of the largest rank moves are logged per iteration.
const LOGGED_MOVES: usize = 10;

/// One completed iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// 1-based
    pub iteration: u32,
    pub position_changes: u64,
    pub regrets: RegretMap,
    pub moves: Vec<RankMove>,
    pub violations_penalized: usize,
    pub hierarchy_repairs: usize,
}

/// Result of a finished run, converged or not.
#[derive(Debug, Clone)]
pub struct OptimizationOutcome {
    pub ranking: Ranking,
    pub state: RunState,
    pub iterations: Vec<IterationRecord>,
    /// Draft under the final ranking
    pub final_draft: CompletedDraft,
    /// Per-pick regret of the last iteration
    pub final_picks: Vec<PickRegret>,
}

impl OptimizationOutcome {
    #[inline]
    pub fn did_converge(&self) -> bool {
        self.state == RunState::Converged
    }

    pub fn iteration_count(&self) -> u32 {
        self.iterations.len() as u32
    }

    pub fn position_changes(&self) -> Vec<u64> {
        self.iterations.iter().map(|i| i.position_changes).collect()
    }

    pub fn regret_history(&self) -> Vec<&RegretMap> {
        self.iterations.iter().map(|i| &i.regrets).collect()
    }

    /// Regret map of the last iteration.
    pub fn final_regrets(&self) -> Option<&RegretMap> {
        self.iterations.last().map(|i| &i.regrets)
    }

    pub fn team_totals(&self) -> &[f64] {
        self.final_draft.totals()
    }

    /// Drafted position of each candidate in the final draft.
    pub fn pick_details(&self, pick_order: &PickOrder) -> Vec<PickDetail> {
        self.final_draft.pick_details(pick_order)
    }
}

/// Mutable per-run state, passed between phases of an iteration.
struct RunContext {
    ranking: Ranking,
    monitor: ConvergenceMonitor,
    running_max: RunningMax,
    iterations: Vec<IterationRecord>,
    last_picks: Vec<PickRegret>,
}

pub struct Optimizer {
    league: LeagueConfig,
    config: OptimizerConfig,
    table: SlotTable,
    pool: CandidatePool,
    pick_order: PickOrder,
}

impl Optimizer {
    /// Validate configuration and build the pool. Fails before any simulation.
    pub fn new(records: &[CandidateRecord], league: LeagueConfig, config: OptimizerConfig) -> Result<Self> {
        league.validate()?;
        config.validate(&league)?;
        let table = SlotTable::from_config(&league.roster)?;
        let pool = CandidatePool::new(records, &table, &league)?;
        let pick_order = PickOrder::snake(league.num_teams as usize, league.rounds() as usize);
        Ok(Self { league, config, table, pool, pick_order })
    }

    #[inline]
    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    #[inline]
    pub fn table(&self) -> &SlotTable {
        &self.table
    }

    #[inline]
    pub fn pick_order(&self) -> &PickOrder {
        &self.pick_order
    }

    #[inline]
    pub fn league(&self) -> &LeagueConfig {
        &self.league
    }

    #[inline]
    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn engine(&self) -> DraftEngine<'_> {
        DraftEngine::new(&self.pool, &self.table, &self.pick_order)
    }

    /// Initial ranking from the configured seed strategy, perturbed if requested.
    pub fn seed(&self) -> Result<Seed> {
        let mut seed = match &self.config.seed {
            SeedConfig::Vbr { baselines } => vbr_seed(&self.pool, &self.table, baselines),
            SeedConfig::Explicit { ranks } => explicit_seed(&self.pool, ranks)?,
        };
        if let Some(p) = self.config.perturbation {
            info!("Perturbing seed ranking (factor {}, seed {})", p.factor, p.seed);
            seed.ranking = perturb(&seed.ranking, &self.pool, p);
        }
        Ok(seed)
    }

    pub fn run(&self) -> Result<OptimizationOutcome> {
        let seed = self.seed()?;
        self.run_from(seed.ranking)
    }

    /// Iterate from `initial` until converged or out of budget.
    pub fn run_from(&self, initial: Ranking) -> Result<OptimizationOutcome> {
        if initial.len() != self.pool.len() {
            return Err(DraftError::input(format!(
                "initial ranking covers {} candidates, pool has {}",
                initial.len(),
                self.pool.len()
            )));
        }
        let ranking = if initial.is_dense() { initial } else { relinearize(initial.ranks(), &self.pool) };

        let mut ctx = RunContext {
            ranking,
            monitor: ConvergenceMonitor::new(self.config.max_iterations, self.config.tolerance),
            running_max: RunningMax::default(),
            iterations: Vec::new(),
            last_picks: Vec::new(),
        };
        info!(
            "Starting optimization: {} candidates, {} teams, {} rounds, lr {}, max {} iterations",
            self.pool.len(),
            self.pick_order.num_teams(),
            self.pick_order.rounds(),
            self.config.learning_rate,
            self.config.max_iterations
        );

        while !ctx.monitor.state().is_terminal() {
            self.iterate(&mut ctx)?;
        }

        match ctx.monitor.state() {
            RunState::Converged => info!("Converged after {} iterations", ctx.monitor.iterations()),
            _ => warn!("Stopped after {} iterations without converging", ctx.monitor.iterations()),
        }

        let final_draft = self.engine().simulate_full(Arc::new(RankOrder::from_ranking(&ctx.ranking, &self.pool)))?;
        Ok(OptimizationOutcome {
            ranking: ctx.ranking,
            state: ctx.monitor.state(),
            iterations: ctx.iterations,
            final_draft,
            final_picks: ctx.last_picks,
        })
    }

    fn iterate(&self, ctx: &mut RunContext) -> Result<()> {
        let iteration = ctx.monitor.iterations() + 1;
        let engine = self.engine();

        let draft = engine.simulate_full(Arc::new(RankOrder::from_ranking(&ctx.ranking, &self.pool)))?;
        let report = RegretEvaluator::new(engine, self.config.penalty, self.config.parallel)
            .evaluate(&draft, &mut ctx.running_max)?;
        let update = RankUpdater::new(self.config.learning_rate).update(&ctx.ranking, &report.regrets, &self.pool);

        let violations = validate_category_hierarchy(&update.ranking, &self.pool);
        if !violations.is_empty() {
            warn!("Iteration {iteration}: {} hierarchy violations after repair", violations.len());
            for v in violations.iter().take(3) {
                warn!("  {}", v.describe(&self.pool));
            }
        }

        let position_changes = ctx.ranking.position_changes(&update.ranking);
        let moves = rank_moves(&ctx.ranking, &update.ranking, &self.pool);
        info!(
            "Iteration {iteration}: {position_changes} position changes, {} hierarchy penalties",
            report.violations()
        );
        for m in moves.iter().take(LOGGED_MOVES) {
            debug!("  {} {} -> {}", self.pool.get(m.candidate).name, m.from, m.to);
        }
        if moves.len() > LOGGED_MOVES {
            debug!("  ... and {} more", moves.len() - LOGGED_MOVES);
        }

        ctx.iterations.push(IterationRecord {
            iteration,
            position_changes,
            violations_penalized: report.violations(),
            regrets: report.regrets,
            moves,
            hierarchy_repairs: update.repaired,
        });
        ctx.last_picks = report.picks;
        ctx.ranking = update.ranking;
        ctx.monitor.observe(position_changes);
        Ok(())
    }
}
