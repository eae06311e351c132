//! # ADP Optimizer
//!
//! File-facing side of the draft ranking optimizer: reads a season stats
//! CSV, resolves settings, runs [`draft_engine::Optimizer`] and archives the
//! results in a per-run directory.

pub mod artifacts;
pub mod cli;
pub mod ingest;
pub mod settings;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use draft_engine::{
    CandidatePool, OptimizationOutcome, Optimizer, Ranking, validate_category_hierarchy, validate_first_round,
};
use tracing::{info, warn};

pub use cli::Cli;
pub use settings::Settings;

/// Current version of the optimizer
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Violation counts of the final ranking checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RankingChecks {
    pub hierarchy_violations: usize,
    pub first_round_violations: usize,
}

impl RankingChecks {
    pub fn passed(&self) -> bool {
        self.hierarchy_violations == 0 && self.first_round_violations == 0
    }
}

/// What a finished run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: OptimizationOutcome,
    pub checks: RankingChecks,
    pub run_dir: Option<PathBuf>,
}

impl RunSummary {
    pub fn converged(&self) -> bool {
        self.outcome.did_converge()
    }

    /// Converged and the final ranking passes every check.
    pub fn passed(&self) -> bool {
        self.converged() && self.checks.passed()
    }
}

/// Run the hierarchy and first-round checks on the final ranking, logging each violation.
pub fn check_ranking(settings: &Settings, pool: &CandidatePool, ranking: &Ranking) -> RankingChecks {
    let num_teams = settings.league.num_teams;

    let hierarchy = validate_category_hierarchy(ranking, pool);
    for v in &hierarchy {
        warn!("Hierarchy violation: {}", v.describe(pool));
    }
    let first_round = validate_first_round(ranking, pool, num_teams, &settings.validation.first_round);
    for v in &first_round {
        warn!("First round violation: {}", v.describe(pool, num_teams));
    }

    let checks = RankingChecks { hierarchy_violations: hierarchy.len(), first_round_violations: first_round.len() };
    if checks.passed() {
        info!("Final ranking passed hierarchy and first round checks");
    }
    checks
}

/// Load candidates, optimize, and write outputs.
pub fn run(settings: &Settings, data_file: &Path, output: Option<&Path>) -> Result<RunSummary> {
    let (records, _) = ingest::load_candidates(data_file, &settings.ingest, &settings.categories())?;
    let optimizer = Optimizer::new(&records, settings.league.clone(), settings.optimizer.clone())
        .context("Invalid league or optimizer settings")?;

    let seed = optimizer.seed()?;
    let outcome = optimizer.run_from(seed.ranking.clone()).context("Optimization failed")?;
    info!(
        "Optimization finished after {} iterations (converged: {})",
        outcome.iteration_count(),
        outcome.did_converge()
    );
    let checks = check_ranking(settings, optimizer.pool(), &outcome.ranking);

    if let Some(path) = output {
        artifacts::write_final_adp(path, &optimizer, &outcome)?;
        info!("Wrote final ADP to {}", path.display());
    }

    let run_dir = if settings.artifacts.enabled {
        let now = Local::now();
        let dir = artifacts::RunDirectory::create(
            &settings.artifacts.dir,
            settings.optimizer.learning_rate,
            settings.optimizer.max_iterations,
            now,
        )?;
        artifacts::write_final_adp(&dir.file(artifacts::FINAL_ADP_FILE), &optimizer, &outcome)?;
        artifacts::write_initial_vbr(&dir.file(artifacts::INITIAL_VBR_FILE), &optimizer, &seed)?;
        artifacts::write_convergence_history(&dir.file(artifacts::CONVERGENCE_FILE), &outcome)?;
        artifacts::write_final_regrets(&dir.file(artifacts::REGRETS_FILE), &optimizer, &outcome)?;
        artifacts::write_team_scores(&dir.file(artifacts::TEAM_SCORES_FILE), &optimizer, &outcome)?;
        artifacts::write_run_parameters(
            &dir.file(artifacts::PARAMETERS_FILE),
            &artifacts::RunParameters {
                run_id: &dir.id,
                timestamp: now,
                data_file,
                candidates: optimizer.pool().len(),
                iterations: outcome.iteration_count(),
                converged: outcome.did_converge(),
                final_position_changes: outcome.position_changes().last().copied(),
                hierarchy_violations: checks.hierarchy_violations,
                first_round_violations: checks.first_round_violations,
                passed: outcome.did_converge() && checks.passed(),
                settings,
            },
        )?;
        info!("Artifacts archived in {}", dir.path.display());
        Some(dir.path)
    } else {
        None
    };

    Ok(RunSummary { outcome, checks, run_dir })
}
