//! Run directory and output files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use draft_engine::{OptimizationOutcome, Optimizer, Seed};
use serde::Serialize;
use tracing::info;

use crate::settings::Settings;

pub const FINAL_ADP_FILE: &str = "final_adp.csv";
pub const INITIAL_VBR_FILE: &str = "initial_vbr_adp.csv";
pub const CONVERGENCE_FILE: &str = "convergence_history.csv";
pub const REGRETS_FILE: &str = "final_regrets.csv";
pub const TEAM_SCORES_FILE: &str = "team_scores.csv";
pub const PARAMETERS_FILE: &str = "run_parameters.json";

/// `{base}/run_{YYYYmmdd_HHMMSS}_lr{lr}_iter{max}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunDirectory {
    pub id: String,
    pub path: PathBuf,
}

impl RunDirectory {
    pub fn create(base: &Path, learning_rate: f64, max_iterations: u32, now: DateTime<Local>) -> Result<Self> {
        let id = format!("{}_lr{}_iter{}", now.format("%Y%m%d_%H%M%S"), learning_rate, max_iterations);
        let path = base.join(format!("run_{id}"));
        std::fs::create_dir_all(&path).with_context(|| format!("Failed to create run directory {}", path.display()))?;
        info!("Created run directory: {}", path.display());
        Ok(Self { id, path })
    }

    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

#[derive(Serialize)]
struct FinalAdpRow<'a> {
    name: &'a str,
    position: &'a str,
    team: &'a str,
    avg: f64,
    total: f64,
    adp: f64,
    #[serde(rename = "Team")]
    draft_team: usize,
    #[serde(rename = "Round")]
    round: u32,
    draft_pick: u32,
}

#[derive(Serialize)]
struct InitialVbrRow<'a> {
    name: &'a str,
    position: &'a str,
    team: &'a str,
    avg: f64,
    total: f64,
    vbr: f64,
    adp: f64,
}

#[derive(Serialize)]
struct RegretRow<'a> {
    player_name: &'a str,
    regret_score: f64,
    final_adp: f64,
}

#[derive(Serialize)]
struct TeamScoreRow {
    team_id: usize,
    total_score: f64,
    avg_per_week: f64,
}

#[derive(Serialize)]
struct ConvergenceRow {
    iteration: usize,
    position_changes: u64,
}

#[derive(Debug, Serialize)]
pub struct RunParameters<'a> {
    pub run_id: &'a str,
    pub timestamp: DateTime<Local>,
    pub data_file: &'a Path,
    pub candidates: usize,
    pub iterations: u32,
    pub converged: bool,
    pub final_position_changes: Option<u64>,
    pub hierarchy_violations: usize,
    pub first_round_violations: usize,
    /// Converged with no check violations
    pub passed: bool,
    pub settings: &'a Settings,
}

/// Final ranking with where each candidate went in the final draft. Only the
/// first `total_picks` rows by rank are written; undrafted rows carry zeros.
pub fn write_final_adp(path: &Path, optimizer: &Optimizer, outcome: &OptimizationOutcome) -> Result<()> {
    let pool = optimizer.pool();
    let mut placed = vec![None; pool.len()];
    for d in outcome.pick_details(optimizer.pick_order()) {
        placed[d.candidate.index()] = Some(d);
    }

    let mut writer = csv_writer(path)?;
    for id in outcome.ranking.draft_order(pool).into_iter().take(optimizer.league().total_picks()) {
        let c = pool.get(id);
        let (draft_team, round, draft_pick) =
            placed[id.index()].map_or((0, 0, 0), |d| (d.team + 1, d.round, d.overall));
        writer.serialize(FinalAdpRow {
            name: &c.name,
            position: &c.position,
            team: &c.team,
            avg: c.avg,
            total: c.total,
            adp: outcome.ranking.rank(id),
            draft_team,
            round,
            draft_pick,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_initial_vbr(path: &Path, optimizer: &Optimizer, seed: &Seed) -> Result<()> {
    let pool = optimizer.pool();
    let mut writer = csv_writer(path)?;
    for row in &seed.rows {
        let c = pool.get(row.candidate);
        writer.serialize(InitialVbrRow {
            name: &c.name,
            position: &c.position,
            team: &c.team,
            avg: c.avg,
            total: c.total,
            vbr: row.vbr,
            adp: row.rank as f64,
        })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_convergence_history(path: &Path, outcome: &OptimizationOutcome) -> Result<()> {
    let mut writer = csv_writer(path)?;
    for (i, changes) in outcome.position_changes().into_iter().enumerate() {
        writer.serialize(ConvergenceRow { iteration: i + 1, position_changes: changes })?;
    }
    writer.flush()?;
    Ok(())
}

/// Last iteration's regret per drafted candidate, by final rank.
pub fn write_final_regrets(path: &Path, optimizer: &Optimizer, outcome: &OptimizationOutcome) -> Result<()> {
    let pool = optimizer.pool();
    let mut rows: Vec<_> = outcome
        .final_regrets()
        .into_iter()
        .flatten()
        .map(|(&id, &regret)| (id, regret, outcome.ranking.rank(id)))
        .collect();
    rows.sort_by(|a, b| a.2.total_cmp(&b.2));

    let mut writer = csv_writer(path)?;
    for (id, regret_score, final_adp) in rows {
        writer.serialize(RegretRow { player_name: &pool.get(id).name, regret_score, final_adp })?;
    }
    writer.flush()?;
    Ok(())
}

/// `total_score` is the team value under the league's score field;
/// `avg_per_week` always sums the drafted candidates' averages.
pub fn write_team_scores(path: &Path, optimizer: &Optimizer, outcome: &OptimizationOutcome) -> Result<()> {
    let pool = optimizer.pool();
    let teams = outcome.final_draft.state().teams();
    let mut writer = csv_writer(path)?;
    for (i, &total) in outcome.team_totals().iter().enumerate() {
        let avg_per_week = teams[i].picks().iter().map(|a| pool.get(a.candidate).avg).sum();
        writer.serialize(TeamScoreRow { team_id: i + 1, total_score: total, avg_per_week })?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_run_parameters(path: &Path, params: &RunParameters<'_>) -> Result<()> {
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut out, params).context("Failed to serialize run parameters")?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

fn csv_writer(path: &Path) -> Result<csv::Writer<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))
}
