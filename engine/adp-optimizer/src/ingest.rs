//! Candidate ingestion from a season stats CSV.
//!
//! Expected columns: `Player`, `Pos`, `Team`, `AVG`, `TTL`. Rows that are
//! incomplete, unparseable, outside the roster's categories or short on
//! periods played are skipped and counted, never fatal.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use draft_engine::CandidateRecord;
use serde::Deserialize;
use tracing::{debug, info};

use crate::settings::IngestConfig;

#[derive(Debug, Deserialize)]
struct StatsRow {
    #[serde(rename = "Player")]
    player: Option<String>,
    #[serde(rename = "Pos")]
    pos: Option<String>,
    #[serde(rename = "Team", default)]
    team: Option<String>,
    #[serde(rename = "AVG")]
    avg: Option<String>,
    #[serde(rename = "TTL")]
    total: Option<String>,
}

/// Row counts by outcome.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    pub rows: usize,
    pub malformed: usize,
    pub other_category: usize,
    pub too_few_weeks: usize,
    pub beyond_top_n: usize,
    pub kept: usize,
}

/// Periods played implied by a total and an average. Zero average means zero.
pub fn weeks_played(avg: f64, total: f64) -> u32 {
    if avg == 0.0 { 0 } else { (total / avg).round_ties_even().max(0.0) as u32 }
}

pub fn load_candidates(
    path: &Path,
    cfg: &IngestConfig,
    categories: &[String],
) -> Result<(Vec<CandidateRecord>, IngestStats)> {
    let file = std::fs::File::open(path).with_context(|| format!("Failed to open stats file: {}", path.display()))?;
    let out = read_candidates(file, cfg, categories)
        .with_context(|| format!("Failed to read stats file: {}", path.display()))?;
    info!("Loaded {} candidates from {} ({} rows read)", out.1.kept, path.display(), out.1.rows);
    Ok(out)
}

pub fn read_candidates<R: Read>(
    reader: R,
    cfg: &IngestConfig,
    categories: &[String],
) -> Result<(Vec<CandidateRecord>, IngestStats)> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).trim(csv::Trim::All).from_reader(reader);
    let mut stats = IngestStats::default();
    let mut records = Vec::new();

    for row in reader.deserialize::<StatsRow>() {
        stats.rows += 1;
        let Ok(row) = row else {
            stats.malformed += 1;
            continue;
        };
        let Some(record) = parse_row(row) else {
            stats.malformed += 1;
            continue;
        };
        if !categories.iter().any(|c| *c == record.position) {
            stats.other_category += 1;
            continue;
        }
        if weeks_played(record.avg, record.total) < cfg.min_weeks {
            stats.too_few_weeks += 1;
            continue;
        }
        records.push(record);
    }

    // stable: equal totals keep file order
    records.sort_by(|a, b| b.total.total_cmp(&a.total));
    if records.len() > cfg.top_n {
        stats.beyond_top_n = records.len() - cfg.top_n;
        records.truncate(cfg.top_n);
    }
    stats.kept = records.len();
    debug!("Ingest stats: {:?}", stats);
    Ok((records, stats))
}

fn parse_row(row: StatsRow) -> Option<CandidateRecord> {
    let name = row.player.filter(|s| !s.is_empty())?;
    let pos = row.pos.filter(|s| !s.is_empty())?;
    let avg: f64 = row.avg?.parse().ok()?;
    let total: f64 = row.total?.parse().ok()?;
    if !avg.is_finite() || !total.is_finite() {
        return None;
    }
    Some(CandidateRecord::new(name, pos, avg, total).with_team(row.team.unwrap_or_default()))
}
