//! Run settings: TOML file, then environment, then command line.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use draft_engine::{LeagueConfig, OptimizerConfig, PerturbationConfig};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN_WEEKS: u32 = 10;
pub const DEFAULT_TOP_N: usize = 150;
pub const DEFAULT_ARTIFACTS_DIR: &str = "artifacts";

/// Row filters applied while reading the stats file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Minimum periods played, estimated as `round(total / avg)`
    pub min_weeks: u32,
    /// Keep only this many candidates, best total first
    pub top_n: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { min_weeks: DEFAULT_MIN_WEEKS, top_n: DEFAULT_TOP_N }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactsConfig {
    pub enabled: bool,
    pub dir: PathBuf,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self { enabled: true, dir: PathBuf::from(DEFAULT_ARTIFACTS_DIR) }
    }
}

/// Checks a final ranking must pass for the run to count as successful.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Categories whose best candidate must go in the first round
    pub first_round: Vec<String>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { first_round: ["QB", "RB", "WR"].iter().map(|s| s.to_string()).collect() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub league: LeagueConfig,
    pub optimizer: OptimizerConfig,
    pub ingest: IngestConfig,
    pub artifacts: ArtifactsConfig,
    pub validation: ValidationConfig,
}

impl Settings {
    /// Load settings from a TOML file. Missing sections take their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Failed to read settings {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&content).with_context(|| format!("Failed to parse settings {}", path.display()))?;
        Ok(settings)
    }

    /// Save settings to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize settings")?;
        std::fs::write(path, content).with_context(|| format!("Failed to write settings {}", path.display()))?;
        Ok(())
    }

    /// Apply `ADP_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(v) = lookup("ADP_LEARNING_RATE") {
            self.optimizer.learning_rate = parse_var("ADP_LEARNING_RATE", &v)?;
        }
        if let Some(v) = lookup("ADP_MAX_ITERATIONS") {
            self.optimizer.max_iterations = parse_var("ADP_MAX_ITERATIONS", &v)?;
        }
        if let Some(v) = lookup("ADP_NUM_TEAMS") {
            self.league.num_teams = parse_var("ADP_NUM_TEAMS", &v)?;
        }
        if let Some(v) = lookup("ADP_PERTURB") {
            self.set_perturbation_factor(parse_var("ADP_PERTURB", &v)?);
        }
        if let Some(v) = lookup("ADP_SEED") {
            self.set_perturbation_seed(parse_var("ADP_SEED", &v)?);
        }
        if let Some(v) = lookup("ADP_ARTIFACTS_DIR") {
            self.artifacts.dir = PathBuf::from(v);
        }
        Ok(())
    }

    /// A zero factor turns perturbation off.
    pub fn set_perturbation_factor(&mut self, factor: f64) {
        let seed = self.optimizer.perturbation.map(|p| p.seed).unwrap_or_default();
        self.optimizer.perturbation = (factor != 0.0).then_some(PerturbationConfig { factor, seed });
    }

    pub fn set_perturbation_seed(&mut self, seed: u64) {
        if let Some(p) = self.optimizer.perturbation.as_mut() {
            p.seed = seed;
        } else {
            self.optimizer.perturbation = Some(PerturbationConfig { factor: 0.0, seed });
        }
    }

    /// Base category names of the configured roster, in table order.
    pub fn categories(&self) -> Vec<String> {
        self.league.roster.base.iter().map(|b| b.name.clone()).collect()
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().with_context(|| format!("Invalid value for {key}: {value:?}"))
}
