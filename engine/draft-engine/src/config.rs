//! League and optimizer configuration

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{DraftError, Result};
use crate::types::MAX_BASE_CATEGORIES;
use crate::{DEFAULT_LEARNING_RATE, DEFAULT_MAX_ITERATIONS, DEFAULT_NUM_TEAMS};

/// Which candidate value is summed into a team's value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreField {
    #[default]
    Average,
    Total,
}

/// A starting slot that accepts exactly one base category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaseSlot {
    pub name: String,
    pub capacity: u32,
}

/// A starting slot shared by several base categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlexSlot {
    pub name: String,
    pub capacity: u32,
    pub accepts: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterConfig {
    pub base: Vec<BaseSlot>,
    #[serde(default)]
    pub flex: Vec<FlexSlot>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        let base = |name: &str, capacity| BaseSlot { name: name.to_string(), capacity };
        Self {
            base: vec![base("QB", 2), base("RB", 2), base("WR", 3), base("TE", 1)],
            flex: vec![FlexSlot {
                name: "FLEX".to_string(),
                capacity: 2,
                accepts: vec!["RB".to_string(), "WR".to_string(), "TE".to_string()],
            }],
        }
    }
}

impl RosterConfig {
    /// Starting slots per team, which is also the number of draft rounds.
    pub fn slots_per_team(&self) -> u32 {
        self.base.iter().map(|s| s.capacity).sum::<u32>()
            + self.flex.iter().map(|s| s.capacity).sum::<u32>()
    }

    pub fn validate(&self) -> Result<()> {
        if self.base.is_empty() {
            return Err(DraftError::config("roster declares no base categories"));
        }
        if self.base.len() > MAX_BASE_CATEGORIES {
            return Err(DraftError::config(format!(
                "roster declares {} base categories, at most {MAX_BASE_CATEGORIES} supported",
                self.base.len()
            )));
        }

        let mut names = BTreeSet::new();
        for slot in &self.base {
            if slot.name.is_empty() {
                return Err(DraftError::config("base category with empty name"));
            }
            if slot.capacity == 0 {
                return Err(DraftError::config(format!("capacity of {} must be positive", slot.name)));
            }
            if !names.insert(slot.name.as_str()) {
                return Err(DraftError::config(format!("duplicate category {}", slot.name)));
            }
        }
        let base_names: BTreeSet<&str> = self.base.iter().map(|s| s.name.as_str()).collect();

        for slot in &self.flex {
            if slot.capacity == 0 {
                return Err(DraftError::config(format!("capacity of {} must be positive", slot.name)));
            }
            if !names.insert(slot.name.as_str()) {
                return Err(DraftError::config(format!("duplicate category {}", slot.name)));
            }
            if slot.accepts.is_empty() {
                return Err(DraftError::config(format!("flex category {} accepts nothing", slot.name)));
            }
            if let Some(unknown) = slot.accepts.iter().find(|a| !base_names.contains(a.as_str())) {
                return Err(DraftError::config(format!(
                    "flex category {} references undefined base category {unknown}",
                    slot.name
                )));
            }
        }
        Ok(())
    }
}

/// League shape: team count, starting slots and the scoring field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueConfig {
    pub num_teams: u32,
    #[serde(default)]
    pub roster: RosterConfig,
    #[serde(default)]
    pub score_field: ScoreField,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self { num_teams: DEFAULT_NUM_TEAMS, roster: RosterConfig::default(), score_field: ScoreField::Average }
    }
}

impl LeagueConfig {
    pub fn rounds(&self) -> u32 {
        self.roster.slots_per_team()
    }

    pub fn total_picks(&self) -> usize {
        self.num_teams as usize * self.rounds() as usize
    }

    pub fn validate(&self) -> Result<()> {
        if self.num_teams == 0 {
            return Err(DraftError::config("team count must be positive"));
        }
        self.roster.validate()?;
        if self.rounds() == 0 {
            return Err(DraftError::config("round count must be positive"));
        }
        Ok(())
    }
}

/// Tolerance-based stop: position changes below `epsilon` for `consecutive` iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToleranceConfig {
    pub epsilon: u64,
    pub consecutive: u32,
}

/// Regret assigned to a pick that skipped a better same-category candidate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PenaltyConfig {
    /// Largest ordinary regret magnitude seen so far in the run, never below `floor`.
    RunningMax { floor: f64 },
    Fixed { value: f64 },
}

impl Default for PenaltyConfig {
    fn default() -> Self {
        PenaltyConfig::RunningMax { floor: 1.0 }
    }
}

/// How the very first ranking is produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum SeedConfig {
    /// Value-above-baseline: baseline is the k-th best average in each category.
    Vbr { baselines: BTreeMap<String, u32> },
    /// Caller-provided rank per candidate; must cover the whole pool.
    Explicit { ranks: BTreeMap<String, f64> },
}

impl Default for SeedConfig {
    fn default() -> Self {
        let baselines = [("QB", 21), ("RB", 29), ("WR", 43), ("TE", 11)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        SeedConfig::Vbr { baselines }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerturbationConfig {
    /// Maximum relative change applied to a seed rank (0.1 = 10%)
    pub factor: f64,
    pub seed: u64,
}

/// Parameters of the regret optimization loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimizerConfig {
    pub learning_rate: f64,
    pub max_iterations: u32,
    #[serde(default)]
    pub tolerance: Option<ToleranceConfig>,
    #[serde(default)]
    pub penalty: PenaltyConfig,
    /// Evaluate per-pick regret replays on the rayon pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub perturbation: Option<PerturbationConfig>,
}

fn default_parallel() -> bool {
    true
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            learning_rate: DEFAULT_LEARNING_RATE,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: None,
            penalty: PenaltyConfig::default(),
            parallel: true,
            seed: SeedConfig::default(),
            perturbation: None,
        }
    }
}

impl OptimizerConfig {
    pub fn validate(&self, league: &LeagueConfig) -> Result<()> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 || self.learning_rate > 1.0 {
            return Err(DraftError::config(format!(
                "learning rate must be in (0, 1], got {}",
                self.learning_rate
            )));
        }
        if self.max_iterations == 0 {
            return Err(DraftError::config("max iterations must be positive"));
        }
        if let Some(tol) = self.tolerance {
            if tol.consecutive == 0 {
                return Err(DraftError::config("tolerance needs at least one consecutive iteration"));
            }
        }
        match self.penalty {
            PenaltyConfig::RunningMax { floor } if !floor.is_finite() || floor < 0.0 => {
                return Err(DraftError::config(format!("penalty floor must be >= 0, got {floor}")));
            }
            PenaltyConfig::Fixed { value } if !value.is_finite() || value <= 0.0 => {
                return Err(DraftError::config(format!("fixed penalty must be > 0, got {value}")));
            }
            _ => {}
        }
        if let SeedConfig::Vbr { baselines } = &self.seed {
            for (category, &k) in baselines {
                if k == 0 {
                    return Err(DraftError::config(format!("baseline rank for {category} must be positive")));
                }
                if !league.roster.base.iter().any(|b| &b.name == category) {
                    warn!("Ignoring VBR baseline for {category}: not a base category of this roster");
                }
            }
        }
        if let Some(p) = self.perturbation {
            if !p.factor.is_finite() || !(0.0..1.0).contains(&p.factor) {
                return Err(DraftError::config(format!(
                    "perturbation factor must be in [0, 1), got {}",
                    p.factor
                )));
            }
        }
        Ok(())
    }
}
