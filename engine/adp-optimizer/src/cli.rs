//! # Command Line Interface

use std::path::PathBuf;

use clap::Parser;

use crate::settings::Settings;

/// Optimize fantasy draft rankings (ADP) by regret minimization
#[derive(Debug, Parser)]
#[command(name = "optimal-adp", version)]
#[command(about = "Optimize fantasy draft rankings (ADP) by regret minimization")]
pub struct Cli {
    /// Season stats CSV (Player, Pos, Team, AVG, TTL)
    pub data_file: PathBuf,

    /// TOML settings file; environment and flags override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Learning rate applied to regret (default 0.1)
    #[arg(long)]
    pub learning_rate: Option<f64>,

    /// Maximum optimization iterations (default 1000)
    #[arg(long)]
    pub max_iterations: Option<u32>,

    /// Number of teams in the draft (default 10)
    #[arg(long)]
    pub num_teams: Option<u32>,

    /// Perturbation factor for the seed ranking (0 disables)
    #[arg(long)]
    pub perturb: Option<f64>,

    /// Random seed for the perturbation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write the final ranking here
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base directory for run artifacts
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,

    /// Disable archiving of optimization outputs
    #[arg(long)]
    pub no_artifacts: bool,

    /// Evaluate regret on a single thread
    #[arg(long)]
    pub sequential: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Settings from the config file (or defaults), then environment, then flags.
    pub fn settings(&self) -> anyhow::Result<Settings> {
        let mut settings = match &self.config {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };
        settings.apply_env()?;
        self.apply(&mut settings);
        Ok(settings)
    }

    pub fn apply(&self, settings: &mut Settings) {
        if let Some(lr) = self.learning_rate {
            settings.optimizer.learning_rate = lr;
        }
        if let Some(n) = self.max_iterations {
            settings.optimizer.max_iterations = n;
        }
        if let Some(n) = self.num_teams {
            settings.league.num_teams = n;
        }
        if let Some(f) = self.perturb {
            settings.set_perturbation_factor(f);
        }
        if let Some(s) = self.seed {
            settings.set_perturbation_seed(s);
        }
        if let Some(dir) = &self.artifacts_dir {
            settings.artifacts.dir = dir.clone();
        }
        if self.no_artifacts {
            settings.artifacts.enabled = false;
        }
        if self.sequential {
            settings.optimizer.parallel = false;
        }
    }
}
