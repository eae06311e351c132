//! # Draft Engine
//!
//! Deterministic snake-draft simulation and a regret-driven optimizer for
//! draft rankings (ADP).
//!
//! Each iteration drafts a full league greedily from the current ranking,
//! replays the rest of the draft once per pick with that pick's candidate
//! removed, and moves every drafted candidate by the value its team would have
//! gained or lost. Ranks are re-linearized to 1..N after each update and each
//! category is kept in descending order of average value. The loop stops when
//! no candidate moves or the iteration budget runs out.
//!
//! The crate performs no file I/O and installs no log subscriber.

pub mod bitset;
pub mod board;
pub mod config;
pub mod convergence;
pub mod draft;
pub mod error;
pub mod optimizer;
pub mod pool;
pub mod ranking;
pub mod regret;
pub mod roster;
pub mod seed;
pub mod types;
pub mod updater;
pub mod validation;

#[cfg(test)]
mod test_support;


pub use board::RankingBoard;
pub use config::{
    BaseSlot, FlexSlot, LeagueConfig, OptimizerConfig, PenaltyConfig, PerturbationConfig, RosterConfig, ScoreField,
    SeedConfig, ToleranceConfig,
};
pub use convergence::{ConvergenceMonitor, RunState};
pub use draft::{CompletedDraft, DraftEngine, DraftState, PickDetail, PickOrder, PickRecord};
pub use error::{DraftError, Result};
pub use optimizer::{IterationRecord, OptimizationOutcome, Optimizer};
pub use pool::{Candidate, CandidatePool};
pub use ranking::{RankMove, RankOrder, Ranking};
pub use regret::{PickRegret, RegretEvaluator, RegretMap, RegretReport, RunningMax};
pub use roster::{SlotTable, TeamState};
pub use seed::{Seed, SeedRow};
pub use types::{CandidateId, CandidateRecord, CategoryId, CategoryMask, PickIdx, TeamIdx};
pub use updater::RankUpdater;
pub use validation::{FirstRoundViolation, HierarchyViolation, validate_category_hierarchy, validate_first_round};

/// Current version of the draft engine
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default number of teams in a league
pub const DEFAULT_NUM_TEAMS: u32 = 10;

/// Default learning rate applied to regret
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;

/// Default iteration budget
pub const DEFAULT_MAX_ITERATIONS: u32 = 1000;
