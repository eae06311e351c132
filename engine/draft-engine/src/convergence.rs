//! Stop rule of the optimization loop

use serde::{Deserialize, Serialize};

use crate::config::ToleranceConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Seeded,
    Iterating,
    Converged,
    /// Iteration budget spent without converging. Reported, not an error.
    Exhausted,
}

impl RunState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Converged | RunState::Exhausted)
    }
}

#[derive(Debug, Clone)]
pub struct ConvergenceMonitor {
    tolerance: Option<ToleranceConfig>,
    max_iterations: u32,
    history: Vec<u64>,
    below_epsilon: u32,
    state: RunState,
}

impl ConvergenceMonitor {
    pub fn new(max_iterations: u32, tolerance: Option<ToleranceConfig>) -> Self {
        Self { tolerance, max_iterations, history: Vec::new(), below_epsilon: 0, state: RunState::Seeded }
    }

    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Position-change count of every completed iteration.
    #[inline]
    pub fn history(&self) -> &[u64] {
        &self.history
    }

    #[inline]
    pub fn iterations(&self) -> u32 {
        self.history.len() as u32
    }

    /// Record one iteration's position-change count and advance the state.
    pub fn observe(&mut self, position_changes: u64) -> RunState {
        if self.state.is_terminal() {
            return self.state;
        }
        self.history.push(position_changes);

        let within_tolerance = match self.tolerance {
            Some(tol) if position_changes < tol.epsilon => {
                self.below_epsilon += 1;
                self.below_epsilon >= tol.consecutive
            }
            Some(_) => {
                self.below_epsilon = 0;
                false
            }
            None => false,
        };

        self.state = if position_changes == 0 || within_tolerance {
            RunState::Converged
        } else if self.iterations() >= self.max_iterations {
            RunState::Exhausted
        } else {
            RunState::Iterating
        };
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_changes_converges() {
        let mut m = ConvergenceMonitor::new(10, None);
        assert_eq!(m.state(), RunState::Seeded);
        assert_eq!(m.observe(12), RunState::Iterating);
        assert_eq!(m.observe(0), RunState::Converged);
        assert_eq!(m.history(), &[12, 0]);
        // terminal states are sticky
        assert_eq!(m.observe(5), RunState::Converged);
        assert_eq!(m.iterations(), 2);
    }

    #[test]
    fn budget_exhaustion() {
        let mut m = ConvergenceMonitor::new(2, None);
        assert_eq!(m.observe(3), RunState::Iterating);
        assert_eq!(m.observe(3), RunState::Exhausted);
    }

    #[test]
    fn converging_on_last_allowed_iteration_wins() {
        let mut m = ConvergenceMonitor::new(1, None);
        assert_eq!(m.observe(0), RunState::Converged);
    }

    #[test]
    fn tolerance_needs_consecutive_streak() {
        let mut m = ConvergenceMonitor::new(10, Some(ToleranceConfig { epsilon: 5, consecutive: 2 }));
        assert_eq!(m.observe(4), RunState::Iterating);
        assert_eq!(m.observe(9), RunState::Iterating); // streak reset
        assert_eq!(m.observe(2), RunState::Iterating);
        assert_eq!(m.observe(3), RunState::Converged);
    }
}
