//! Roster slot table and per-team roster tracking.
//!
//! Every slot category, base or flex, is a row in [`SlotTable`] carrying the set
//! of base categories it accepts. Eligibility and assignment consult that table
//! uniformly, so a new flex category is a configuration change only.

use crate::config::RosterConfig;
use crate::error::{DraftError, Result};
use crate::pool::CandidatePool;
use crate::types::{CandidateId, CategoryId, CategoryMask, TeamIdx};

/// One row of the slot table.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotCategory {
    pub name: String,
    pub capacity: u32,
    pub accepts: CategoryMask,
}

impl SlotCategory {
    #[inline]
    pub fn is_flex(&self) -> bool {
        self.accepts.count() > 1
    }
}

/// Resolved roster layout shared by every team in a league.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotTable {
    slots: Vec<SlotCategory>,
    base_count: usize,
}

impl SlotTable {
    /// Base slots occupy rows `0..base_count` in declaration order, flex slots follow.
    pub fn from_config(cfg: &RosterConfig) -> Result<Self> {
        cfg.validate()?;

        let mut slots: Vec<SlotCategory> = cfg
            .base
            .iter()
            .enumerate()
            .map(|(i, b)| SlotCategory {
                name: b.name.clone(),
                capacity: b.capacity,
                accepts: CategoryMask::single(CategoryId(i as u8)),
            })
            .collect();
        let base_count = slots.len();

        for flex in &cfg.flex {
            let mut accepts = CategoryMask::EMPTY;
            for name in &flex.accepts {
                let id = cfg
                    .base
                    .iter()
                    .position(|b| &b.name == name)
                    .ok_or_else(|| DraftError::config(format!("undefined base category {name}")))?;
                accepts.insert(CategoryId(id as u8));
            }
            slots.push(SlotCategory { name: flex.name.clone(), capacity: flex.capacity, accepts });
        }

        Ok(Self { slots, base_count })
    }

    #[inline]
    pub fn slots(&self) -> &[SlotCategory] {
        &self.slots
    }

    #[inline]
    pub fn base_count(&self) -> usize {
        self.base_count
    }

    pub fn base_id(&self, name: &str) -> Option<CategoryId> {
        self.slots[..self.base_count].iter().position(|s| s.name == name).map(|i| CategoryId(i as u8))
    }

    pub fn base_name(&self, c: CategoryId) -> &str {
        &self.slots[c.index()].name
    }

    pub fn slots_per_team(&self) -> u32 {
        self.slots.iter().map(|s| s.capacity).sum()
    }

    /// Slots per team that exist only for `c` (its base slot capacity).
    pub fn dedicated_capacity(&self, c: CategoryId) -> u32 {
        self.slots[c.index()].capacity
    }
}

/// A drafted candidate and the slot row it occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub candidate: CandidateId,
    pub slot: usize,
}

/// Mutable roster of one team during a draft.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamState {
    team: TeamIdx,
    open: Vec<u32>,
    picks: Vec<Assignment>,
}

impl TeamState {
    pub fn new(team: TeamIdx, table: &SlotTable) -> Self {
        Self {
            team,
            open: table.slots().iter().map(|s| s.capacity).collect(),
            picks: Vec::with_capacity(table.slots_per_team() as usize),
        }
    }

    #[inline]
    pub fn team(&self) -> TeamIdx {
        self.team
    }

    #[inline]
    pub fn picks(&self) -> &[Assignment] {
        &self.picks
    }

    /// Open count per slot row, in slot table order.
    #[inline]
    pub fn open_slots(&self) -> &[u32] {
        &self.open
    }

    pub fn is_full(&self) -> bool {
        self.open.iter().all(|&n| n == 0)
    }

    /// Base categories this roster can still accept, flex rows expanded.
    pub fn eligible(&self, table: &SlotTable) -> CategoryMask {
        table
            .slots()
            .iter()
            .zip(&self.open)
            .filter(|(_, open)| **open > 0)
            .fold(CategoryMask::EMPTY, |m, (slot, _)| m.union(slot.accepts))
    }

    /// Most constrained open slot accepting `category`: fewest accepted categories,
    /// then lowest row. Base rows always win over flex rows.
    pub fn slot_for(&self, table: &SlotTable, category: CategoryId) -> Option<usize> {
        table
            .slots()
            .iter()
            .enumerate()
            .filter(|(i, slot)| self.open[*i] > 0 && slot.accepts.contains(category))
            .min_by_key(|(i, slot)| (slot.accepts.count(), *i))
            .map(|(i, _)| i)
    }

    /// Place a candidate; `None` if no open slot accepts its category.
    pub fn assign(&mut self, table: &SlotTable, candidate: CandidateId, category: CategoryId) -> Option<usize> {
        let slot = self.slot_for(table, category)?;
        self.open[slot] -= 1;
        self.picks.push(Assignment { candidate, slot });
        Some(slot)
    }

    /// Sum of candidate scores in pick order.
    pub fn value(&self, pool: &CandidatePool) -> f64 {
        self.picks.iter().map(|a| pool.score(a.candidate)).sum()
    }
}
