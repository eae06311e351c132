use core::fmt;

use serde::{Deserialize, Serialize};

pub type TeamIdx = usize;
pub type PickIdx = usize;

/// Maximum number of base categories a roster table may declare (one bit each in a [`CategoryMask`]).
pub const MAX_BASE_CATEGORIES: usize = 32;

/// Dense index of a candidate inside a [`crate::CandidatePool`].
#[repr(transparent)]
#[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct CandidateId(pub u32);

impl CandidateId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C({})", self.0)
    }
}

/// Index of a base category (QB, RB, ...) in the roster table.
#[repr(transparent)]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct CategoryId(pub u8);

impl CategoryId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Set of base categories packed into one word.
#[repr(transparent)]
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct CategoryMask(u32);

impl CategoryMask {
    pub const EMPTY: CategoryMask = CategoryMask(0);

    #[inline]
    pub fn single(c: CategoryId) -> Self {
        CategoryMask(1u32 << c.0)
    }
    #[inline]
    pub fn insert(&mut self, c: CategoryId) {
        self.0 |= 1u32 << c.0;
    }
    #[inline]
    pub fn contains(self, c: CategoryId) -> bool {
        (self.0 >> c.0) & 1 != 0
    }
    #[inline]
    pub fn union(self, other: CategoryMask) -> Self {
        CategoryMask(self.0 | other.0)
    }
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
    #[inline]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Members in ascending category order.
    pub fn iter(self) -> impl Iterator<Item = CategoryId> {
        let mut bits = self.0;
        core::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let c = bits.trailing_zeros() as u8;
            bits &= bits - 1;
            Some(CategoryId(c))
        })
    }
}

impl fmt::Debug for CategoryMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter().map(|c| c.0)).finish()
    }
}

/// A candidate as handed over by the ingestion layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Unique identity (e.g., "Josh Allen")
    pub name: String,

    /// Base category code (e.g., "QB", "RB", "WR", "TE")
    pub position: String,

    /// Real-world team abbreviation, carried through for reporting
    #[serde(default)]
    pub team: String,

    /// Average fantasy points per period
    pub avg: f64,

    /// Total fantasy points over all periods
    pub total: f64,
}

impl CandidateRecord {
    pub fn new(name: impl Into<String>, position: impl Into<String>, avg: f64, total: f64) -> Self {
        Self { name: name.into(), position: position.into(), team: String::new(), avg, total }
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }
}
