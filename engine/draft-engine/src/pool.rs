//! Immutable candidate pool

use std::collections::HashMap;

use tracing::debug;

use crate::config::{LeagueConfig, ScoreField};
use crate::error::{DraftError, Result};
use crate::roster::SlotTable;
use crate::types::{CandidateId, CandidateRecord, CategoryId};

/// A candidate resolved against the roster table. Never mutated after load.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub position: String,
    pub category: CategoryId,
    pub team: String,
    pub avg: f64,
    pub total: f64,
}

/// Every eligible candidate plus the score used for team-value summation.
#[derive(Debug, Clone)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
    by_name: HashMap<String, CandidateId>,
    per_category: Vec<usize>,
    score_field: ScoreField,
}

impl CandidatePool {
    /// Resolve records against `table` and check the pool can fill every starting slot.
    pub fn new(records: &[CandidateRecord], table: &SlotTable, league: &LeagueConfig) -> Result<Self> {
        let mut candidates = Vec::with_capacity(records.len());
        let mut by_name = HashMap::with_capacity(records.len());
        let mut per_category = vec![0usize; table.base_count()];

        for (i, rec) in records.iter().enumerate() {
            let category = table.base_id(&rec.position).ok_or_else(|| {
                DraftError::input(format!("{} has unknown category {}", rec.name, rec.position))
            })?;
            if !rec.avg.is_finite() || !rec.total.is_finite() {
                return Err(DraftError::input(format!("{} has a non-finite value", rec.name)));
            }
            let id = CandidateId(i as u32);
            if by_name.insert(rec.name.clone(), id).is_some() {
                return Err(DraftError::input(format!("duplicate candidate {}", rec.name)));
            }
            per_category[category.index()] += 1;
            candidates.push(Candidate {
                id,
                name: rec.name.clone(),
                position: rec.position.clone(),
                category,
                team: rec.team.clone(),
                avg: rec.avg,
                total: rec.total,
            });
        }

        let pool = Self { candidates, by_name, per_category, score_field: league.score_field };
        pool.check_sufficient(table, league.num_teams as usize)?;
        debug!("Candidate pool ready: {} candidates, per category {:?}", pool.len(), pool.per_category);
        Ok(pool)
    }

    fn check_sufficient(&self, table: &SlotTable, num_teams: usize) -> Result<()> {
        let required = num_teams * table.slots_per_team() as usize;
        if self.len() < required {
            return Err(DraftError::InsufficientPool { category: None, required, available: self.len() });
        }
        for c in 0..table.base_count() {
            let id = CategoryId(c as u8);
            let required = num_teams * table.dedicated_capacity(id) as usize;
            let available = self.per_category[c];
            if available < required {
                return Err(DraftError::InsufficientPool {
                    category: Some(table.base_name(id).to_string()),
                    required,
                    available,
                });
            }
        }
        // a flex row is filled from the supply left over by the base rows it shares
        for flex in &table.slots()[table.base_count()..] {
            let accepted: Vec<CategoryId> = flex.accepts.iter().collect();
            let per_team =
                flex.capacity + accepted.iter().map(|&c| table.dedicated_capacity(c)).sum::<u32>();
            let required = num_teams * per_team as usize;
            let available: usize = accepted.iter().map(|c| self.per_category[c.index()]).sum();
            if available < required {
                return Err(DraftError::InsufficientPool { category: Some(flex.name.clone()), required, available });
            }
        }
        Ok(())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    #[inline]
    pub fn get(&self, id: CandidateId) -> &Candidate {
        &self.candidates[id.index()]
    }

    pub fn id_of(&self, name: &str) -> Option<CandidateId> {
        self.by_name.get(name).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.candidates.iter()
    }

    pub fn category_size(&self, c: CategoryId) -> usize {
        self.per_category[c.index()]
    }

    pub fn score_field(&self) -> ScoreField {
        self.score_field
    }

    /// Value contributed to a team's total.
    #[inline]
    pub fn score(&self, id: CandidateId) -> f64 {
        let c = &self.candidates[id.index()];
        match self.score_field {
            ScoreField::Average => c.avg,
            ScoreField::Total => c.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BaseSlot, FlexSlot, RosterConfig};

    fn league() -> LeagueConfig {
        LeagueConfig {
            num_teams: 2,
            roster: RosterConfig {
                base: vec![BaseSlot { name: "QB".into(), capacity: 1 }, BaseSlot { name: "RB".into(), capacity: 1 }],
                flex: vec![],
            },
            ..Default::default()
        }
    }

    fn records() -> Vec<CandidateRecord> {
        vec![
            CandidateRecord::new("QB1", "QB", 20.0, 300.0),
            CandidateRecord::new("QB2", "QB", 15.0, 240.0),
            CandidateRecord::new("RB1", "RB", 14.0, 230.0),
            CandidateRecord::new("RB2", "RB", 9.0, 150.0),
        ]
    }

    #[test]
    fn builds_and_scores() {
        let league = league();
        let table = SlotTable::from_config(&league.roster).unwrap();
        let pool = CandidatePool::new(&records(), &table, &league).unwrap();
        assert_eq!(pool.len(), 4);
        let rb1 = pool.id_of("RB1").unwrap();
        assert_eq!(pool.get(rb1).category, table.base_id("RB").unwrap());
        assert_eq!(pool.score(rb1), 14.0);

        let league = LeagueConfig { score_field: ScoreField::Total, ..league };
        let pool = CandidatePool::new(&records(), &table, &league).unwrap();
        assert_eq!(pool.score(rb1), 230.0);
    }

    #[test]
    fn rejects_duplicates_and_unknown_categories() {
        let league = league();
        let table = SlotTable::from_config(&league.roster).unwrap();

        let mut recs = records();
        recs.push(CandidateRecord::new("QB1", "QB", 1.0, 1.0));
        assert!(matches!(CandidatePool::new(&recs, &table, &league), Err(DraftError::MalformedInput(_))));

        let mut recs = records();
        recs.push(CandidateRecord::new("K1", "K", 1.0, 1.0));
        assert!(matches!(CandidatePool::new(&recs, &table, &league), Err(DraftError::MalformedInput(_))));
    }

    #[test]
    fn insufficient_pool_names_category() {
        let league = league();
        let table = SlotTable::from_config(&league.roster).unwrap();

        let recs = &records()[..3];
        let err = CandidatePool::new(recs, &table, &league).unwrap_err();
        assert_eq!(err, DraftError::InsufficientPool { category: None, required: 4, available: 3 });

        let mut recs = records();
        recs[3] = CandidateRecord::new("QB3", "QB", 8.0, 120.0);
        let err = CandidatePool::new(&recs, &table, &league).unwrap_err();
        assert_eq!(
            err,
            DraftError::InsufficientPool { category: Some("RB".to_string()), required: 2, available: 1 }
        );
    }

    #[test]
    fn flex_demand_counts_against_shared_supply() {
        let base = |name: &str| BaseSlot { name: name.to_string(), capacity: 1 };
        let league = LeagueConfig {
            num_teams: 2,
            roster: RosterConfig {
                base: vec![base("QB"), base("RB"), base("WR")],
                flex: vec![FlexSlot { name: "FLEX".into(), capacity: 1, accepts: vec!["RB".into(), "WR".into()] }],
            },
            ..Default::default()
        };
        let table = SlotTable::from_config(&league.roster).unwrap();

        // enough in total and per base category, but the flex slots have nobody left
        let recs: Vec<CandidateRecord> = [
            ("QB1", "QB"),
            ("QB2", "QB"),
            ("QB3", "QB"),
            ("QB4", "QB"),
            ("RB1", "RB"),
            ("RB2", "RB"),
            ("WR1", "WR"),
            ("WR2", "WR"),
        ]
        .into_iter()
        .map(|(n, p)| CandidateRecord::new(n, p, 10.0, 160.0))
        .collect();
        let err = CandidatePool::new(&recs, &table, &league).unwrap_err();
        assert_eq!(
            err,
            DraftError::InsufficientPool { category: Some("FLEX".to_string()), required: 6, available: 4 }
        );

        let mut recs = recs;
        recs[3] = CandidateRecord::new("WR3", "WR", 10.0, 160.0);
        recs.push(CandidateRecord::new("RB3", "RB", 10.0, 160.0));
        CandidatePool::new(&recs, &table, &league).unwrap();
    }
}
