//! Shared fixtures for unit tests

use crate::config::{BaseSlot, FlexSlot, LeagueConfig, RosterConfig};
use crate::pool::CandidatePool;
use crate::roster::SlotTable;
use crate::types::CandidateRecord;

/// Two teams, QB/RB/WR plus one RB/WR flex: eight picks over eleven candidates.
/// Averages are distinct within each category.
pub fn small_league() -> LeagueConfig {
    let base = |name: &str| BaseSlot { name: name.to_string(), capacity: 1 };
    LeagueConfig {
        num_teams: 2,
        roster: RosterConfig {
            base: vec![base("QB"), base("RB"), base("WR")],
            flex: vec![FlexSlot { name: "FLEX".into(), capacity: 1, accepts: vec!["RB".into(), "WR".into()] }],
        },
        ..Default::default()
    }
}

pub fn small_records() -> Vec<CandidateRecord> {
    [
        ("QB1", "QB", 30.0),
        ("QB2", "QB", 25.0),
        ("QB3", "QB", 18.0),
        ("RB1", "RB", 22.0),
        ("RB2", "RB", 19.0),
        ("RB3", "RB", 14.0),
        ("RB4", "RB", 9.0),
        ("WR1", "WR", 21.0),
        ("WR2", "WR", 17.0),
        ("WR3", "WR", 13.0),
        ("WR4", "WR", 8.0),
    ]
    .into_iter()
    .map(|(name, pos, avg)| CandidateRecord::new(name, pos, avg, avg * 16.0))
    .collect()
}

pub fn small_pool() -> (CandidatePool, SlotTable, LeagueConfig) {
    let league = small_league();
    let table = SlotTable::from_config(&league.roster).unwrap();
    let pool = CandidatePool::new(&small_records(), &table, &league).unwrap();
    (pool, table, league)
}

/// Three teams, one A and one B slot each, six candidates for six picks.
/// Records are in id order A1, A2, A3, B1, B2, B3.
pub fn exact_pool() -> (CandidatePool, SlotTable, LeagueConfig) {
    let base = |name: &str| BaseSlot { name: name.to_string(), capacity: 1 };
    let league = LeagueConfig {
        num_teams: 3,
        roster: RosterConfig { base: vec![base("A"), base("B")], flex: vec![] },
        ..Default::default()
    };
    let records: Vec<CandidateRecord> = [
        ("A1", "A", 30.0),
        ("A2", "A", 20.0),
        ("A3", "A", 15.0),
        ("B1", "B", 12.0),
        ("B2", "B", 10.0),
        ("B3", "B", 7.0),
    ]
    .into_iter()
    .map(|(name, pos, avg)| CandidateRecord::new(name, pos, avg, avg * 16.0))
    .collect();
    let table = SlotTable::from_config(&league.roster).unwrap();
    let pool = CandidatePool::new(&records, &table, &league).unwrap();
    (pool, table, league)
}
