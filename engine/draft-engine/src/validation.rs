//! Ranking sanity checks

use std::fmt;

use crate::pool::CandidatePool;
use crate::ranking::Ranking;
use crate::types::{CandidateId, CategoryId};

/// Two same-category candidates ranked against their averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HierarchyViolation {
    pub category: CategoryId,
    /// Ranked first despite the lower average
    pub earlier: CandidateId,
    pub later: CandidateId,
}

impl HierarchyViolation {
    pub fn describe(&self, pool: &CandidatePool) -> String {
        let (e, l) = (pool.get(self.earlier), pool.get(self.later));
        format!(
            "{}: {} (avg {:.2}) ranked ahead of {} (avg {:.2})",
            e.position, e.name, e.avg, l.name, l.avg
        )
    }
}

impl fmt::Display for HierarchyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category {}: {:?} ahead of {:?}", self.category.0, self.earlier, self.later)
    }
}

/// Every adjacent same-category pair where the earlier candidate has the
/// strictly lower average. Empty means each category is in descending
/// average order.
pub fn validate_category_hierarchy(ranking: &Ranking, pool: &CandidatePool) -> Vec<HierarchyViolation> {
    let order = ranking.draft_order(pool);
    let mut last: Vec<Option<CandidateId>> = Vec::new();
    let mut violations = Vec::new();
    for id in order {
        let c = pool.get(id).category;
        if last.len() <= c.index() {
            last.resize(c.index() + 1, None);
        }
        if let Some(prev) = last[c.index()] {
            if pool.get(prev).avg < pool.get(id).avg {
                violations.push(HierarchyViolation { category: c, earlier: prev, later: id });
            }
        }
        last[c.index()] = Some(id);
    }
    violations
}

/// A category's best candidate ranked outside the first round.
#[derive(Debug, Clone, PartialEq)]
pub enum FirstRoundViolation {
    /// No candidate of the category is in the pool
    Missing { category: String },
    Late { category: String, candidate: CandidateId, rank: f64 },
}

impl FirstRoundViolation {
    pub fn describe(&self, pool: &CandidatePool, num_teams: u32) -> String {
        match self {
            Self::Missing { category } => format!("no {category} candidates ranked"),
            Self::Late { category, candidate, rank } => {
                let c = pool.get(*candidate);
                format!("top {category} {} (avg {:.1}) ranked {rank}, should be <= {num_teams}", c.name, c.avg)
            }
        }
    }
}

/// The highest-average candidate of each listed category must rank within
/// the first `num_teams` picks.
pub fn validate_first_round(
    ranking: &Ranking,
    pool: &CandidatePool,
    num_teams: u32,
    categories: &[String],
) -> Vec<FirstRoundViolation> {
    let mut violations = Vec::new();
    for category in categories {
        let top = pool
            .iter()
            .filter(|c| &c.position == category)
            .max_by(|a, b| a.avg.total_cmp(&b.avg).then_with(|| b.name.cmp(&a.name)));
        match top {
            None => violations.push(FirstRoundViolation::Missing { category: category.clone() }),
            Some(c) if ranking.rank(c.id) > num_teams as f64 => violations.push(FirstRoundViolation::Late {
                category: category.clone(),
                candidate: c.id,
                rank: ranking.rank(c.id),
            }),
            Some(_) => {}
        }
    }
    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::small_pool;

    #[test]
    fn detects_single_swap() {
        let (pool, _, _) = small_pool();
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.sort_by(|&a, &b| pool.get(b).avg.total_cmp(&pool.get(a).avg));
        assert!(validate_category_hierarchy(&Ranking::dense_from_order(&ids), &pool).is_empty());

        // swap the top two of one category
        let cat = pool.get(ids[0]).category;
        let second = ids.iter().position(|&id| id != ids[0] && pool.get(id).category == cat).unwrap();
        ids.swap(0, second);
        let v = validate_category_hierarchy(&Ranking::dense_from_order(&ids), &pool);
        assert_eq!(v.len(), 1);
        assert_eq!(v[0].category, cat);
        assert_eq!(v[0].earlier, ids[0]);
        assert!(v[0].describe(&pool).contains(&pool.get(ids[0]).name));
    }

    #[test]
    fn first_round_needs_each_top_candidate() {
        let (pool, _, league) = small_pool();
        let cats: Vec<String> = ["QB", "RB", "WR"].iter().map(|s| s.to_string()).collect();
        let mut ids: Vec<CandidateId> = pool.iter().map(|c| c.id).collect();
        ids.sort_by(|&a, &b| pool.get(b).avg.total_cmp(&pool.get(a).avg));
        // QB1, QB2, RB1, WR1 open the board
        let r = Ranking::dense_from_order(&ids);
        assert!(validate_first_round(&r, &pool, 4, &cats).is_empty());

        let v = validate_first_round(&r, &pool, league.num_teams, &cats);
        let wr1 = pool.id_of("WR1").unwrap();
        let rb1 = pool.id_of("RB1").unwrap();
        assert_eq!(
            v,
            vec![
                FirstRoundViolation::Late { category: "RB".into(), candidate: rb1, rank: 3.0 },
                FirstRoundViolation::Late { category: "WR".into(), candidate: wr1, rank: 4.0 },
            ]
        );
        assert!(v[1].describe(&pool, league.num_teams).contains("WR1"));

        let v = validate_first_round(&r, &pool, 4, &["TE".to_string()]);
        assert_eq!(v, vec![FirstRoundViolation::Missing { category: "TE".into() }]);
    }
}
