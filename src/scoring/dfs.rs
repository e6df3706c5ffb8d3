// DFS value ranking.
//
// Converts a scored lineup plus a salary map into a value-per-dollar
// ranking for daily-fantasy roster construction. The metric is simply
// `probability / salary`; anything monotonic in that ratio ranks the same.

use std::collections::HashMap;

use crate::scoring::engine::ScoredTable;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Player identifier -> DFS salary in site dollars.
pub type SalaryMap = HashMap<String, i64>;

/// One player's DFS value line.
#[derive(Debug, Clone, PartialEq)]
pub struct DfsRow {
    pub player: String,
    pub probability: f64,
    pub salary: i64,
    /// `probability / salary`. Small numbers by construction; only the
    /// ordering matters.
    pub value: f64,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum DfsError {
    #[error("no salary entry for scored player {player}")]
    MissingSalary { player: String },

    /// Guards the division: a zero salary must never silently become an
    /// infinite value.
    #[error("invalid salary {salary} for player {player} (must be > 0)")]
    InvalidSalary { player: String, salary: i64 },
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

/// Rank every scored player by value per dollar, descending.
///
/// All salaries are validated before any row is produced, so an error means
/// no partial output. Ties keep the scored-table order (stable sort).
pub fn optimize_dfs(table: &ScoredTable, salaries: &SalaryMap) -> Result<Vec<DfsRow>, DfsError> {
    let mut rows = Vec::with_capacity(table.len());

    for scored in table.iter() {
        let player = &scored.entry.player;
        let salary = salaries
            .get(player)
            .copied()
            .ok_or_else(|| DfsError::MissingSalary {
                player: player.clone(),
            })?;
        if salary <= 0 {
            return Err(DfsError::InvalidSalary {
                player: player.clone(),
                salary,
            });
        }

        rows.push(DfsRow {
            player: player.clone(),
            probability: scored.probability,
            salary,
            value: scored.probability / salary as f64,
        });
    }

    rows.sort_by(|a, b| {
        b.value
            .partial_cmp(&a.value)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(rows)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::LineupEntry;
    use crate::scoring::engine::{ScoredRow, ScoredTable};

    fn scored(player: &str, probability: f64) -> ScoredRow {
        ScoredRow {
            entry: LineupEntry::new(player, &[("power", 50.0), ("recent_form", 0.5)]),
            probability,
            narrative: None,
        }
    }

    fn table(rows: Vec<ScoredRow>) -> ScoredTable {
        ScoredTable { rows }
    }

    #[test]
    fn ranks_by_value_per_dollar_not_raw_probability() {
        // player1 has the highest probability but the worst price.
        let t = table(vec![
            scored("player1", 0.30),
            scored("player2", 0.20),
            scored("player3", 0.10),
        ]);
        let salaries: SalaryMap = [
            ("player1".to_string(), 6000),
            ("player2".to_string(), 3000),
            ("player3".to_string(), 3000),
        ]
        .into_iter()
        .collect();

        let ranked = optimize_dfs(&t, &salaries).unwrap();

        // Values: 0.20/3000 ~ 6.67e-5, 0.30/6000 = 5.0e-5, 0.10/3000 ~ 3.33e-5.
        let order: Vec<&str> = ranked.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(order, vec!["player2", "player1", "player3"]);

        assert!((ranked[0].value - 0.20 / 3000.0).abs() < 1e-12);
        assert!((ranked[1].value - 0.30 / 6000.0).abs() < 1e-12);
        assert!((ranked[2].value - 0.10 / 3000.0).abs() < 1e-12);
    }

    #[test]
    fn missing_salary_fails_with_no_partial_output() {
        let t = table(vec![scored("Covered", 0.2), scored("Uncovered", 0.1)]);
        let salaries: SalaryMap = [("Covered".to_string(), 4000)].into_iter().collect();

        let err = optimize_dfs(&t, &salaries).unwrap_err();
        assert!(matches!(err, DfsError::MissingSalary { ref player } if player == "Uncovered"));
    }

    #[test]
    fn zero_salary_is_invalid_not_infinite() {
        let t = table(vec![scored("Free Agent", 0.2)]);
        let salaries: SalaryMap = [("Free Agent".to_string(), 0)].into_iter().collect();

        let err = optimize_dfs(&t, &salaries).unwrap_err();
        assert!(matches!(
            err,
            DfsError::InvalidSalary { salary: 0, ref player } if player == "Free Agent"
        ));
    }

    #[test]
    fn negative_salary_is_invalid() {
        let t = table(vec![scored("Glitch", 0.2)]);
        let salaries: SalaryMap = [("Glitch".to_string(), -100)].into_iter().collect();

        assert!(matches!(
            optimize_dfs(&t, &salaries).unwrap_err(),
            DfsError::InvalidSalary { salary: -100, .. }
        ));
    }

    #[test]
    fn empty_table_yields_empty_ranking() {
        let ranked = optimize_dfs(&table(vec![]), &SalaryMap::new()).unwrap();
        assert!(ranked.is_empty());
    }

    #[test]
    fn equal_values_keep_scored_order() {
        // Same probability, same salary -> identical value; stable sort
        // should preserve the scored-table order.
        let t = table(vec![scored("Earlier", 0.2), scored("Later", 0.2)]);
        let salaries: SalaryMap = [
            ("Earlier".to_string(), 5000),
            ("Later".to_string(), 5000),
        ]
        .into_iter()
        .collect();

        let ranked = optimize_dfs(&t, &salaries).unwrap();
        let order: Vec<&str> = ranked.iter().map(|r| r.player.as_str()).collect();
        assert_eq!(order, vec!["Earlier", "Later"]);
    }

    #[test]
    fn rows_carry_probability_and_salary_through() {
        let t = table(vec![scored("Carrier", 0.25)]);
        let salaries: SalaryMap = [("Carrier".to_string(), 5500)].into_iter().collect();

        let ranked = optimize_dfs(&t, &salaries).unwrap();
        assert_eq!(ranked[0].probability, 0.25);
        assert_eq!(ranked[0].salary, 5500);
    }
}
