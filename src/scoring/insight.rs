// Per-player narrative generation.
//
// Turns one scored row into a short human-readable sentence. Pure string
// templating over pre-computed numbers; no model calls, no side effects.

use crate::scoring::engine::ScoredRow;

// Tier cutoffs on the computed probability.
const PRIME_THREAT: f64 = 0.09;
const LIVE_BAT: f64 = 0.06;

/// Describe a scored row in plain English.
///
/// The sentence always leads with the percentage; power and recent-form
/// clauses are appended only when those attributes are present on the row.
pub fn explain_player(row: &ScoredRow) -> String {
    let pct = row.probability * 100.0;

    let mut text = if row.probability >= PRIME_THREAT {
        format!(
            "{} projects a {:.1}% home-run chance — a prime threat in this matchup.",
            row.entry.player, pct
        )
    } else if row.probability >= LIVE_BAT {
        format!(
            "{} projects a {:.1}% home-run chance, a live bat worth watching.",
            row.entry.player, pct
        )
    } else {
        format!(
            "{} projects a {:.1}% home-run chance — a long shot tonight.",
            row.entry.player, pct
        )
    };

    if let Some(power) = row.entry.attributes.get("power") {
        if *power >= 80.0 {
            text.push_str(&format!(" Plus raw power ({power:.0}) drives the projection."));
        } else if *power < 40.0 {
            text.push_str(&format!(" Modest raw power ({power:.0}) caps the upside."));
        }
    }

    if let Some(form) = row.entry.attributes.get("recent_form") {
        if *form >= 0.7 {
            text.push_str(" The bat has been hot lately.");
        } else if *form <= 0.3 {
            text.push_str(" The recent slump works against him.");
        }
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::LineupEntry;

    fn row(player: &str, probability: f64, attrs: &[(&str, f64)]) -> ScoredRow {
        ScoredRow {
            entry: LineupEntry::new(player, attrs),
            probability,
            narrative: None,
        }
    }

    #[test]
    fn high_probability_reads_as_prime_threat() {
        let text = explain_player(&row(
            "Aaron Judge",
            0.104,
            &[("power", 95.0), ("recent_form", 0.8)],
        ));
        assert!(text.starts_with("Aaron Judge projects a 10.4% home-run chance"));
        assert!(text.contains("prime threat"));
        assert!(text.contains("Plus raw power (95)"));
        assert!(text.contains("hot lately"));
    }

    #[test]
    fn low_probability_reads_as_long_shot() {
        let text = explain_player(&row(
            "Utility Infielder",
            0.021,
            &[("power", 35.0), ("recent_form", 0.2)],
        ));
        assert!(text.contains("long shot"));
        assert!(text.contains("Modest raw power (35)"));
        assert!(text.contains("slump"));
    }

    #[test]
    fn mid_tier_mentions_neither_power_extreme() {
        let text = explain_player(&row(
            "Steady Regular",
            0.07,
            &[("power", 60.0), ("recent_form", 0.5)],
        ));
        assert!(text.contains("live bat"));
        assert!(!text.contains("raw power"));
        assert!(!text.contains("slump"));
        assert!(!text.contains("hot lately"));
    }

    #[test]
    fn missing_attributes_still_produce_a_sentence() {
        // explain_player must stay total over any row it is handed, even one
        // built outside the scoring engine.
        let text = explain_player(&row("Mystery Man", 0.05, &[]));
        assert!(text.contains("Mystery Man"));
        assert!(text.contains("5.0%"));
    }

    #[test]
    fn deterministic_for_equal_rows() {
        let r = row("Same Guy", 0.08, &[("power", 70.0), ("recent_form", 0.5)]);
        assert_eq!(explain_player(&r), explain_player(&r));
    }
}
