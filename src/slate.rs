// Full-slate simulation and CSV export.
//
// Scores every known team once against randomly sampled pitcher/weather
// conditions and flattens the results into one dated, comma-delimited
// export. Orchestration only — all the modeling lives in the scoring
// engine, and randomness is confined to the injectable sampler so the
// engine stays deterministic and independently testable.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::SimulationConfig;
use crate::roster::{RosterError, RosterProvider};
use crate::scoring::engine::{self, PitcherProfile, WeatherProfile, WindDirection};

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One sampled game context: the opposing pitcher and the weather.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameConditions {
    pub pitcher: PitcherProfile,
    pub weather: WeatherProfile,
}

/// One exported row. Field order here is the CSV column order: the scored
/// fields first, then the (team, opponent) tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlateRow {
    pub player: String,
    pub probability: f64,
    pub team: String,
    pub opponent: String,
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SlateError {
    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("failed to write export {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },
}

// ---------------------------------------------------------------------------
// Profile sampling
// ---------------------------------------------------------------------------

/// Source of per-game random context.
///
/// The slate driver never touches an RNG directly; tests inject a sampler
/// with fixed output and get a fully deterministic slate.
pub trait ProfileSampler {
    /// Sample pitcher and weather conditions for one game.
    fn sample(&mut self) -> GameConditions;

    /// Pick an opponent for `team` among `teams`. `None` when no other
    /// team exists.
    fn pick_opponent(&mut self, team: &str, teams: &[String]) -> Option<String>;
}

/// Uniform sampler over the configured ranges.
pub struct RandomSampler {
    rng: StdRng,
    ranges: SimulationConfig,
}

impl RandomSampler {
    pub fn new(ranges: SimulationConfig) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            ranges,
        }
    }

    /// Seeded constructor for reproducible slates.
    pub fn seeded(seed: u64, ranges: SimulationConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            ranges,
        }
    }
}

impl ProfileSampler for RandomSampler {
    fn sample(&mut self) -> GameConditions {
        let r = &self.ranges;
        GameConditions {
            pitcher: PitcherProfile {
                hr_per9: self.rng.gen_range(r.hr_per9.min..=r.hr_per9.max),
                avg_velocity: self.rng.gen_range(r.avg_velocity.min..=r.avg_velocity.max),
                slider_pct: self.rng.gen_range(r.slider_pct.min..=r.slider_pct.max),
                curve_pct: self.rng.gen_range(r.curve_pct.min..=r.curve_pct.max),
                fastball_pct: self.rng.gen_range(r.fastball_pct.min..=r.fastball_pct.max),
            },
            weather: WeatherProfile {
                temp_f: self.rng.gen_range(r.temp_f.min..=r.temp_f.max),
                wind_speed: self.rng.gen_range(r.wind_speed.min..=r.wind_speed.max),
                wind_dir: *[WindDirection::In, WindDirection::Cross, WindDirection::Out]
                    .choose(&mut self.rng)
                    .unwrap_or(&WindDirection::Cross),
                humidity_pct: self.rng.gen_range(r.humidity_pct.min..=r.humidity_pct.max),
            },
        }
    }

    fn pick_opponent(&mut self, team: &str, teams: &[String]) -> Option<String> {
        let others: Vec<&String> = teams.iter().filter(|t| t.as_str() != team).collect();
        others.choose(&mut self.rng).map(|t| (*t).clone())
    }
}

// ---------------------------------------------------------------------------
// Slate driver
// ---------------------------------------------------------------------------

/// Score every team once and collect the tagged rows.
///
/// Failure policy: skip-and-continue. A team whose roster is empty, cannot
/// be fetched, or fails to score is logged at WARN and skipped; the rest of
/// the slate still runs. Only a failure to list teams at all aborts.
pub fn simulate_slate(
    provider: &dyn RosterProvider,
    sampler: &mut dyn ProfileSampler,
) -> Result<Vec<SlateRow>, SlateError> {
    let teams = provider.all_teams()?;
    info!(teams = teams.len(), "starting slate simulation");

    let mut rows = Vec::new();

    for team in &teams {
        let Some(opponent) = sampler.pick_opponent(team, &teams) else {
            warn!(%team, "no opponent available, skipping");
            continue;
        };

        let lineup = match provider.current_roster(team) {
            Ok(lineup) => lineup,
            Err(e) => {
                warn!(%team, error = %e, "roster unavailable, skipping team");
                continue;
            }
        };
        if lineup.is_empty() {
            warn!(%team, "empty roster, skipping team");
            continue;
        }

        let conditions = sampler.sample();
        let table = match engine::predict_hr(&lineup, &conditions.pitcher, &conditions.weather) {
            Ok(table) => table,
            Err(e) => {
                warn!(%team, error = %e, "scoring failed, skipping team");
                continue;
            }
        };

        for scored in table.iter() {
            rows.push(SlateRow {
                player: scored.entry.player.clone(),
                probability: scored.probability,
                team: team.clone(),
                opponent: opponent.clone(),
            });
        }
    }

    info!(rows = rows.len(), "slate simulation complete");
    Ok(rows)
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

/// Dated export path: `<dir>/simulated_hr_predictions_<YYYY-MM-DD>.csv`.
pub fn export_path(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(format!(
        "simulated_hr_predictions_{}.csv",
        date.format("%Y-%m-%d")
    ))
}

/// Write the slate as comma-delimited text: header row, no index column.
pub fn write_slate_csv(rows: &[SlateRow], path: &Path) -> Result<(), SlateError> {
    let path_str = path.display().to_string();

    // Header is written explicitly so even an empty slate produces a
    // well-formed export.
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| csv_error(&path_str, e))?;
    writer
        .write_record(["player", "probability", "team", "opponent"])
        .map_err(|e| csv_error(&path_str, e))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| csv_error(&path_str, e))?;
    }
    writer.flush().map_err(|source| SlateError::Io {
        path: path_str,
        source,
    })?;

    Ok(())
}

/// Read a previously written export back into rows.
pub fn read_slate_csv(path: &Path) -> Result<Vec<SlateRow>, SlateError> {
    let path_str = path.display().to_string();

    let mut reader = csv::Reader::from_path(path).map_err(|e| csv_error(&path_str, e))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        rows.push(record.map_err(|e| csv_error(&path_str, e))?);
    }
    Ok(rows)
}

fn csv_error(path: &str, e: csv::Error) -> SlateError {
    SlateError::Csv {
        path: path.to_string(),
        source: e,
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_support::default_simulation_config;
    use crate::roster::LineupEntry;
    use crate::scoring::engine::bounds;
    use std::collections::HashMap;

    // ---- Test doubles ----

    /// In-memory roster provider.
    struct StaticProvider {
        teams: Vec<String>,
        rosters: HashMap<String, Vec<LineupEntry>>,
    }

    impl StaticProvider {
        fn new(rosters: Vec<(&str, Vec<LineupEntry>)>) -> Self {
            Self {
                teams: rosters.iter().map(|(t, _)| t.to_string()).collect(),
                rosters: rosters
                    .into_iter()
                    .map(|(t, l)| (t.to_string(), l))
                    .collect(),
            }
        }
    }

    impl RosterProvider for StaticProvider {
        fn all_teams(&self) -> Result<Vec<String>, RosterError> {
            Ok(self.teams.clone())
        }

        fn current_roster(&self, team: &str) -> Result<Vec<LineupEntry>, RosterError> {
            self.rosters
                .get(team)
                .cloned()
                .ok_or_else(|| RosterError::UnknownTeam(team.to_string()))
        }
    }

    /// Sampler returning a fixed context and the alphabetically-first
    /// opponent, so slates are fully deterministic.
    struct FixedSampler;

    impl ProfileSampler for FixedSampler {
        fn sample(&mut self) -> GameConditions {
            GameConditions {
                pitcher: PitcherProfile {
                    hr_per9: 1.2,
                    avg_velocity: 94.0,
                    slider_pct: 25.0,
                    curve_pct: 12.0,
                    fastball_pct: 60.0,
                },
                weather: WeatherProfile {
                    temp_f: 78.0,
                    wind_speed: 10.0,
                    wind_dir: WindDirection::Out,
                    humidity_pct: 55.0,
                },
            }
        }

        fn pick_opponent(&mut self, team: &str, teams: &[String]) -> Option<String> {
            teams.iter().find(|t| t.as_str() != team).cloned()
        }
    }

    fn entry(player: &str, power: f64, form: f64) -> LineupEntry {
        LineupEntry::new(player, &[("power", power), ("recent_form", form)])
    }

    fn three_team_provider() -> StaticProvider {
        StaticProvider::new(vec![
            ("BAL", vec![entry("Henderson", 85.0, 0.7), entry("Rutschman", 70.0, 0.5)]),
            ("NYY", vec![entry("Judge", 98.0, 0.8)]),
            ("LAD", vec![entry("Ohtani", 97.0, 0.9), entry("Betts", 80.0, 0.6)]),
        ])
    }

    // ---- Slate driver ----

    #[test]
    fn slate_has_one_row_per_rostered_player() {
        let provider = three_team_provider();
        let rows = simulate_slate(&provider, &mut FixedSampler).unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn rows_are_tagged_with_team_and_opponent() {
        let provider = three_team_provider();
        let rows = simulate_slate(&provider, &mut FixedSampler).unwrap();

        let judge = rows.iter().find(|r| r.player == "Judge").unwrap();
        assert_eq!(judge.team, "NYY");
        assert_eq!(judge.opponent, "BAL");
        // A team never plays itself.
        for row in &rows {
            assert_ne!(row.team, row.opponent);
        }
    }

    #[test]
    fn empty_roster_is_skipped_not_fatal() {
        let provider = StaticProvider::new(vec![
            ("BAL", vec![entry("Henderson", 85.0, 0.7)]),
            ("NYY", vec![]),
        ]);
        let rows = simulate_slate(&provider, &mut FixedSampler).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "BAL");
    }

    #[test]
    fn malformed_lineup_is_skipped_not_fatal() {
        let provider = StaticProvider::new(vec![
            ("BAL", vec![entry("Henderson", 85.0, 0.7)]),
            ("NYY", vec![LineupEntry::new("No Attrs", &[])]),
        ]);
        let rows = simulate_slate(&provider, &mut FixedSampler).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].team, "BAL");
    }

    #[test]
    fn single_team_slate_is_empty() {
        let provider = StaticProvider::new(vec![("BAL", vec![entry("Henderson", 85.0, 0.7)])]);
        let rows = simulate_slate(&provider, &mut FixedSampler).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn fixed_sampler_slate_is_deterministic() {
        let provider = three_team_provider();
        let a = simulate_slate(&provider, &mut FixedSampler).unwrap();
        let b = simulate_slate(&provider, &mut FixedSampler).unwrap();
        assert_eq!(a, b);
    }

    // ---- RandomSampler ----

    #[test]
    fn random_sampler_respects_configured_ranges() {
        let mut sampler = RandomSampler::seeded(7, default_simulation_config());

        for _ in 0..200 {
            let c = sampler.sample();
            assert!(bounds::HR_PER9.contains(&c.pitcher.hr_per9));
            assert!(bounds::VELOCITY.contains(&c.pitcher.avg_velocity));
            assert!(bounds::SLIDER_PCT.contains(&c.pitcher.slider_pct));
            assert!(bounds::CURVE_PCT.contains(&c.pitcher.curve_pct));
            assert!(bounds::FASTBALL_PCT.contains(&c.pitcher.fastball_pct));
            assert!(bounds::TEMP_F.contains(&c.weather.temp_f));
            assert!(bounds::WIND_SPEED.contains(&c.weather.wind_speed));
            assert!(bounds::HUMIDITY_PCT.contains(&c.weather.humidity_pct));
        }
    }

    #[test]
    fn seeded_sampler_is_reproducible() {
        let mut a = RandomSampler::seeded(42, default_simulation_config());
        let mut b = RandomSampler::seeded(42, default_simulation_config());
        for _ in 0..20 {
            assert_eq!(a.sample(), b.sample());
        }
    }

    #[test]
    fn random_opponent_is_never_self() {
        let teams: Vec<String> = ["BAL", "NYY", "LAD", "SEA"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut sampler = RandomSampler::seeded(3, default_simulation_config());

        for _ in 0..100 {
            let opp = sampler.pick_opponent("BAL", &teams).unwrap();
            assert_ne!(opp, "BAL");
        }
        assert_eq!(sampler.pick_opponent("BAL", &["BAL".to_string()]), None);
    }

    // ---- CSV export ----

    #[test]
    fn export_path_is_dated() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 28).unwrap();
        let path = export_path(Path::new("/tmp"), date);
        assert_eq!(
            path,
            PathBuf::from("/tmp/simulated_hr_predictions_2026-08-28.csv")
        );
    }

    #[test]
    fn csv_round_trip_recovers_rows() {
        let provider = three_team_provider();
        let rows = simulate_slate(&provider, &mut FixedSampler).unwrap();

        let path = std::env::temp_dir().join("slatecast_roundtrip_test.csv");
        write_slate_csv(&rows, &path).unwrap();

        // Header row plus one line per row, no index column.
        let raw = std::fs::read_to_string(&path).unwrap();
        let mut lines = raw.lines();
        assert_eq!(lines.next(), Some("player,probability,team,opponent"));
        assert_eq!(lines.count(), rows.len());

        let recovered = read_slate_csv(&path).unwrap();
        assert_eq!(recovered, rows);
    }

    #[test]
    fn empty_slate_export_is_header_only() {
        let path = std::env::temp_dir().join("slatecast_empty_export_test.csv");
        write_slate_csv(&[], &path).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert_eq!(raw.trim_end(), "player,probability,team,opponent");
        assert!(read_slate_csv(&path).unwrap().is_empty());
    }
}
