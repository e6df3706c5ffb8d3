// Home-run probability scoring.
//
// `predict_hr` maps a lineup plus one pitcher profile and one weather
// profile onto a per-player home-run probability. The model is a fixed
// constant-weight heuristic: a base rate from intrinsic batter attributes,
// scaled by multiplicative adjustments for pitcher susceptibility, pitch
// mix, and ballpark weather. No fitted model, no randomness — identical
// inputs produce bit-identical output.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::roster::LineupEntry;

// ---------------------------------------------------------------------------
// Input profiles
// ---------------------------------------------------------------------------

/// Opposing pitcher tendencies.
///
/// Usage percentages are intentionally NOT validated to sum to 100; the gap
/// is read as "other pitch types" and accepted as-is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PitcherProfile {
    /// Home runs allowed per nine innings pitched.
    pub hr_per9: f64,
    /// Average fastball velocity, mph.
    pub avg_velocity: f64,
    pub slider_pct: f64,
    pub curve_pct: f64,
    pub fastball_pct: f64,
}

/// Which way the wind is blowing relative to the outfield fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindDirection {
    /// Ball carries out of the park (+1).
    Out,
    /// Crosswind, neutral (0).
    Cross,
    /// Wind blows in, suppressing carry (-1).
    In,
}

impl WindDirection {
    /// The signed multiplier the wind term uses: Out=+1, Cross=0, In=-1.
    pub fn multiplier(self) -> f64 {
        match self {
            WindDirection::Out => 1.0,
            WindDirection::Cross => 0.0,
            WindDirection::In => -1.0,
        }
    }

    pub fn from_multiplier(m: i8) -> Option<Self> {
        match m {
            1 => Some(WindDirection::Out),
            0 => Some(WindDirection::Cross),
            -1 => Some(WindDirection::In),
            _ => None,
        }
    }
}

/// Game-time weather at the ballpark.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherProfile {
    pub temp_f: f64,
    pub wind_speed: f64,
    pub wind_dir: WindDirection,
    pub humidity_pct: f64,
}

// ---------------------------------------------------------------------------
// Output table
// ---------------------------------------------------------------------------

/// One lineup entry joined with its computed home-run probability.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredRow {
    pub entry: LineupEntry,
    /// Intended range [0, 1] but deliberately not clamped — constants keep
    /// it in range over the documented input bounds, and out-of-bounds
    /// inputs should be visible rather than masked.
    pub probability: f64,
    pub narrative: Option<String>,
}

/// Scored lineup, sorted descending by probability. Ties keep the original
/// batting order (stable sort).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoredTable {
    pub rows: Vec<ScoredRow>,
}

impl ScoredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredRow> {
        self.rows.iter()
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ScoringError {
    /// A lineup entry lacks an attribute the model requires. Core inputs
    /// are never silently defaulted: a made-up probability would be worse
    /// than no probability.
    #[error("lineup entry for {player} is missing required attribute `{attribute}`")]
    MissingAttribute { player: String, attribute: String },
}

// ---------------------------------------------------------------------------
// Model constants
// ---------------------------------------------------------------------------

/// Attributes every lineup entry must carry for scoring.
pub const REQUIRED_ATTRIBUTES: &[&str] = &["power", "recent_form"];

// Base rate: floor plus a per-point power term. Power is on a 0-100 scouting
// scale, so the base spans roughly 1.2% (no power) to 10.2% (max power).
const BASE_FLOOR: f64 = 0.012;
const POWER_COEFF: f64 = 0.0009;

// Recent form is a 0-1 hot/cold scale mapped onto a 0.8x-1.2x multiplier.
const FORM_FLOOR: f64 = 0.8;
const FORM_SPAN: f64 = 0.4;

// Pitcher susceptibility, centered on a league-average 1.1 HR/9.
const LEAGUE_HR_PER9: f64 = 1.1;
const HR_PER9_COEFF: f64 = 0.25;

// Velocity: harder fastballs leave faster. Centered on 93 mph.
const LEAGUE_VELOCITY: f64 = 93.0;
const VELOCITY_COEFF: f64 = 0.01;

// Pitch mix: fastball share raises the rate, breaking-ball share lowers it.
const LEAGUE_FASTBALL_PCT: f64 = 55.0;
const FASTBALL_COEFF: f64 = 0.002;
const LEAGUE_BREAKING_PCT: f64 = 35.0;
const BREAKING_COEFF: f64 = 0.0015;

// Weather: warm air and outward wind carry the ball, humidity deadens it.
const LEAGUE_TEMP_F: f64 = 72.0;
const TEMP_COEFF: f64 = 0.004;
const WIND_COEFF: f64 = 0.006;
const LEAGUE_HUMIDITY_PCT: f64 = 50.0;
const HUMIDITY_COEFF: f64 = 0.001;

// ---------------------------------------------------------------------------
// Documented input bounds
// ---------------------------------------------------------------------------

/// Documented input ranges, matching the interactive sliders of the original
/// dashboard. The engine does not reject values outside these bounds, but
/// config validation requires sampling ranges to stay inside them.
pub mod bounds {
    use super::RangeInclusive;

    pub const HR_PER9: RangeInclusive<f64> = 0.5..=2.0;
    pub const VELOCITY: RangeInclusive<f64> = 88.0..=100.0;
    pub const SLIDER_PCT: RangeInclusive<f64> = 0.0..=50.0;
    pub const CURVE_PCT: RangeInclusive<f64> = 0.0..=40.0;
    pub const FASTBALL_PCT: RangeInclusive<f64> = 20.0..=80.0;
    pub const TEMP_F: RangeInclusive<f64> = 50.0..=100.0;
    pub const WIND_SPEED: RangeInclusive<f64> = 0.0..=20.0;
    pub const HUMIDITY_PCT: RangeInclusive<f64> = 20.0..=100.0;
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a lineup against one pitcher/weather context.
///
/// Produces exactly one row per input entry, re-sorted descending by
/// probability with ties in original batting order. An empty lineup yields
/// an empty table, not an error.
pub fn predict_hr(
    lineup: &[LineupEntry],
    pitcher: &PitcherProfile,
    weather: &WeatherProfile,
) -> Result<ScoredTable, ScoringError> {
    let pitcher_factor = pitcher_factor(pitcher);
    let weather_factor = weather_factor(weather);

    let mut rows = Vec::with_capacity(lineup.len());
    for entry in lineup {
        let power = require_attr(entry, "power")?;
        let form = require_attr(entry, "recent_form")?;

        let base = BASE_FLOOR + POWER_COEFF * power;
        let form_factor = FORM_FLOOR + FORM_SPAN * form;

        let probability = base * form_factor * pitcher_factor * weather_factor;

        rows.push(ScoredRow {
            entry: entry.clone(),
            probability,
            narrative: None,
        });
    }

    // Stable sort: equal probabilities keep batting order.
    rows.sort_by(|a, b| {
        b.probability
            .partial_cmp(&a.probability)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(ScoredTable { rows })
}

/// Combined pitcher adjustment: susceptibility, velocity, and pitch mix.
fn pitcher_factor(pitcher: &PitcherProfile) -> f64 {
    let susceptibility = 1.0 + HR_PER9_COEFF * (pitcher.hr_per9 - LEAGUE_HR_PER9);
    let velocity = 1.0 + VELOCITY_COEFF * (pitcher.avg_velocity - LEAGUE_VELOCITY);

    let breaking = pitcher.slider_pct + pitcher.curve_pct;
    let mix = 1.0 + FASTBALL_COEFF * (pitcher.fastball_pct - LEAGUE_FASTBALL_PCT)
        - BREAKING_COEFF * (breaking - LEAGUE_BREAKING_PCT);

    susceptibility * velocity * mix
}

/// Combined weather adjustment: temperature, signed wind, humidity.
fn weather_factor(weather: &WeatherProfile) -> f64 {
    let temp = 1.0 + TEMP_COEFF * (weather.temp_f - LEAGUE_TEMP_F);
    let wind = 1.0 + WIND_COEFF * weather.wind_speed * weather.wind_dir.multiplier();
    let humidity = 1.0 - HUMIDITY_COEFF * (weather.humidity_pct - LEAGUE_HUMIDITY_PCT);

    temp * wind * humidity
}

fn require_attr(entry: &LineupEntry, attribute: &str) -> Result<f64, ScoringError> {
    entry
        .attributes
        .get(attribute)
        .copied()
        .ok_or_else(|| ScoringError::MissingAttribute {
            player: entry.player.clone(),
            attribute: attribute.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
