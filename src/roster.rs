// Roster loading: team list and ordered batting lineups.
//
// Rosters arrive as a single CSV with a `player` and `team` column; every
// other column is treated as an opaque numeric batter attribute and passed
// through to the scoring engine untouched. Which attributes the engine
// actually requires is the engine's business, not ours.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// One batting-order slot: a player identifier plus whatever numeric
/// attributes the roster source exposes.
///
/// Attributes live in a `BTreeMap` so iteration order (and therefore any
/// derived output) is deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct LineupEntry {
    pub player: String,
    pub attributes: BTreeMap<String, f64>,
}

impl LineupEntry {
    /// Convenience constructor used heavily in tests.
    pub fn new(player: impl Into<String>, attributes: &[(&str, f64)]) -> Self {
        Self {
            player: player.into(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), *v))
                .collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("failed to read roster file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("roster file {path} is missing required column `{column}`")]
    MissingColumn { path: String, column: String },

    #[error("unknown team `{0}`")]
    UnknownTeam(String),
}

// ---------------------------------------------------------------------------
// RosterProvider trait
// ---------------------------------------------------------------------------

/// Source of team names and current lineups.
///
/// The batch driver and the scoring pipeline only ever talk to this trait,
/// so tests can supply fixed in-memory rosters and production can read a
/// file (or, later, a live feed) without touching either.
pub trait RosterProvider {
    /// All known team identifiers, in a stable order.
    fn all_teams(&self) -> Result<Vec<String>, RosterError>;

    /// The current batting order for `team`, top of the order first.
    fn current_roster(&self, team: &str) -> Result<Vec<LineupEntry>, RosterError>;
}

// ---------------------------------------------------------------------------
// CSV-backed provider
// ---------------------------------------------------------------------------

/// Roster provider backed by a single CSV file.
///
/// Expected shape: a header row containing at least `player` and `team`,
/// then one row per batting-order slot. Rows for the same team must appear
/// in batting order. Any additional column is parsed as an `f64` attribute;
/// a cell that fails to parse is dropped from that entry with a warning
/// rather than defaulted, so a downstream consumer that requires the
/// attribute fails loudly instead of scoring garbage.
#[derive(Debug, Clone)]
pub struct CsvRosterProvider {
    teams: Vec<String>,
    rosters: HashMap<String, Vec<LineupEntry>>,
}

impl CsvRosterProvider {
    pub fn load(path: &Path) -> Result<Self, RosterError> {
        let path_str = path.display().to_string();

        let mut reader = csv::Reader::from_path(path).map_err(|e| match e.kind() {
            csv::ErrorKind::Io(_) => RosterError::Io {
                path: path_str.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
            },
            _ => RosterError::Csv {
                path: path_str.clone(),
                source: e,
            },
        })?;

        let headers = reader
            .headers()
            .map_err(|e| RosterError::Csv {
                path: path_str.clone(),
                source: e,
            })?
            .clone();

        let player_idx = column_index(&headers, "player").ok_or_else(|| {
            RosterError::MissingColumn {
                path: path_str.clone(),
                column: "player".into(),
            }
        })?;
        let team_idx = column_index(&headers, "team").ok_or_else(|| {
            RosterError::MissingColumn {
                path: path_str.clone(),
                column: "team".into(),
            }
        })?;

        let mut teams: Vec<String> = Vec::new();
        let mut rosters: HashMap<String, Vec<LineupEntry>> = HashMap::new();

        for (row_num, record) in reader.records().enumerate() {
            let record = record.map_err(|e| RosterError::Csv {
                path: path_str.clone(),
                source: e,
            })?;

            let player = record.get(player_idx).unwrap_or("").trim().to_string();
            let team = record.get(team_idx).unwrap_or("").trim().to_string();

            if player.is_empty() || team.is_empty() {
                warn!(row = row_num + 2, "skipping roster row with empty player or team");
                continue;
            }

            let mut attributes = BTreeMap::new();
            for (idx, header) in headers.iter().enumerate() {
                if idx == player_idx || idx == team_idx {
                    continue;
                }
                let cell = record.get(idx).unwrap_or("").trim();
                match cell.parse::<f64>() {
                    Ok(value) => {
                        attributes.insert(header.to_string(), value);
                    }
                    Err(_) => {
                        warn!(
                            row = row_num + 2,
                            column = header,
                            %player,
                            "non-numeric attribute cell dropped"
                        );
                    }
                }
            }

            if !rosters.contains_key(&team) {
                teams.push(team.clone());
            }
            rosters
                .entry(team)
                .or_default()
                .push(LineupEntry { player, attributes });
        }

        Ok(Self { teams, rosters })
    }
}

impl RosterProvider for CsvRosterProvider {
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

/// Case-insensitive header lookup.
fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|h| h.trim().eq_ignore_ascii_case(name))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
