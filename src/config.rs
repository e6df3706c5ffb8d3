// Configuration loading and parsing (slatecast.toml, credentials.toml).

use serde::Deserialize;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::scoring::engine::bounds;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataConfig,
    pub simulation: SimulationConfig,
    pub llm: LlmConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// slatecast.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire slatecast.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SlatecastFile {
    data: DataConfig,
    simulation: SimulationConfig,
    llm: LlmConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Roster CSV path, relative to the working directory.
    pub rosters: String,
    /// Directory the dated slate export is written into.
    pub export_dir: String,
}

/// A closed sampling interval.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

/// Uniform sampling ranges for the slate simulator, one per pitcher/weather
/// input. Each must lie inside the documented input bounds of the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    pub hr_per9: Span,
    pub avg_velocity: Span,
    pub slider_pct: Span,
    pub curve_pct: Span,
    pub fastball_pct: Span,
    pub temp_f: Span,
    pub wind_speed: Span,
    pub humidity_pct: Span,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub max_tokens: u32,
    /// Per-request timeout for Q&A calls, seconds.
    pub timeout_secs: u64,
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub anthropic_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/slatecast.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// This is the lower-level loading primitive that does not auto-copy
/// defaults. Prefer `load_config()` which handles default initialization
/// automatically.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- slatecast.toml (required) ---
    let main_path = config_dir.join("slatecast.toml");
    let main_text = read_file(&main_path)?;
    let main_file: SlatecastFile =
        toml::from_str(&main_text).map_err(|e| ConfigError::ParseError {
            path: main_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        data: main_file.data,
        simulation: main_file.simulation,
        llm: main_file.llm,
        credentials,
    };

    validate(&config)?;

    Ok(config)
}

/// Load configuration from the current working directory, copying any
/// missing config files from `defaults/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let base_dir = Path::new(".");
    ensure_config_files(base_dir)?;
    load_config_from(base_dir)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        return Ok(Vec::new());
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot create {}: {e}", config_dir.display()),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("cannot read {}: {e}", defaults_dir.display()),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: e.to_string(),
        })?;
        let name = entry.file_name();
        if name.to_string_lossy().ends_with(".example") {
            continue;
        }

        let target = config_dir.join(&name);
        if target.exists() {
            continue;
        }

        std::fs::copy(entry.path(), &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("cannot copy {} -> {}: {e}", entry.path().display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.data.rosters.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.rosters".into(),
            message: "roster path must not be empty".into(),
        });
    }
    if config.data.export_dir.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.export_dir".into(),
            message: "export directory must not be empty".into(),
        });
    }

    validate_span("simulation.hr_per9", config.simulation.hr_per9, bounds::HR_PER9)?;
    validate_span(
        "simulation.avg_velocity",
        config.simulation.avg_velocity,
        bounds::VELOCITY,
    )?;
    validate_span(
        "simulation.slider_pct",
        config.simulation.slider_pct,
        bounds::SLIDER_PCT,
    )?;
    validate_span(
        "simulation.curve_pct",
        config.simulation.curve_pct,
        bounds::CURVE_PCT,
    )?;
    validate_span(
        "simulation.fastball_pct",
        config.simulation.fastball_pct,
        bounds::FASTBALL_PCT,
    )?;
    validate_span("simulation.temp_f", config.simulation.temp_f, bounds::TEMP_F)?;
    validate_span(
        "simulation.wind_speed",
        config.simulation.wind_speed,
        bounds::WIND_SPEED,
    )?;
    validate_span(
        "simulation.humidity_pct",
        config.simulation.humidity_pct,
        bounds::HUMIDITY_PCT,
    )?;

    if config.llm.model.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "llm.model".into(),
            message: "model must not be empty".into(),
        });
    }
    if config.llm.max_tokens == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.max_tokens".into(),
            message: "max_tokens must be > 0".into(),
        });
    }
    if config.llm.timeout_secs == 0 {
        return Err(ConfigError::ValidationError {
            field: "llm.timeout_secs".into(),
            message: "timeout_secs must be > 0".into(),
        });
    }

    Ok(())
}

/// A sampling span must be non-empty and stay inside the engine's
/// documented input bounds.
fn validate_span(
    field: &str,
    span: Span,
    allowed: RangeInclusive<f64>,
) -> Result<(), ConfigError> {
    if span.min > span.max {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!("min {} exceeds max {}", span.min, span.max),
        });
    }
    if !allowed.contains(&span.min) || !allowed.contains(&span.max) {
        return Err(ConfigError::ValidationError {
            field: field.into(),
            message: format!(
                "[{}, {}] falls outside the documented input range [{}, {}]",
                span.min,
                span.max,
                allowed.start(),
                allowed.end()
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Test support
// ---------------------------------------------------------------------------


// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
