// Configuration loading and parsing (config/survivor.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

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
    /// Season year override. When absent the season is derived from the
    /// calendar (see `season::current_week`).
    pub season: Option<i32>,
    pub db_path: String,
    pub divisions_path: String,
    pub espn_base_url: String,
}

// ---------------------------------------------------------------------------
// survivor.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire survivor.toml file.
#[derive(Debug, Clone, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    pool: PoolSection,
    database: DatabaseSection,
    data: DataSection,
    espn: EspnSection,
}

#[derive(Debug, Clone, Deserialize, Default)]
struct PoolSection {
    season: Option<i32>,
}

#[derive(Debug, Clone, Deserialize)]
struct DatabaseSection {
    path: String,
}

#[derive(Debug, Clone, Deserialize)]
struct DataSection {
    divisions: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EspnSection {
    base_url: String,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/survivor.toml` relative to
/// `base_dir`. Prefer `load_config()`, which copies the default file first.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join("survivor.toml");
    let text = read_file(&path)?;
    let file: ConfigFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    let config = Config {
        season: file.pool.season,
        db_path: file.database.path,
        divisions_path: file.data.divisions,
        espn_base_url: file.espn.base_url,
    };

    validate(&config)?;

    Ok(config)
}

/// Ensure `config/survivor.toml` exists by copying it from `defaults/` when
/// missing. Returns true if the file was copied.
pub fn ensure_config_file(base_dir: &Path) -> Result<bool, ConfigError> {
    let source = base_dir.join("defaults").join("survivor.toml");
    let config_dir = base_dir.join("config");
    let target = config_dir.join("survivor.toml");

    if target.exists() {
        return Ok(false);
    }
    if !source.exists() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "neither {} nor {} found; run from the project root",
                target.display(),
                source.display()
            ),
        });
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;
    std::fs::copy(&source, &target).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {}: {e}", source.display()),
    })?;

    Ok(true)
}

/// Convenience wrapper: loads config relative to the current working
/// directory, copying the default file first if needed.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if let Some(season) = config.season {
        if !(1970..=2100).contains(&season) {
            return Err(ConfigError::ValidationError {
                field: "pool.season".into(),
                message: format!("implausible season year {season}"),
            });
        }
    }

    if config.db_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "database.path".into(),
            message: "must not be empty".into(),
        });
    }

    if config.divisions_path.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "data.divisions".into(),
            message: "must not be empty".into(),
        });
    }

    if !config.espn_base_url.starts_with("http") {
        return Err(ConfigError::ValidationError {
            field: "espn.base_url".into(),
            message: format!("must be an http(s) URL, got `{}`", config.espn_base_url),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
