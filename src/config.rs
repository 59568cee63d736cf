//! Configuration for the agenda engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub query: QueryConfig,
    pub agenda: AgendaConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [PathBuf::from("config.toml"), PathBuf::from("podium.toml")];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        if self.query.artist_events_limit == 0
            || self.query.upcoming_limit == 0
            || self.query.date_range_limit == 0
            || self.agenda.session_limit == 0
        {
            return Err(ConfigError::Invalid("result limits must be > 0".to_string()).into());
        }
        if self.query.upcoming_days_ahead <= 0 || self.agenda.session_days_ahead <= 0 {
            return Err(ConfigError::Invalid("day horizons must be > 0".to_string()).into());
        }
        Ok(())
    }
}

/// Store configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Directory for embedded-store persistence. In-memory only when unset.
    pub data_dir: Option<PathBuf>,
}

/// Query layer defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub artist_events_limit: usize,
    pub upcoming_limit: usize,
    pub upcoming_days_ahead: i64,
    pub date_range_limit: usize,
    pub attendee_profile_cap: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            artist_events_limit: crate::query::DEFAULT_ARTIST_EVENTS_LIMIT,
            upcoming_limit: crate::query::DEFAULT_UPCOMING_LIMIT,
            upcoming_days_ahead: crate::query::DEFAULT_UPCOMING_DAYS_AHEAD,
            date_range_limit: crate::query::DEFAULT_DATE_RANGE_LIMIT,
            attendee_profile_cap: crate::profiles::DEFAULT_PROFILE_CAP,
        }
    }
}

/// Agenda controller tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgendaConfig {
    /// Cap on the session-cached event list loaded at init.
    pub session_limit: usize,
    /// Horizon of the session-cached event list, in days.
    pub session_days_ahead: i64,
    /// Date-tape window behind the selected date, in days.
    pub tape_days_back: i64,
    /// Date-tape window ahead of the selected date, in days.
    pub tape_days_ahead: i64,
}

impl Default for AgendaConfig {
    fn default() -> Self {
        Self {
            session_limit: 100,
            session_days_ahead: 90,
            tape_days_back: 7,
            tape_days_ahead: 14,
        }
    }
}
