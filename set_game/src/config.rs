//! Game configuration.
//!
//! Values come from [`GameConfig::default`], a JSON file, or `SET_*`
//! environment variables layered over the defaults.

use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};

/// Read-only game parameters shared by the dealer and every player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Total number of players (default: 2)
    pub players: usize,

    /// How many of the players take manual input; the rest get a
    /// suggestion loop (default: 0)
    pub human_players: usize,

    /// Number of board slots (default: 12)
    pub table_size: usize,

    /// Number of distinct cards (default: 81)
    pub deck_size: usize,

    /// Cards per combination, which is also the token count per player
    /// (default: 3)
    pub feature_size: usize,

    /// Features per card, used by the default rules (default: 4)
    pub features: usize,

    /// Round length before a full reshuffle; 0 disables the countdown
    /// (default: 60s)
    pub turn_timeout_ms: u64,

    /// Remaining time under which the countdown is shown as a warning
    /// (default: 5s)
    pub turn_timeout_warning_ms: u64,

    /// Freeze after a successful claim (default: 1s)
    pub point_freeze_ms: u64,

    /// Freeze after an invalid claim (default: 3s)
    pub penalty_freeze_ms: u64,

    /// Artificial delay inside card placement and removal (default: 0)
    pub table_delay_ms: u64,

    /// Log every valid combination after each deal (default: false)
    pub hints: bool,

    /// Pause between suggestions of a non-human player (default: 5ms)
    pub ai_interval_ms: u64,

    /// Countdown refresh period inside the warning threshold (default: 50ms)
    pub warning_tick_ms: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            players: 2,
            human_players: 0,
            table_size: 12,
            deck_size: 81,
            feature_size: 3,
            features: 4,
            turn_timeout_ms: 60_000,
            turn_timeout_warning_ms: 5_000,
            point_freeze_ms: 1_000,
            penalty_freeze_ms: 3_000,
            table_delay_ms: 0,
            hints: false,
            ai_interval_ms: 5,
            warning_tick_ms: 50,
        }
    }
}

impl GameConfig {
    /// Parse a JSON document; missing fields keep their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Defaults overridden by `SET_PLAYERS`, `SET_HUMAN_PLAYERS`,
    /// `SET_TABLE_SIZE`, `SET_DECK_SIZE`, `SET_FEATURE_SIZE`, `SET_FEATURES`,
    /// `SET_TURN_TIMEOUT_MS`, `SET_TURN_TIMEOUT_WARNING_MS`,
    /// `SET_POINT_FREEZE_MS`, `SET_PENALTY_FREEZE_MS`, `SET_TABLE_DELAY_MS`,
    /// `SET_HINTS`, `SET_AI_INTERVAL_MS` and `SET_WARNING_TICK_MS`.
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            players: parse_env_or("SET_PLAYERS", defaults.players),
            human_players: parse_env_or("SET_HUMAN_PLAYERS", defaults.human_players),
            table_size: parse_env_or("SET_TABLE_SIZE", defaults.table_size),
            deck_size: parse_env_or("SET_DECK_SIZE", defaults.deck_size),
            feature_size: parse_env_or("SET_FEATURE_SIZE", defaults.feature_size),
            features: parse_env_or("SET_FEATURES", defaults.features),
            turn_timeout_ms: parse_env_or("SET_TURN_TIMEOUT_MS", defaults.turn_timeout_ms),
            turn_timeout_warning_ms: parse_env_or(
                "SET_TURN_TIMEOUT_WARNING_MS",
                defaults.turn_timeout_warning_ms,
            ),
            point_freeze_ms: parse_env_or("SET_POINT_FREEZE_MS", defaults.point_freeze_ms),
            penalty_freeze_ms: parse_env_or("SET_PENALTY_FREEZE_MS", defaults.penalty_freeze_ms),
            table_delay_ms: parse_env_or("SET_TABLE_DELAY_MS", defaults.table_delay_ms),
            hints: parse_env_or("SET_HINTS", defaults.hints),
            ai_interval_ms: parse_env_or("SET_AI_INTERVAL_MS", defaults.ai_interval_ms),
            warning_tick_ms: parse_env_or("SET_WARNING_TICK_MS", defaults.warning_tick_ms),
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.players == 0 {
            return Err(ConfigError::invalid("players", "must be at least 1"));
        }

        if self.human_players > self.players {
            return Err(ConfigError::invalid(
                "human_players",
                format!("cannot exceed players ({})", self.players),
            ));
        }

        if self.feature_size < 2 {
            return Err(ConfigError::invalid("feature_size", "must be at least 2"));
        }

        if self.table_size < self.feature_size {
            return Err(ConfigError::invalid(
                "table_size",
                format!("must hold at least feature_size ({}) cards", self.feature_size),
            ));
        }

        if self.deck_size == 0 {
            return Err(ConfigError::invalid("deck_size", "must be greater than 0"));
        }

        if self.turn_timeout_ms > 0 && self.turn_timeout_warning_ms > self.turn_timeout_ms {
            return Err(ConfigError::invalid(
                "turn_timeout_warning_ms",
                format!("cannot exceed turn_timeout_ms ({})", self.turn_timeout_ms),
            ));
        }

        if self.warning_tick_ms == 0 {
            return Err(ConfigError::invalid("warning_tick_ms", "must be greater than 0"));
        }

        Ok(())
    }

    /// Player ids that take manual input. Humans come first.
    pub fn is_human(&self, player: usize) -> bool {
        player < self.human_players
    }

    pub fn turn_timeout(&self) -> Option<Duration> {
        (self.turn_timeout_ms > 0).then(|| Duration::from_millis(self.turn_timeout_ms))
    }

    pub fn turn_timeout_warning(&self) -> Duration {
        Duration::from_millis(self.turn_timeout_warning_ms)
    }

    pub fn point_freeze(&self) -> Duration {
        Duration::from_millis(self.point_freeze_ms)
    }

    pub fn penalty_freeze(&self) -> Duration {
        Duration::from_millis(self.penalty_freeze_ms)
    }

    pub fn table_delay(&self) -> Duration {
        Duration::from_millis(self.table_delay_ms)
    }

    pub fn ai_interval(&self) -> Duration {
        Duration::from_millis(self.ai_interval_ms)
    }

    pub fn warning_tick(&self) -> Duration {
        Duration::from_millis(self.warning_tick_ms)
    }
}

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration for {field}: {reason}")]
    Invalid { field: String, reason: String },

    #[error("Malformed configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Cannot read configuration file: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    fn invalid(field: &str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.to_string(),
            reason: reason.into(),
        }
    }
}

/// Helper to parse environment variable with default fallback
fn parse_env_or<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
