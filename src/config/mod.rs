//! Configuration module - game parameters and environment variable parsing

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::game::catalog::AttackCatalog;
use crate::util::time::{tick_delta, DEFAULT_FPS};

/// Static game parameters, validated once at startup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Arena width in pixels
    pub screen_width: f32,
    /// Arena height in pixels
    pub screen_height: f32,
    /// Simulation ticks per second
    pub fps: u32,
    /// Height of the ground plane
    pub ground_y: f32,

    /// Horizontal speed (px/s)
    pub player_speed: f32,
    /// Upward velocity set by a jump (px/s)
    pub jump_speed: f32,
    /// Downward acceleration (px/s^2)
    pub gravity: f32,

    pub max_health: u32,
    /// Maximum horizontal distance at which an attack connects
    pub attack_range: f32,
    /// Post-hit grace period (seconds)
    pub invincibility_duration: f32,
    /// HUD hit flash duration (seconds)
    pub hit_flash_duration: f32,

    /// Minimum separation between fighter centres
    pub min_fighter_distance: f32,
    /// Accepted residual overlap below the minimum separation
    pub touch_tolerance: f32,
    /// Vertical gap above which fighters are not considered co-planar
    pub vertical_separation_threshold: f32,

    /// Round length (seconds)
    pub round_time_limit: f32,
    /// Rounds needed to win the match
    pub wins_to_match: u32,
    /// Pause between rounds (seconds)
    pub round_over_delay: f32,
    /// Time on the result screen before returning to the menu (seconds)
    pub match_over_delay: f32,

    /// Spawn x for player one and player two
    pub spawn_x: [f32; 2],

    /// Base attack profiles shared by every fighter
    pub attacks: AttackCatalog,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 1280.0,
            screen_height: 720.0,
            fps: DEFAULT_FPS,
            ground_y: 150.0,
            player_speed: 360.0,
            jump_speed: 900.0,
            gravity: 3240.0,
            max_health: 100,
            attack_range: 160.0,
            invincibility_duration: 0.25,
            hit_flash_duration: 1.0 / 6.0,
            min_fighter_distance: 110.0,
            touch_tolerance: 6.0,
            vertical_separation_threshold: 120.0,
            round_time_limit: 60.0,
            wins_to_match: 3,
            round_over_delay: 3.0,
            match_over_delay: 4.0,
            spawn_x: [400.0, 900.0],
            attacks: AttackCatalog::standard(),
        }
    }
}

impl GameConfig {
    /// Load parameters from a JSON file; missing fields keep their defaults
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Seconds simulated per tick
    pub fn tick_delta(&self) -> f32 {
        tick_delta(self.fps)
    }

    /// Reject configurations the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.screen_width > 0.0) || !(self.screen_height > 0.0) {
            return Err(ConfigError::invalid("screen", "dimensions must be positive"));
        }
        if self.fps == 0 {
            return Err(ConfigError::invalid("fps", "must be positive"));
        }
        for (field, value) in [
            ("player_speed", self.player_speed),
            ("jump_speed", self.jump_speed),
            ("gravity", self.gravity),
            ("round_time_limit", self.round_time_limit),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(field, "must be positive"));
            }
        }
        for (field, value) in [
            ("attack_range", self.attack_range),
            ("invincibility_duration", self.invincibility_duration),
            ("hit_flash_duration", self.hit_flash_duration),
            ("min_fighter_distance", self.min_fighter_distance),
            ("vertical_separation_threshold", self.vertical_separation_threshold),
            ("round_over_delay", self.round_over_delay),
            ("match_over_delay", self.match_over_delay),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::invalid(field, "must not be negative"));
            }
        }
        if self.max_health == 0 {
            return Err(ConfigError::invalid("max_health", "must be positive"));
        }
        if self.wins_to_match == 0 {
            return Err(ConfigError::invalid("wins_to_match", "must be positive"));
        }
        if !(self.touch_tolerance >= 0.0) || self.touch_tolerance >= self.min_fighter_distance {
            return Err(ConfigError::invalid(
                "touch_tolerance",
                "must be non-negative and below min_fighter_distance",
            ));
        }
        if self
            .spawn_x
            .iter()
            .any(|x| !(*x >= 0.0 && *x <= self.screen_width))
        {
            return Err(ConfigError::invalid("spawn_x", "spawn outside the screen"));
        }
        self.attacks.validate()
    }
}

/// Log line layout on stderr
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(ConfigError::InvalidValue("LOG_FORMAT")),
        }
    }
}

/// Host configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    pub log_format: LogFormat,
    /// Optional JSON file with game parameters
    pub game_config_path: Option<PathBuf>,
    /// Ticks between frame snapshots
    pub snapshot_interval: u32,
    /// Roster ids chosen for player one and player two
    pub fighters: [String; 2],
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let snapshot_interval = match env::var("SNAPSHOT_INTERVAL") {
            Ok(raw) => raw
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::InvalidValue("SNAPSHOT_INTERVAL"))?,
            Err(_) => 1,
        };
        let log_format = match env::var("LOG_FORMAT") {
            Ok(raw) => raw.parse()?,
            Err(_) => LogFormat::default(),
        };

        Ok(Self {
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_format,
            game_config_path: env::var("GAME_CONFIG").ok().map(PathBuf::from),
            snapshot_interval,
            fighters: [
                env::var("P1_FIGHTER").unwrap_or_else(|_| "tutankhamun".to_string()),
                env::var("P2_FIGHTER").unwrap_or_else(|_| "charlemagne".to_string()),
            ],
        })
    }

    /// Game parameters from `GAME_CONFIG`, or the validated defaults
    pub fn load_game_config(&self) -> Result<GameConfig, ConfigError> {
        match &self.game_config_path {
            Some(path) => GameConfig::from_json_file(path),
            None => {
                let config = GameConfig::default();
                config.validate()?;
                Ok(config)
            }
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(&'static str),

    #[error("Invalid game parameter `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}
