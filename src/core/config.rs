use std::fs;
use std::path::Path;

use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::rules::scoring::ScoringRules;

/// Presentational delays on the virtual clock, in milliseconds.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pacing {
    /// Between the player's click and the feedback lines.
    pub feedback_delay_ms: u64,
    /// Between a completed location and the transit or mission-complete line.
    pub settle_delay_ms: u64,
    /// Between the transit line and entering the next location.
    pub advance_delay_ms: u64,
    /// When set, Intro moves to Playing on its own after this long.
    pub intro_auto_start_ms: Option<u64>,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            feedback_delay_ms: 600,
            settle_delay_ms: 1_000,
            advance_delay_ms: 3_000,
            intro_auto_start_ms: None,
        }
    }
}

impl Pacing {
    pub fn immediate() -> Self {
        Self {
            feedback_delay_ms: 0,
            settle_delay_ms: 0,
            advance_delay_ms: 0,
            intro_auto_start_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub pacing: Pacing,
    pub scoring: ScoringRules,
    pub leaderboard_limit: usize,
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pacing: Pacing::default(),
            scoring: ScoringRules::default(),
            leaderboard_limit: 10,
            seed: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Validation(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { path, source } => write!(f, "failed to read {}: {}", path, source),
            ConfigError::Json { path, source } => write!(f, "failed to parse {}: {}", path, source),
            ConfigError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: EngineConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Json {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::Validation(
                "leaderboard_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
