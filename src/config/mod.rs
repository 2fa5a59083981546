//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::models::{Placing, StageResult, FINAL_CLASSIFICATION, MAX_TEAM_SIZE};
use crate::validate::RosterRules;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Points tables for placings.
///
/// Jersey bonuses are fixed and live on [`crate::models::Jersey`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Points for positions 1.. in a regular stage
    #[serde(default = "default_stage_points")]
    pub stage_points: Vec<u32>,

    /// Points for positions 1.. in the final classification
    #[serde(default = "default_final_points")]
    pub final_points: Vec<u32>,
}

fn default_stage_points() -> Vec<u32> {
    vec![30, 25, 20, 17, 15, 13, 11, 9, 7, 5]
}

fn default_final_points() -> Vec<u32> {
    vec![100, 80, 65, 55, 45, 35, 30, 25, 20, 15]
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            stage_points: default_stage_points(),
            final_points: default_final_points(),
        }
    }
}

impl ScoringConfig {
    /// Table points for a position in a stage. Positions past the table score 0.
    pub fn points_for(&self, stage: u32, position: u32) -> u32 {
        let table = if stage == FINAL_CLASSIFICATION {
            &self.final_points
        } else {
            &self.stage_points
        };
        position
            .checked_sub(1)
            .and_then(|i| table.get(i as usize))
            .copied()
            .unwrap_or(0)
    }

    /// Fill in points for placings that did not bring their own.
    pub fn fill_points(&self, result: &mut StageResult) {
        let stage = result.stage;
        for placing in &mut result.top10 {
            if placing.points.is_none() {
                placing.points = Some(self.points_for(stage, placing.position));
            }
        }
    }

    /// A copy of `result` with every placing scored.
    pub fn scored(&self, result: &StageResult) -> StageResult {
        let mut scored = result.clone();
        self.fill_points(&mut scored);
        scored
    }

    /// Whether a placing carries points the table would not give it.
    pub fn is_override(&self, stage: u32, placing: &Placing) -> bool {
        placing
            .points
            .is_some_and(|p| p != self.points_for(stage, placing.position))
    }
}

/// Team composition rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesConfig {
    #[serde(default = "default_max_team_size")]
    pub max_team_size: usize,

    /// Reject rosters where two participants picked the same rider
    #[serde(default)]
    pub exclusive_riders: bool,
}

fn default_max_team_size() -> usize {
    MAX_TEAM_SIZE
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_team_size: default_max_team_size(),
            exclusive_riders: false,
        }
    }
}

impl RulesConfig {
    pub fn roster_rules(&self) -> RosterRules {
        RosterRules {
            max_team_size: self.max_team_size,
            exclusive_riders: self.exclusive_riders,
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            scoring: ScoringConfig::default(),
            rules: RulesConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rules.max_team_size == 0 {
            return Err(ConfigError::ValidationError(
                "Maximum team size must be greater than 0".to_string(),
            ));
        }

        if self.scoring.stage_points.is_empty() {
            return Err(ConfigError::ValidationError(
                "Stage points table must not be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.rules.max_team_size, 12);
        assert!(!config.rules.exclusive_riders);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_points_for_positions() {
        let scoring = ScoringConfig::default();

        assert_eq!(scoring.points_for(1, 1), 30);
        assert_eq!(scoring.points_for(21, 10), 5);
        assert_eq!(scoring.points_for(3, 11), 0);
        assert_eq!(scoring.points_for(3, 0), 0);
        assert_eq!(scoring.points_for(22, 1), 100);
    }

    #[test]
    fn test_fill_points_keeps_explicit_values() {
        let scoring = ScoringConfig::default();
        let mut result = StageResult::new(2).with_placing(1, "A", 42);
        result.top10.push(Placing::unscored(2, "B"));

        scoring.fill_points(&mut result);

        assert_eq!(result.top10[0].points, Some(42));
        assert_eq!(result.top10[1].points, Some(25));
        assert!(scoring.is_override(2, &result.top10[0]));
        assert!(!scoring.is_override(2, &result.top10[1]));
    }

    #[test]
    fn test_config_validation_ok() {
        assert!(AppConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_team_size() {
        let mut config = AppConfig::default();
        config.rules.max_team_size = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_stage_table() {
        let mut config = AppConfig::default();
        config.scoring.stage_points.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [scoring]
            stage_points = [50, 40, 30]

            [rules]
            exclusive_riders = true
            "#,
        )
        .unwrap();

        assert_eq!(config.scoring.stage_points, vec![50, 40, 30]);
        assert_eq!(config.scoring.final_points, default_final_points());
        assert!(config.rules.exclusive_riders);
        assert_eq!(config.rules.max_team_size, 12);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.scoring, parsed.scoring);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }
}
