//! Engine configuration.
//!
//! Every payout constant the engines use lives here so reward curves can be
//! tuned without touching the game logic. Missing fields fall back to the
//! defaults below.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{path::Path, time::Duration};
use thiserror::Error;

use crate::arcade::{Difficulty, RiskLevel, MAX_MINES, STARTING_BALANCE, TOWERS_JACKPOT_GEMS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("{field} must be in (0, 1] (got {value})")]
    InvalidEdge { field: &'static str, value: f64 },
    #[error("{field} must be >= 0 (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be >= 1 (got {value})")]
    InvalidCap { field: &'static str, value: f64 },
    #[error("default_mines must be in 1..={max} (got {value})")]
    InvalidMines { value: u8, max: u8 },
    #[error("plinko jitter must be in [0, 0.5) (got {value})")]
    InvalidJitter { value: f64 },
}

/// Mines reward curve.
///
/// `mine_bonus_scale`, `risk_scale` and `risk_cap` juice payouts above the fair
/// odds: more mines and a larger share of the balance staked both pay more.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MinesConfig {
    pub house_edge: f64,
    pub mine_bonus_scale: f64,
    pub risk_scale: f64,
    pub risk_cap: f64,
    pub streak_scale: f64,
    pub level_growth: f64,
    pub bonus_cap: f64,
    pub default_mines: u8,
}

impl Default for MinesConfig {
    fn default() -> Self {
        Self {
            house_edge: 0.98,
            mine_bonus_scale: 0.3,
            risk_scale: 0.15,
            risk_cap: 1.0,
            streak_scale: 1.25,
            level_growth: 1.15,
            bonus_cap: 25.0,
            default_mines: 3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TowersConfig {
    pub house_edge: f64,
    pub jackpot_gems: u64,
    pub streak_scale: f64,
    pub mercy_per_loss: f64,
    pub bonus_cap: f64,
    pub default_difficulty: Difficulty,
}

impl Default for TowersConfig {
    fn default() -> Self {
        Self {
            house_edge: 0.98,
            jackpot_gems: TOWERS_JACKPOT_GEMS,
            streak_scale: 0.1,
            mercy_per_loss: 0.02,
            bonus_cap: 2.5,
            default_difficulty: Difficulty::Easy,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HiloConfig {
    pub house_edge: f64,
}

impl Default for HiloConfig {
    fn default() -> Self {
        Self { house_edge: 0.97 }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlinkoConfig {
    /// Landing jitter as a fraction of the bucket width.
    pub jitter: f64,
    pub default_rows: u8,
    pub default_risk: RiskLevel,
}

impl Default for PlinkoConfig {
    fn default() -> Self {
        Self {
            jitter: 0.15,
            default_rows: 9,
            default_risk: RiskLevel::Low,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AutoBetConfig {
    pub settle_delay_ms: u64,
}

impl Default for AutoBetConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 1_500,
        }
    }
}

impl AutoBetConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    pub starting_balance: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            starting_balance: STARTING_BALANCE,
        }
    }
}

/// Configuration for every round engine and the session manager.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EngineConfig {
    pub mines: MinesConfig,
    pub towers: TowersConfig,
    pub hilo: HiloConfig,
    pub plinko: PlinkoConfig,
    pub autobet: AutoBetConfig,
    pub session: SessionConfig,
}

fn check_edge(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidEdge { field, value })
    }
}

fn check_non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

fn check_cap(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value >= 1.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidCap { field, value })
    }
}

impl EngineConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml(document: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_yaml::from_str(document)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let document = std::fs::read_to_string(path)
            .with_context(|| format!("could not read config file {}", path.display()))?;
        Self::from_yaml(&document)
            .with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_edge("mines.house_edge", self.mines.house_edge)?;
        check_edge("towers.house_edge", self.towers.house_edge)?;
        check_edge("hilo.house_edge", self.hilo.house_edge)?;
        check_non_negative("mines.mine_bonus_scale", self.mines.mine_bonus_scale)?;
        check_non_negative("mines.risk_scale", self.mines.risk_scale)?;
        check_non_negative("mines.risk_cap", self.mines.risk_cap)?;
        check_non_negative("mines.streak_scale", self.mines.streak_scale)?;
        check_non_negative("towers.streak_scale", self.towers.streak_scale)?;
        check_non_negative("towers.mercy_per_loss", self.towers.mercy_per_loss)?;
        check_cap("mines.level_growth", self.mines.level_growth)?;
        check_cap("mines.bonus_cap", self.mines.bonus_cap)?;
        check_cap("towers.bonus_cap", self.towers.bonus_cap)?;
        if self.mines.default_mines == 0 || self.mines.default_mines > MAX_MINES {
            return Err(ConfigError::InvalidMines {
                value: self.mines.default_mines,
                max: MAX_MINES,
            });
        }
        if !(0.0..0.5).contains(&self.plinko.jitter) {
            return Err(ConfigError::InvalidJitter {
                value: self.plinko.jitter,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EngineConfig::from_yaml("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.mines.house_edge, 0.98);
        assert_eq!(config.towers.bonus_cap, 2.5);
        assert_eq!(config.autobet.settle_delay(), Duration::from_millis(1_500));
    }

    #[test]
    fn test_partial_override() {
        let config = EngineConfig::from_yaml(
            "mines:\n  risk_scale: 0.0\n  mine_bonus_scale: 0.0\ntowers:\n  default_difficulty: hard\nplinko:\n  default_risk: high\n",
        )
        .unwrap();
        assert_eq!(config.mines.risk_scale, 0.0);
        assert_eq!(config.mines.house_edge, 0.98);
        assert_eq!(config.towers.default_difficulty, Difficulty::Hard);
        assert_eq!(config.plinko.default_risk, RiskLevel::High);
    }

    #[test]
    fn test_rejects_bad_edge() {
        let err = EngineConfig::from_yaml("hilo:\n  house_edge: 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEdge { field: "hilo.house_edge", .. }));
    }

    #[test]
    fn test_rejects_bad_mines() {
        let err = EngineConfig::from_yaml("mines:\n  default_mines: 25\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidMines { value: 25, .. }));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(EngineConfig::load("/nonexistent/arcade.yaml").is_err());
    }
}
