//! Engine configuration.

use crate::constants::{POP_HARD_LIMIT, POP_TARGET, WORLD_X, WORLD_Y};
use crate::rng::TurnRng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while validating a [`WorldConfig`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Static parameters of a world. Everything not listed here is a fixed
/// constant of the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldConfig {
    /// World width in cells.
    pub world_x: i32,
    /// World height in cells; must be even so hex row parity wraps.
    pub world_y: i32,
    /// Seed for the engine's sole randomness source.
    pub rng_seed: i64,
    /// Population the agediv regulator steers toward.
    pub target_pop: i64,
    /// Population beyond which agediv snaps to the oldest bug's age.
    pub pop_hard_limit: i64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_x: WORLD_X,
            world_y: WORLD_Y,
            rng_seed: TurnRng::DEFAULT_SEED,
            target_pop: POP_TARGET,
            pop_hard_limit: POP_HARD_LIMIT,
        }
    }
}

impl WorldConfig {
    /// Checks the configuration for values the engine cannot run on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.world_x < 8 || self.world_y < 8 {
            return Err(ConfigError::Invalid("world dimensions must be at least 8"));
        }
        if self.world_y % 2 != 0 {
            return Err(ConfigError::Invalid(
                "world height must be even for toroidal hex wrap",
            ));
        }
        if self.target_pop < 1 {
            return Err(ConfigError::Invalid("target_pop must be positive"));
        }
        if self.pop_hard_limit < self.target_pop {
            return Err(ConfigError::Invalid(
                "pop_hard_limit cannot be below target_pop",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn odd_height_is_rejected() {
        let config = WorldConfig {
            world_y: 159,
            ..WorldConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::Invalid(
                "world height must be even for toroidal hex wrap"
            ))
        );
    }

    #[test]
    fn hard_limit_below_target_is_rejected() {
        let config = WorldConfig {
            target_pop: 100,
            pop_hard_limit: 50,
            ..WorldConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
