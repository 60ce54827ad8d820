//! World Configuration
//!
//! Environmental constants applied uniformly every tick.

use serde::{Deserialize, Serialize};

use crate::core::error::{PhysicsError, Result};

/// Configuration for a [`CollisionWorld`](super::world::CollisionWorld).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Vertical velocity removed per tick while airborne (not scaled by dt)
    pub gravity: f32,
    /// Fraction of velocity lost per tick, in `[0, 1]`
    pub friction: f32,
    /// Height of the implicit resting plane
    pub ground_height: f32,
    /// Heights at or below this (relative to the plane) count as resting
    pub ground_epsilon: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: 0.5,
            friction: 0.05, // ~0.95 velocity retained per tick
            ground_height: 0.0,
            ground_epsilon: 1e-3,
        }
    }
}

impl WorldConfig {
    /// Parse a JSON config; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !self.gravity.is_finite() || self.gravity < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "gravity must be finite and non-negative, got {}",
                self.gravity
            )));
        }
        if !(0.0..=1.0).contains(&self.friction) {
            return Err(PhysicsError::InvalidConfig(format!(
                "friction must be in [0, 1], got {}",
                self.friction
            )));
        }
        if !self.ground_height.is_finite() {
            return Err(PhysicsError::InvalidConfig(format!(
                "ground height must be finite, got {}",
                self.ground_height
            )));
        }
        if !self.ground_epsilon.is_finite() || self.ground_epsilon < 0.0 {
            return Err(PhysicsError::InvalidConfig(format!(
                "ground epsilon must be finite and non-negative, got {}",
                self.ground_epsilon
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorldConfig::from_json(r#"{ "friction": 0.2 }"#).unwrap();
        assert_eq!(config.friction, 0.2);
        assert_eq!(config.gravity, WorldConfig::default().gravity);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let bad = WorldConfig { friction: 1.5, ..Default::default() };
        assert!(matches!(bad.validate(), Err(PhysicsError::InvalidConfig(_))));

        let bad = WorldConfig { gravity: -1.0, ..Default::default() };
        assert!(bad.validate().is_err());

        let bad = WorldConfig { ground_epsilon: f32::NAN, ..Default::default() };
        assert!(bad.validate().is_err());

        assert!(WorldConfig::from_json(r#"{ "friction": -0.1 }"#).is_err());
    }
}
