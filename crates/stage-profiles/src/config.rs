//! Configuration types for profile synthesis.

use serde::{Deserialize, Serialize};
use stages::PowerError;

/// Half-open range `[min, max)` of the integer draws that are scaled into segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRange {
    pub min: u32,
    pub max: u32,
}

impl DrawRange {
    /// Generic segment draws.
    pub const DEFAULT: DrawRange = DrawRange::new(1, 25);
    /// Distance segments.
    pub const DISTANCE: DrawRange = DrawRange::new(15, 25);
    /// Elevation segments of a synthesized stage profile.
    pub const ELEVATION: DrawRange = DrawRange::new(1, 10);

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<(), PowerError> {
        if self.min == 0 || self.min >= self.max {
            return Err(PowerError::InvalidInput(format!(
                "draw range must satisfy 1 <= min < max, got [{}, {})",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

impl Default for DrawRange {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Configuration for synthesizing stage profiles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    /// Draws for the per-peak climb segments.
    pub elevation_draws: DrawRange,

    /// Draws for the distance segments between valleys and peaks.
    pub distance_draws: DrawRange,

    /// Size of the final descent before an uphill finish, in draw units.
    pub final_dip_units: f64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            elevation_draws: DrawRange::ELEVATION,
            distance_draws: DrawRange::DISTANCE,
            final_dip_units: 5.0,
        }
    }
}

impl SynthesisConfig {
    pub fn validate(&self) -> Result<(), PowerError> {
        self.elevation_draws.validate()?;
        self.distance_draws.validate()?;
        if !self.final_dip_units.is_finite() {
            return Err(PowerError::InvalidInput(
                "final dip must be finite".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(SynthesisConfig::default().validate().is_ok());
        assert!(DrawRange::DEFAULT.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_range() {
        assert!(DrawRange::new(10, 10).validate().is_err());
        assert!(DrawRange::new(0, 10).validate().is_err());
    }

    #[test]
    fn test_config_from_json() {
        let config: SynthesisConfig = serde_json::from_str(
            r#"{"elevation_draws":{"min":2,"max":8},"distance_draws":{"min":10,"max":30},"final_dip_units":3.0}"#,
        )
        .unwrap();
        assert_eq!(config.elevation_draws, DrawRange::new(2, 8));
        assert_eq!(config.final_dip_units, 3.0);
    }
}
