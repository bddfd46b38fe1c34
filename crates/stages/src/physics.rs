//! Cycling power model.
//!
//! Converts slope, rider mass and velocity into the power a rider must produce,
//! by summing gravity, rolling resistance and aerodynamic drag and dividing
//! out drivetrain losses. All functions are pure.

use std::sync::LazyLock;

use enum_map::{EnumMap, enum_map};
use serde::{Deserialize, Serialize};

use crate::errors::PowerError;
use crate::models::ProfileClass;

/// Standard gravity, m/s².
pub const GRAVITY: f64 = 9.80665;
/// Bike mass added to every rider mass, kg.
pub const BIKE_MASS_KG: f64 = 6.8;
/// Rolling resistance term. Added to the force sum as-is, not scaled by the
/// normal force: a simplification the calibrated estimates depend on.
pub const ROLLING_RESISTANCE: f64 = 0.0050;
/// Drag coefficient times frontal area, m².
pub const CDA: f64 = 0.3;
pub const SEA_LEVEL_AIR_DENSITY: f64 = 1.225;
pub const AIR_DENSITY_DECAY: f64 = 0.000_118_56;
/// Elevation at which air density is evaluated, m.
pub const REFERENCE_ELEVATION_M: f64 = 375.0;
pub const WIND_SPEED_M_S: f64 = 0.0;
pub const DRIVETRAIN_LOSS: f64 = 0.03;

/// A slope/velocity multiplier pair applied to the stage averages.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub slope_factor: f64,
    pub velocity_factor: f64,
}

impl Scenario {
    pub const fn new(slope_factor: f64, velocity_factor: f64) -> Self {
        Self {
            slope_factor,
            velocity_factor,
        }
    }
}

/// Two scenarios per class; the profile estimate is their mean.
static PROFILE_SCENARIOS: LazyLock<EnumMap<ProfileClass, [Scenario; 2]>> = LazyLock::new(|| {
    enum_map! {
        ProfileClass::Flat => [Scenario::new(0.5, 1.0), Scenario::new(0.5, 1.0)],
        ProfileClass::HillsFlatFinish => [Scenario::new(0.5, 1.0), Scenario::new(1.0, 1.0)],
        ProfileClass::HillsUphillFinish => [Scenario::new(0.5, 1.0), Scenario::new(1.0, 1.0)],
        ProfileClass::MountainsFlatFinish => [Scenario::new(1.5, 0.5), Scenario::new(1.5, 0.5)],
        ProfileClass::MountainsUphillFinish => [Scenario::new(1.5, 0.5), Scenario::new(1.5, 0.5)],
    }
});

pub fn profile_scenarios(class: ProfileClass) -> [Scenario; 2] {
    PROFILE_SCENARIOS[class]
}

/// Force terms at one operating point, N.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceComponents {
    pub gravity: f64,
    pub rolling_resistance: f64,
    pub aerodynamic_drag: f64,
}

impl ForceComponents {
    pub fn at(slope: f64, mass_kg: f64, velocity_m_s: f64) -> Result<Self, PowerError> {
        Ok(Self {
            gravity: gravitational_force(slope, mass_kg)?,
            rolling_resistance: rolling_resistance_force(),
            aerodynamic_drag: aerodynamic_drag_force(velocity_m_s)?,
        })
    }

    pub fn total(&self) -> f64 {
        self.gravity + self.rolling_resistance + self.aerodynamic_drag
    }
}

/// Gravity component along the road. `slope` is rise/run, not a percentage.
pub fn gravitational_force(slope: f64, mass_kg: f64) -> Result<f64, PowerError> {
    check_slope(slope)?;
    check_mass(mass_kg)?;
    finite(
        "gravitational force",
        GRAVITY * slope.atan().sin() * (mass_kg + BIKE_MASS_KG),
    )
}

pub fn rolling_resistance_force() -> f64 {
    ROLLING_RESISTANCE
}

/// Air density (kg/m³) at the given elevation.
pub fn air_density(elevation_m: f64) -> Result<f64, PowerError> {
    if !elevation_m.is_finite() {
        return Err(PowerError::invalid(format!(
            "elevation must be finite, got {elevation_m}"
        )));
    }
    finite(
        "air density",
        SEA_LEVEL_AIR_DENSITY * (-AIR_DENSITY_DECAY * elevation_m).exp(),
    )
}

pub fn aerodynamic_drag_force(velocity_m_s: f64) -> Result<f64, PowerError> {
    check_velocity(velocity_m_s)?;
    let airspeed = velocity_m_s + WIND_SPEED_M_S;
    finite(
        "aerodynamic drag",
        0.5 * CDA * air_density(REFERENCE_ELEVATION_M)? * airspeed.powi(2),
    )
}

/// Power (W) needed to hold `velocity_m_s` on `slope` with rider mass `mass_kg`.
///
/// Descents (negative slopes) are allowed and may yield negative power.
/// Zero velocity yields zero power.
pub fn required_power(slope: f64, mass_kg: f64, velocity_m_s: f64) -> Result<f64, PowerError> {
    let forces = ForceComponents::at(slope, mass_kg, velocity_m_s)?;
    let power = forces.total() * velocity_m_s / (1.0 - DRIVETRAIN_LOSS);
    if !power.is_finite() {
        return Err(PowerError::invalid(format!(
            "power is not finite for slope={slope}, mass={mass_kg}, velocity={velocity_m_s}"
        )));
    }
    Ok(power)
}

/// Mean power over a pair of slope/velocity scenarios.
pub fn required_power_for_scenarios(
    slope: f64,
    mass_kg: f64,
    velocity_m_s: f64,
    scenarios: [Scenario; 2],
) -> Result<f64, PowerError> {
    let mut sum = 0.0;
    for scenario in scenarios {
        sum += required_power(
            slope * scenario.slope_factor,
            mass_kg,
            velocity_m_s * scenario.velocity_factor,
        )?;
    }
    Ok(sum / scenarios.len() as f64)
}

/// Power adjusted to the terrain shape of the stage.
pub fn required_power_for_profile(
    slope: f64,
    mass_kg: f64,
    velocity_m_s: f64,
    class: ProfileClass,
) -> Result<f64, PowerError> {
    required_power_for_scenarios(slope, mass_kg, velocity_m_s, profile_scenarios(class))
}

fn check_slope(slope: f64) -> Result<(), PowerError> {
    if !slope.is_finite() {
        return Err(PowerError::invalid(format!("slope must be finite, got {slope}")));
    }
    Ok(())
}

fn check_mass(mass_kg: f64) -> Result<(), PowerError> {
    if !mass_kg.is_finite() || mass_kg < 0.0 {
        return Err(PowerError::invalid(format!(
            "mass must be a non-negative number, got {mass_kg}"
        )));
    }
    Ok(())
}

fn check_velocity(velocity_m_s: f64) -> Result<(), PowerError> {
    if !velocity_m_s.is_finite() {
        return Err(PowerError::invalid(format!(
            "velocity must be finite, got {velocity_m_s}"
        )));
    }
    Ok(())
}

fn finite(what: &str, value: f64) -> Result<f64, PowerError> {
    if !value.is_finite() {
        return Err(PowerError::invalid(format!("{what} is not finite")));
    }
    Ok(value)
}
