//! Tuning and geometry for a [`Drive`](super::Drive).
//!
//! Every group here has a `Default` matching a typical V5 drivetrain, and
//! every field can be changed at runtime through the setters on `Drive`.

use std::{f64::consts::PI, time::Duration};

use crate::motion::pid::{ExitConditions, HeadingConstants, PidConstants, TICK};

/// Physical configuration of the drivetrain.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// The diameter of the drive wheels in inches.
    pub wheel_diameter: f64,
    /// Wheel revolutions per motor revolution.
    pub gear_ratio:     f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            wheel_diameter: 3.25,
            gear_ratio:     0.75,
        }
    }
}

impl Geometry {
    pub fn new(wheel_diameter: f64, gear_ratio: f64) -> Self {
        Self {
            wheel_diameter,
            gear_ratio,
        }
    }

    /// Converts a motor rotation in degrees to wheel travel in inches.
    pub fn inches(&self, degrees: f64) -> f64 {
        degrees / 360.0 * self.gear_ratio * PI * self.wheel_diameter
    }
}

/// Voltage ceilings for each kind of motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxVoltages {
    pub turn:    f64,
    pub drive:   f64,
    /// Ceiling for the heading-hold correction while driving.
    pub heading: f64,
}

impl Default for MaxVoltages {
    fn default() -> Self {
        Self {
            turn:    10.0,
            drive:   10.0,
            heading: 6.0,
        }
    }
}

/// Shaping constants for arcade control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcadeConstants {
    /// Gain of the reverse-voltage pulse applied when the sticks are
    /// released. Larger values stop harder.
    pub brake:        f64,
    /// How saturated stick input is shared between throttle and turn.
    /// Zero disables the redistribution.
    pub turn_bias:    f64,
    /// Scales the turn stick before shaping.
    pub turn_damping: f64,
}

impl Default for ArcadeConstants {
    fn default() -> Self {
        Self {
            brake:        0.5,
            turn_bias:    0.5,
            turn_damping: 0.85,
        }
    }
}

/// [`response_curve`](crate::util::response_curve) scales for each stick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurveScales {
    pub throttle: f64,
    pub turn:     f64,
}

impl Default for CurveScales {
    fn default() -> Self {
        Self {
            throttle: 5.0,
            turn:     10.0,
        }
    }
}

/// Everything tunable on a [`Drive`](super::Drive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveConfig {
    pub max_voltage: MaxVoltages,
    pub turn_pid:    PidConstants,
    pub turn_exit:   ExitConditions,
    pub drive_pid:   PidConstants,
    pub drive_exit:  ExitConditions,
    pub heading_pid: HeadingConstants,
    pub arcade:      ArcadeConstants,
    pub curve:       CurveScales,
    /// Time between control-loop ticks.
    pub loop_period: Duration,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            max_voltage: MaxVoltages::default(),
            turn_pid:    PidConstants::new(0.4, 0.03, 3.0, 15.0),
            turn_exit:   ExitConditions::new(
                1.5,
                Duration::from_millis(200),
                Duration::from_millis(1500),
            ),
            drive_pid:   PidConstants::new(1.5, 0.0, 10.0, 0.0),
            drive_exit:  ExitConditions::new(
                1.0,
                Duration::from_millis(200),
                Duration::from_millis(2000),
            ),
            heading_pid: HeadingConstants::new(0.4, 1.0),
            arcade:      ArcadeConstants::default(),
            curve:       CurveScales::default(),
            loop_period: TICK,
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn one_wheel_turn_is_one_circumference() {
        let geometry = Geometry::new(4.0, 1.0);
        assert_relative_eq!(geometry.inches(360.0), 4.0 * PI);
        assert_relative_eq!(geometry.inches(-180.0), -2.0 * PI);
    }

    #[test]
    fn gearing_scales_travel() {
        let geometry = Geometry::new(3.25, 0.75);
        assert_relative_eq!(geometry.inches(720.0), 2.0 * 0.75 * PI * 3.25);
    }
}
