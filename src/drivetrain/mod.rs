//! Differential drivetrain control.
//!
//! This module provides the [`Drive`] struct for controlling robots with
//! separate left and right motor groups and an inertial sensor. One `Drive`
//! lives for the whole program and offers:
//!
//! - **Closed-loop motions**: [`Drive::turn_to_heading`] and
//!   [`Drive::drive_distance`] block until the motion settles, times out or
//!   is halted through the drive's [`HaltToken`].
//! - **Operator control**: arcade, tank and mecanum mixing, one call per
//!   controller sample (see [`crate::opcontrol`]).
//! - **Passthrough**: [`Drive::drive_with_voltage`] and [`Drive::stop`].
//!
//! # Example
//!
//! ```
//! use chassis::{
//!     drivetrain::{Drive, Geometry},
//!     hardware::{BrakeMode, sim::SimDrivetrain},
//! };
//!
//! let sim = SimDrivetrain::default();
//! let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::new(3.25, 0.75));
//! drive.set_drive_pid(1.5, 0.0, 10.0, 0.0);
//!
//! drive.set_heading(0.0);
//! drive.drive_distance(24.0);
//! drive.stop(BrakeMode::Coast);
//! ```

use std::{fmt, time::Duration};

use log::{debug, warn};

use crate::{
    hardware::{BrakeMode, Delay, HardwareError, HeadingSensor, MotorGroup},
    motion::{
        HaltToken,
        pid::{ExitConditions, HeadingConstants, PidConstants},
    },
};

/// Drivetrain tuning and geometry types.
pub mod config;

mod motion;

pub use config::{ArcadeConstants, CurveScales, DriveConfig, Geometry, MaxVoltages};

/// A differential drivetrain controller.
///
/// Owns the left and right motor groups, the heading sensor and the delay
/// used between control-loop ticks. Each motion takes `&mut self`, so only
/// one motion can run on a drive at a time.
///
/// Motor groups on opposite sides typically need to spin in opposite
/// directions to move the robot forward. Configure motor directions in the
/// groups themselves; the drive treats positive voltage as forward on both
/// sides.
pub struct Drive<M, S, D> {
    pub(crate) left:           M,
    pub(crate) right:          M,
    pub(crate) imu:            S,
    pub(crate) delay:          D,
    pub(crate) geometry:       Geometry,
    pub(crate) config:         DriveConfig,
    /// Heading held by distance-only drives, in `[0, 360)` after a motion.
    pub(crate) target_heading: f64,
    /// Operator control powered the motors and has not stopped them yet.
    pub(crate) needs_stop:     bool,
    pub(crate) stop_mode:      BrakeMode,
    pub(crate) halt:           HaltToken,
}

impl<M: MotorGroup, S: HeadingSensor, D: Delay> Drive<M, S, D> {
    /// Creates a drive with the default [`DriveConfig`].
    pub fn new(left: M, right: M, imu: S, delay: D, geometry: Geometry) -> Self {
        Self {
            left,
            right,
            imu,
            delay,
            geometry,
            config: DriveConfig::default(),
            target_heading: 0.0,
            needs_stop: false,
            stop_mode: BrakeMode::Coast,
            halt: HaltToken::new(),
        }
    }

    /// Replaces the whole tuning set.
    pub fn with_config(mut self, config: DriveConfig) -> Self {
        self.config = config;
        self
    }

    /// Shares `halt` with this drive, so one token can halt several drives.
    pub fn with_halt_token(mut self, halt: HaltToken) -> Self {
        self.halt = halt;
        self
    }

    pub fn config(&self) -> &DriveConfig { &self.config }

    pub fn geometry(&self) -> Geometry { self.geometry }

    /// Returns a handle that halts running motions from anywhere.
    pub fn halt_token(&self) -> HaltToken { self.halt.clone() }

    /// The heading held by distance-only drives.
    pub fn target_heading(&self) -> f64 { self.target_heading }

    /// The brake mode used when operator control releases the sticks.
    pub fn stop_mode(&self) -> BrakeMode { self.stop_mode }

    /// Whether operator control still has to stop the motors.
    pub fn needs_stop(&self) -> bool { self.needs_stop }

    /// The control loop's clock, as kept by the drive's [`Delay`].
    pub fn now(&self) -> Duration { self.delay.now() }

    /// Sets the voltage ceilings for turning, driving and heading hold.
    pub fn set_max_voltage(&mut self, turn: f64, drive: f64, heading: f64) {
        self.config.max_voltage = MaxVoltages {
            turn,
            drive,
            heading,
        };
    }

    /// Sets the PID constants for turning.
    pub fn set_turn_pid(&mut self, kp: f64, ki: f64, kd: f64, starti: f64) {
        self.config.turn_pid = PidConstants::new(kp, ki, kd, starti);
    }

    /// Sets the exit conditions for turning. Settle error is in degrees.
    pub fn set_turn_exit_conditions(
        &mut self,
        settle_error: f64,
        settle_time: Duration,
        timeout: Duration,
    ) {
        self.config.turn_exit = ExitConditions::new(settle_error, settle_time, timeout);
    }

    /// Sets the PID constants for driving.
    pub fn set_drive_pid(&mut self, kp: f64, ki: f64, kd: f64, starti: f64) {
        self.config.drive_pid = PidConstants::new(kp, ki, kd, starti);
    }

    /// Sets the exit conditions for driving. Settle error is in inches.
    pub fn set_drive_exit_conditions(
        &mut self,
        settle_error: f64,
        settle_time: Duration,
        timeout: Duration,
    ) {
        self.config.drive_exit = ExitConditions::new(settle_error, settle_time, timeout);
    }

    /// Sets the PD constants for holding heading while driving.
    pub fn set_heading_pid(&mut self, kp: f64, kd: f64) {
        self.config.heading_pid = HeadingConstants::new(kp, kd);
    }

    /// Sets the constants for arcade drive.
    pub fn set_arcade_constants(&mut self, brake: f64, turn_bias: f64, turn_damping: f64) {
        self.config.arcade = ArcadeConstants {
            brake,
            turn_bias,
            turn_damping,
        };
    }

    /// Sets the joystick response curve scales.
    pub fn set_curve_scales(&mut self, throttle: f64, turn: f64) {
        self.config.curve = CurveScales { throttle, turn };
    }

    /// Sets the time between control-loop ticks.
    pub fn set_loop_period(&mut self, period: Duration) { self.config.loop_period = period; }

    /// Returns the heading reported by the inertial sensor, unnormalized.
    ///
    /// A sensor error is logged and reads as zero.
    pub fn heading(&self) -> f64 {
        self.imu.heading().unwrap_or_else(|e| {
            warn!("Inertial Sensor Heading Error: {}", e);
            0.0
        })
    }

    /// Redefines the current heading, and holds it on later distance-only
    /// drives.
    pub fn set_heading(&mut self, degrees: f64) {
        report(self.imu.set_heading(degrees), "Inertial Sensor Set Heading");
        self.target_heading = degrees;
    }

    /// Position of the left side in inches.
    pub fn left_position(&self) -> f64 { self.geometry.inches(read_position(&self.left)) }

    /// Position of the right side in inches.
    pub fn right_position(&self) -> f64 { self.geometry.inches(read_position(&self.right)) }

    /// The average of both sides in inches.
    pub fn average_position(&self) -> f64 { (self.left_position() + self.right_position()) / 2.0 }

    /// Spins each side at the given voltage.
    pub fn drive_with_voltage(&mut self, left: f64, right: f64) {
        report(self.left.set_voltage(left), "Left Drive Voltage");
        report(self.right.set_voltage(right), "Right Drive Voltage");
    }

    /// Stops both sides with `mode`, keeps `mode` as the release behavior
    /// for operator control and zeroes both position counters.
    pub fn stop(&mut self, mode: BrakeMode) {
        debug!("Drivetrain stop ({:?})", mode);
        self.brake(mode);
        self.stop_mode = mode;
        self.reset_positions();
        self.needs_stop = false;
    }

    /// A snapshot of heading and distance for a status display.
    pub fn status(&self) -> DriveStatus {
        DriveStatus {
            heading:  self.heading(),
            distance: self.average_position(),
        }
    }

    pub(crate) fn brake(&mut self, mode: BrakeMode) {
        report(self.left.brake(mode), "Left Drive Brake");
        report(self.right.brake(mode), "Right Drive Brake");
    }

    pub(crate) fn reset_positions(&mut self) {
        report(self.left.reset_position(), "Left Drive Reset Position");
        report(self.right.reset_position(), "Right Drive Reset Position");
    }
}

/// Heading and traveled distance, printed as `heading: 90, dist: 24`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriveStatus {
    pub heading:  f64,
    pub distance: f64,
}

impl fmt::Display for DriveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "heading: {}, dist: {}",
            self.heading.trunc() as i64,
            self.distance.trunc() as i64
        )
    }
}

pub(crate) fn read_position<M: MotorGroup>(group: &M) -> f64 {
    group.position().unwrap_or_else(|e| {
        warn!("Error Getting Motor Encoder Position: {}", e);
        0.0
    })
}

pub(crate) fn report(result: Result<(), HardwareError>, action: &str) {
    if let Err(e) = result {
        warn!("{} Error: {}", action, e);
    }
}
