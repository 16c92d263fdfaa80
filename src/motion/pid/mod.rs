//! PID control for drivetrain motions.
//!
//! # How PID Works
//!
//! PID control calculates motor output based on three terms:
//!
//! - **P (Proportional)**: Output proportional to the error (distance from target).
//! - **I (Integral)**: Output proportional to accumulated error.
//! - **D (Derivative)**: Output proportional to the change in error since the
//!   last tick.
//!
//! The formula is: `output = Kp*error + Ki*sum + Kd*(error - previous)`
//!
//! The integral only accumulates once the error is smaller than `starti`,
//! and is thrown away whenever the error changes sign, so it can finish off
//! a motion without winding up during the approach.
//!
//! # Tuning
//!
//! Start with Kp and increase until the robot reaches the target.
//! Add Kd to reduce overshoot. Only add Ki (and a `starti` window) if the
//! robot consistently stops short.

use std::time::Duration;

/// The PID controller.
///
/// Provides [`Pid`](pid::Pid), created fresh for each motion.
#[allow(clippy::module_inception)]
pub mod pid;

pub use pid::{Pid, TICK};

/// Gains for a converging PID loop.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PidConstants {
    /// Proportional gain.
    pub kp:     f64,
    /// Integral gain.
    pub ki:     f64,
    /// Derivative gain, applied to the per-tick change in error.
    pub kd:     f64,
    /// The integral only accumulates while `|error| < starti`.
    pub starti: f64,
}

impl PidConstants {
    pub fn new(kp: f64, ki: f64, kd: f64, starti: f64) -> Self { Self { kp, ki, kd, starti } }
}

/// When a converging PID loop is considered done.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitConditions {
    /// Error band the loop has to stay inside.
    pub settle_error: f64,
    /// How long the error has to stay inside the band.
    pub settle_time:  Duration,
    /// Gives up after this long. Zero disables the timeout.
    pub timeout:      Duration,
}

impl ExitConditions {
    pub fn new(settle_error: f64, settle_time: Duration, timeout: Duration) -> Self {
        Self {
            settle_error,
            settle_time,
            timeout,
        }
    }
}

/// Gains for the heading-hold correction applied while driving straight.
///
/// Heading hold has no integral and no exit conditions; it only corrects.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingConstants {
    pub kp: f64,
    pub kd: f64,
}

impl HeadingConstants {
    pub fn new(kp: f64, kd: f64) -> Self { Self { kp, kd } }
}
