//! Hardware capabilities the drivetrain depends on.
//!
//! The drive never talks to a device driver directly. It is generic over
//! three small traits:
//!
//! - [`MotorGroup`]: one side of the drivetrain (or a single mecanum corner).
//! - [`HeadingSensor`]: an inertial sensor reporting heading in degrees.
//! - [`Delay`]: the suspension point between control-loop ticks.
//!
//! The [`sim`] module implements all three against a simulated robot, which
//! is what the test suite drives. With the `vexide` feature enabled, the
//! `vexide` module implements them for real V5 devices.

use std::{
    thread,
    time::{Duration, Instant},
};

use thiserror::Error;

/// A simulated differential drivetrain for tests and demos.
pub mod sim;

/// Adapters for vexide smart devices.
#[cfg(feature = "vexide")]
pub mod vexide;

/// How a motor behaves when it is told to stop.
///
/// - [`BrakeMode::Coast`]: Motors spin freely.
/// - [`BrakeMode::Brake`]: Motors short their windings and resist rotation.
/// - [`BrakeMode::Hold`]: Motors actively hold their current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrakeMode {
    #[default]
    Coast,
    Brake,
    Hold,
}

/// Errors reported by a hardware capability.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HardwareError {
    /// Nothing is plugged into the port, or the device stopped responding.
    #[error("device disconnected")]
    Disconnected,
    /// The device rejected the request.
    #[error("device error: {0}")]
    Device(String),
}

/// A group of motors commanded as one actuator.
pub trait MotorGroup {
    /// Spins the group at the given voltage. Negative values run in reverse.
    fn set_voltage(&mut self, volts: f64) -> Result<(), HardwareError>;

    /// Stops the group using the given brake mode.
    fn brake(&mut self, mode: BrakeMode) -> Result<(), HardwareError>;

    /// Returns the cumulative rotation of the group in degrees.
    fn position(&self) -> Result<f64, HardwareError>;

    /// Zeroes the rotation counter.
    fn reset_position(&mut self) -> Result<(), HardwareError>;
}

impl<M: MotorGroup + ?Sized> MotorGroup for &mut M {
    fn set_voltage(&mut self, volts: f64) -> Result<(), HardwareError> {
        (**self).set_voltage(volts)
    }

    fn brake(&mut self, mode: BrakeMode) -> Result<(), HardwareError> { (**self).brake(mode) }

    fn position(&self) -> Result<f64, HardwareError> { (**self).position() }

    fn reset_position(&mut self) -> Result<(), HardwareError> { (**self).reset_position() }
}

impl<M: MotorGroup + ?Sized> MotorGroup for Box<M> {
    fn set_voltage(&mut self, volts: f64) -> Result<(), HardwareError> {
        (**self).set_voltage(volts)
    }

    fn brake(&mut self, mode: BrakeMode) -> Result<(), HardwareError> { (**self).brake(mode) }

    fn position(&self) -> Result<f64, HardwareError> { (**self).position() }

    fn reset_position(&mut self) -> Result<(), HardwareError> { (**self).reset_position() }
}

/// A sensor reporting the robot's heading.
///
/// The reported value may be wrapped or unbounded; the drive normalizes it.
pub trait HeadingSensor {
    /// Returns the current heading in degrees.
    fn heading(&self) -> Result<f64, HardwareError>;

    /// Redefines the current orientation as `degrees`.
    fn set_heading(&mut self, degrees: f64) -> Result<(), HardwareError>;
}

/// Suspends the control loop between ticks and keeps the loop's clock.
pub trait Delay {
    fn delay(&mut self, duration: Duration);

    /// Time on this clock since it was created.
    ///
    /// On a simulator this is simulated time, so durations measured with it
    /// match what the control loop saw.
    fn now(&self) -> Duration;
}

/// A [`Delay`] backed by [`std::thread::sleep`] and a wall clock.
///
/// The sleep blocks the calling thread. Under an async executor such as
/// vexide's, other tasks do not run while a motion is in progress.
#[derive(Debug, Clone, Copy)]
pub struct StdDelay {
    start: Instant,
}

impl StdDelay {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for StdDelay {
    fn default() -> Self { Self::new() }
}

impl Delay for StdDelay {
    fn delay(&mut self, duration: Duration) { thread::sleep(duration) }

    fn now(&self) -> Duration { self.start.elapsed() }
}

#[cfg(test)]
mod tests {
    use super::{
        sim::{SimCommand, SimMotor},
        *,
    };

    fn hold_after<M: MotorGroup>(mut group: M, volts: f64) {
        group.set_voltage(volts).unwrap();
        group.brake(BrakeMode::Hold).unwrap();
    }

    #[test]
    fn boxed_groups_forward_to_the_motor() {
        let mut boxed = Box::new(SimMotor::default());
        hold_after(&mut boxed, 3.0);
        assert_eq!(boxed.brake, Some(BrakeMode::Hold));

        let mut groups: Vec<Box<dyn MotorGroup>> =
            vec![Box::new(SimMotor::default()), Box::new(SimMotor::default())];
        for group in &mut groups {
            hold_after(&mut *group, -2.0);
            assert_eq!(group.position(), Ok(0.0));
        }
    }

    #[test]
    fn borrowed_groups_forward_to_the_motor() {
        let mut motor = SimMotor::default();
        hold_after(&mut motor, 4.5);
        assert_eq!(motor.voltage, 0.0);
        assert_eq!(motor.brake, Some(BrakeMode::Hold));
        assert_eq!(
            motor.commands,
            vec![SimCommand::Voltage(4.5), SimCommand::Brake(BrakeMode::Hold)]
        );
    }

    #[test]
    fn std_delay_clock_advances_with_sleep() {
        let mut delay = StdDelay::new();
        let before = delay.now();
        delay.delay(Duration::from_millis(5));
        assert!(delay.now() >= before + Duration::from_millis(5));
    }
}
