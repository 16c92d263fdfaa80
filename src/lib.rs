//! # Chassis
//!
//! Chassis is a closed-loop motion controller for differential drivetrains on
//! VEX V5 robots. It provides:
//!
//! - **Motion Control**: PID turns to an absolute heading and straight drives
//!   with heading hold, each ending when the error settles, a timeout passes
//!   or a [`HaltToken`](motion::HaltToken) is set.
//! - **Operator Control**: Arcade, tank and mecanum mixing with response
//!   curves, dead zones and an active brake on release.
//! - **Hardware Injection**: The drive is generic over small motor, heading
//!   and delay traits. A simulator implements them for tests, and the
//!   `vexide` feature implements them for real devices.
//! - **Autonomous Sessions**: A routine menu with step-by-step test mode.
//! - **Remote Commands**: `drive`, `turn` and `set_heading` typed into a
//!   serial console.
//! - **Logging**: A console and file logger for the [`log`] facade.
//!
//! ## Quick Start
//!
//! ```
//! use chassis::{
//!     drivetrain::{Drive, Geometry},
//!     hardware::{BrakeMode, sim::SimDrivetrain},
//!     motion::MotionOutcome,
//! };
//!
//! let sim = SimDrivetrain::default();
//! let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
//!
//! drive.set_heading(0.0);
//! let outcome = drive.drive_distance(24.0);
//! assert_ne!(outcome, MotionOutcome::Halted);
//! drive.stop(BrakeMode::Coast);
//! ```
//!
//! ## Modules
//!
//! - [`util`]: Angle normalization, clamping and joystick shaping.
//! - [`motion`]: The PID controller, halt token and motion outcomes.
//! - [`drivetrain`]: The [`Drive`](drivetrain::Drive) controller and its tuning.
//! - [`opcontrol`]: Arcade, tank and mecanum mixing.
//! - [`hardware`]: Device traits, the simulator and the vexide adapters.
//! - [`auton`]: Autonomous routine selection and step testing.
//! - [`command`]: Remote text commands.
//! - [`fs`]: Logging.

/// Autonomous routine registry, selection and step-by-step test mode.
pub mod auton;

/// Remote text commands.
///
/// Parses `drive`, `turn` and `set_heading` lines and runs them on a drive.
pub mod command;

/// Differential drivetrain control.
///
/// Provides the [`Drive`](drivetrain::Drive) struct, its setters and its
/// closed-loop motions.
pub mod drivetrain;

/// Filesystem utilities.
///
/// Contains logging to the console and to `log.txt`.
pub mod fs;

/// Hardware capabilities.
///
/// Motor, heading sensor and delay traits, a simulated drivetrain and
/// adapters for vexide devices.
pub mod hardware;

/// Closed-loop motion primitives.
///
/// - **PID Control**: A PID controller with anti-windup, zero-crossing
///   integral reset and settle/timeout detection.
/// - **Halting**: A shared flag that stops running motions.
pub mod motion;

/// Operator control.
///
/// Arcade, tank and mecanum mixing, one call per controller sample.
pub mod opcontrol;

/// Numeric helpers.
pub mod util;
