//! Operator control for driver control periods.
//!
//! Each function here is one non-blocking tick: it reads stick percentages
//! in `[-100, 100]`, shapes them and writes voltages. Call it once per
//! controller sample.
//!
//! - **Arcade**: One axis drives, the other turns. Releasing the sticks
//!   fires a one-shot active brake.
//! - **Tank**: Each axis drives one side.
//! - **Mecanum**: Strafes on four corner motors when only the strafe and
//!   throttle axes are used, and falls back to arcade on the primary pair
//!   otherwise.
//!
//! # Example
//!
//! ```
//! use chassis::{drivetrain::{Drive, Geometry}, hardware::sim::SimDrivetrain};
//!
//! let sim = SimDrivetrain::default();
//! let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
//!
//! drive.arcade(80.0, 0.0);
//! assert!(drive.needs_stop());
//! drive.arcade(0.0, 0.0);
//! assert!(!drive.needs_stop());
//! ```

use std::time::Duration;

use log::debug;

use crate::{
    drivetrain::{Drive, read_position, report},
    hardware::{BrakeMode, Delay, HeadingSensor, MotorGroup},
    util::{deadband, percent_to_voltage, response_curve},
};

/// Stick values with a smaller magnitude are treated as zero.
pub const DEADBAND: f64 = 5.0;

/// How long the wheels roll freely before the active brake samples them.
pub const BRAKE_SAMPLE: Duration = Duration::from_millis(20);

/// The four corner motors of a mecanum drivetrain.
#[derive(Debug, Default)]
pub struct Corners<C> {
    pub front_left:  C,
    pub front_right: C,
    pub back_left:   C,
    pub back_right:  C,
}

impl<C> Corners<C> {
    pub fn new(front_left: C, front_right: C, back_left: C, back_right: C) -> Self {
        Self {
            front_left,
            front_right,
            back_left,
            back_right,
        }
    }
}

impl<M: MotorGroup, S: HeadingSensor, D: Delay> Drive<M, S, D> {
    /// Drives with one throttle axis and one turn axis.
    ///
    /// Both axes pass through the dead zone and the response curve; turn
    /// is damped first. When the shaped axes would ask for more than full
    /// power, the turn bias trades throttle for turn. When both axes return
    /// to zero after driving, the drive either holds (if the stop mode is
    /// [`BrakeMode::Hold`]) or pushes back against the wheels' rolling with
    /// a voltage proportional to how far they rolled in [`BRAKE_SAMPLE`].
    pub fn arcade(&mut self, throttle: f64, turn: f64) {
        let arcade = self.config.arcade;
        let curve = self.config.curve;

        let mut throttle = response_curve(deadband(throttle, DEADBAND), curve.throttle);
        let mut turn = response_curve(
            deadband(turn, DEADBAND) * arcade.turn_damping,
            curve.turn,
        );

        if arcade.turn_bias > 0.0 && throttle.abs() + turn.abs() > 100.0 {
            let old_throttle = throttle.trunc();
            let old_turn = turn.trunc();
            throttle *= 1.0 - arcade.turn_bias * (old_turn / 100.0).abs();
            turn *= 1.0 - (1.0 - arcade.turn_bias) * (old_throttle / 100.0).abs();
        }

        if throttle != 0.0 || turn != 0.0 {
            self.drive_with_voltage(
                percent_to_voltage(throttle + turn),
                percent_to_voltage(throttle - turn),
            );
            self.needs_stop = true;
        } else if self.needs_stop {
            if self.stop_mode == BrakeMode::Hold {
                self.brake(BrakeMode::Hold);
            } else {
                self.active_brake(arcade.brake);
            }
            self.needs_stop = false;
        }
    }

    /// Drives each side from its own stick.
    ///
    /// There is no dead zone here. Releasing both sticks stops the drive
    /// once with the configured stop mode.
    pub fn tank(&mut self, left: f64, right: f64) {
        let curve = self.config.curve.throttle;
        let left = response_curve(left, curve);
        let right = response_curve(right, curve);

        if left != 0.0 || right != 0.0 {
            self.drive_with_voltage(percent_to_voltage(left), percent_to_voltage(right));
            self.needs_stop = true;
        } else if self.needs_stop {
            self.brake(self.stop_mode);
            self.needs_stop = false;
        }
    }

    /// Drives a mecanum chassis.
    ///
    /// `x` strafes and `y` drives forward on the corner motors. As soon as
    /// `forward` or `turn` is used, strafing is ignored and the primary
    /// pair is driven arcade style with `y` as throttle. Only that arcade
    /// path arms the release stop.
    pub fn mecanum<C: MotorGroup>(
        &mut self,
        x: f64,
        y: f64,
        forward: f64,
        turn: f64,
        corners: &mut Corners<C>,
    ) {
        let curve = self.config.curve;
        let throttle = deadband(y, DEADBAND);
        let strafe = deadband(x, DEADBAND);
        let forward = response_curve(deadband(forward, DEADBAND), curve.throttle);
        let turn = response_curve(deadband(turn, DEADBAND), curve.turn);

        if throttle == 0.0 && strafe == 0.0 && forward == 0.0 && turn == 0.0 && self.needs_stop {
            self.brake(self.stop_mode);
            self.needs_stop = false;
            return;
        }

        if forward == 0.0 && turn == 0.0 {
            report(
                corners.front_left.set_voltage(percent_to_voltage(throttle + turn + strafe)),
                "Front Left Voltage",
            );
            report(
                corners.front_right.set_voltage(percent_to_voltage(throttle - turn - strafe)),
                "Front Right Voltage",
            );
            report(
                corners.back_left.set_voltage(percent_to_voltage(throttle + turn - strafe)),
                "Back Left Voltage",
            );
            report(
                corners.back_right.set_voltage(percent_to_voltage(throttle - turn + strafe)),
                "Back Right Voltage",
            );
        } else {
            self.drive_with_voltage(
                percent_to_voltage(throttle + turn),
                percent_to_voltage(throttle - turn),
            );
            self.needs_stop = true;
        }
    }

    fn active_brake(&mut self, gain: f64) {
        self.reset_positions();
        self.delay.delay(BRAKE_SAMPLE);
        let left = read_position(&self.left) / 360.0;
        let right = read_position(&self.right) / 360.0;
        debug!("Active brake after rolling {:.3} / {:.3} rev", left, right);
        self.drive_with_voltage(-left * gain, -right * gain);
    }
}
