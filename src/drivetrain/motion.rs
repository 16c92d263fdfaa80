//! Blocking closed-loop motions.
//!
//! Each motion builds fresh PID controllers, then repeats one tick per loop
//! period:
//! 1. Reads the heading (and the encoders, when driving).
//! 2. Calculates the error.
//! 3. Computes and clamps the PID output.
//! 4. Applies voltage to both sides.
//!
//! The loop ends when the PID converges or the halt token is set, and both
//! sides are told to hold their position.

use log::{info, trace};

use super::Drive;
use crate::{
    hardware::{BrakeMode, Delay, HeadingSensor, MotorGroup},
    motion::{MotionOutcome, pid::Pid},
    util::{clamp, normalize_signed, normalize_unsigned},
};

impl<M: MotorGroup, S: HeadingSensor, D: Delay> Drive<M, S, D> {
    /// Turns in place to an absolute heading using the configured turn
    /// voltage ceiling.
    pub fn turn_to_heading(&mut self, heading: f64) -> MotionOutcome {
        let max_voltage = self.config.max_voltage.turn;
        self.turn_to_heading_with(heading, max_voltage)
    }

    /// Turns in place to an absolute heading, never exceeding `max_voltage`
    /// on either side.
    ///
    /// The robot takes the shortest way around. Both sides always receive
    /// equal and opposite voltages.
    pub fn turn_to_heading_with(&mut self, heading: f64, max_voltage: f64) -> MotionOutcome {
        self.target_heading = normalize_unsigned(heading);
        let period = self.config.loop_period;
        let mut pid = Pid::new(self.config.turn_pid, self.config.turn_exit);
        info!("Turning to {:.1} deg", self.target_heading);

        let outcome = loop {
            if let Some(outcome) = self.finished(&pid) {
                break outcome;
            }
            let error = normalize_signed(heading - self.heading());
            let output = clamp(pid.update_with_period(error, period), -max_voltage, max_voltage);
            trace!("turn error {:.2} output {:.2}", error, output);

            self.drive_with_voltage(output, -output);
            self.delay.delay(period);
        };

        self.brake(BrakeMode::Hold);
        info!(
            "Turn {} after {:?} at {:.1} deg",
            outcome,
            pid.elapsed(),
            self.heading()
        );
        outcome
    }

    /// Drives straight for `distance` inches, holding the last target
    /// heading, with the configured voltage ceilings.
    pub fn drive_distance(&mut self, distance: f64) -> MotionOutcome {
        let max_voltage = self.config.max_voltage.drive;
        self.drive_distance_with(distance, max_voltage)
    }

    /// Drives straight for `distance` inches, holding the last target
    /// heading, never exceeding `max_voltage` of forward drive.
    pub fn drive_distance_with(&mut self, distance: f64, max_voltage: f64) -> MotionOutcome {
        let heading = self.target_heading;
        let heading_max_voltage = self.config.max_voltage.heading;
        self.drive_distance_holding(distance, max_voltage, heading, heading_max_voltage)
    }

    /// Drives `distance` inches while steering toward `heading`.
    ///
    /// The heading correction is limited to `heading_max_voltage` and is
    /// added to the left side and subtracted from the right. Only the
    /// distance loop decides when the motion is done.
    pub fn drive_distance_holding(
        &mut self,
        distance: f64,
        max_voltage: f64,
        heading: f64,
        heading_max_voltage: f64,
    ) -> MotionOutcome {
        self.target_heading = normalize_unsigned(heading);
        let period = self.config.loop_period;
        let mut drive_pid = Pid::new(self.config.drive_pid, self.config.drive_exit);
        let mut heading_pid = Pid::heading_hold(self.config.heading_pid);
        let origin = self.average_position();
        info!(
            "Driving {:.1} in from {:.1} in, holding {:.1} deg",
            distance, origin, self.target_heading
        );

        let outcome = loop {
            if let Some(outcome) = self.finished(&drive_pid) {
                break outcome;
            }
            let position = self.average_position();
            let drive_error = distance + origin - position;
            let heading_error = normalize_signed(self.target_heading - self.heading());

            let drive_output = clamp(
                drive_pid.update_with_period(drive_error, period),
                -max_voltage,
                max_voltage,
            );
            let heading_output = clamp(
                heading_pid.update_with_period(heading_error, period),
                -heading_max_voltage,
                heading_max_voltage,
            );
            trace!(
                "drive error {:.2} output {:.2}, heading error {:.2} output {:.2}",
                drive_error, drive_output, heading_error, heading_output
            );

            self.drive_with_voltage(drive_output + heading_output, drive_output - heading_output);
            self.delay.delay(period);
        };

        self.brake(BrakeMode::Hold);
        info!(
            "Drive {} after {:?} at {:.1} in",
            outcome,
            drive_pid.elapsed(),
            self.average_position() - origin
        );
        outcome
    }

    fn finished(&self, pid: &Pid) -> Option<MotionOutcome> {
        if self.halt.is_halted() {
            Some(MotionOutcome::Halted)
        } else if pid.is_settled() {
            Some(MotionOutcome::Settled)
        } else if pid.is_timed_out() {
            Some(MotionOutcome::TimedOut)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        drivetrain::Geometry,
        hardware::sim::{Side, SimCommand, SimDrivetrain},
    };

    #[test]
    fn halted_motion_only_holds() {
        let sim = SimDrivetrain::default();
        let mut drive =
            Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
        drive.halt_token().halt();

        assert_eq!(drive.turn_to_heading(90.0), MotionOutcome::Halted);
        assert_eq!(drive.drive_distance(10.0), MotionOutcome::Halted);
        assert_eq!(sim.time(), Duration::ZERO);
        assert!(
            sim.events()
                .iter()
                .all(|e| e.command == SimCommand::Brake(BrakeMode::Hold))
        );
        assert_eq!(drive.target_heading(), 90.0);
    }

    #[test]
    fn turn_target_is_normalized() {
        let sim = SimDrivetrain::default();
        let mut drive =
            Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
        drive.halt_token().halt();
        drive.turn_to_heading(-90.0);
        assert_eq!(drive.target_heading(), 270.0);
        drive.drive_distance_holding(5.0, 6.0, 450.0, 3.0);
        assert_eq!(drive.target_heading(), 90.0);
    }

    #[test]
    fn unreachable_settle_times_out() {
        let sim = SimDrivetrain::default();
        let mut drive =
            Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
        drive.set_turn_pid(0.0, 0.0, 0.0, 0.0);
        drive.set_turn_exit_conditions(1.0, Duration::from_millis(100), Duration::from_millis(300));

        assert_eq!(drive.turn_to_heading(90.0), MotionOutcome::TimedOut);
        // Ticks at 0..=300 ms, then one more pushes elapsed past the timeout.
        assert_eq!(sim.time(), Duration::from_millis(310));
        assert_eq!(sim.brake_mode(Side::Right), Some(BrakeMode::Hold));
    }
}
