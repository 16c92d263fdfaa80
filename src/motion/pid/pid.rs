//! The PID controller used by every drivetrain motion.
//!
//! A [`Pid`] is cheap and short-lived: each motion builds one from the
//! configured constants, feeds it one error per tick and throws it away
//! when [`Pid::is_converged`] reports true.
//!
//! ```
//! use std::time::Duration;
//!
//! use chassis::motion::pid::{ExitConditions, Pid, PidConstants};
//!
//! let mut pid = Pid::new(
//!     PidConstants::new(1.5, 0.0, 10.0, 0.0),
//!     ExitConditions::new(1.0, Duration::from_millis(200), Duration::from_secs(2)),
//! );
//! let output = pid.update(24.0);
//! assert_eq!(output, 1.5 * 24.0 + 10.0 * 24.0);
//! ```

use std::time::Duration;

use super::{ExitConditions, HeadingConstants, PidConstants};

/// The tick period assumed by [`Pid::update`].
pub const TICK: Duration = Duration::from_millis(10);

/// A single-axis PID controller with settle and timeout tracking.
#[derive(Debug, Clone)]
pub struct Pid {
    constants:      PidConstants,
    exit:           ExitConditions,
    integral:       f64,
    previous_error: f64,
    /// Time the error has continuously been inside the settle band.
    settled_for:    Duration,
    elapsed:        Duration,
}

impl Pid {
    /// Creates a converging controller.
    pub fn new(constants: PidConstants, exit: ExitConditions) -> Self {
        Self {
            constants,
            exit,
            integral: 0.0,
            previous_error: 0.0,
            settled_for: Duration::ZERO,
            elapsed: Duration::ZERO,
        }
    }

    /// Creates a converging controller from loose gains and exit conditions.
    pub fn full(
        kp: f64,
        ki: f64,
        kd: f64,
        starti: f64,
        settle_error: f64,
        settle_time: Duration,
        timeout: Duration,
    ) -> Self {
        Self::new(
            PidConstants::new(kp, ki, kd, starti),
            ExitConditions::new(settle_error, settle_time, timeout),
        )
    }

    /// Creates a proportional/derivative controller that never converges.
    ///
    /// Used for corrections evaluated inside another loop, such as heading
    /// hold while driving.
    pub fn pd(kp: f64, kd: f64) -> Self {
        Self::new(
            PidConstants::new(kp, 0.0, kd, 0.0),
            ExitConditions::new(0.0, Duration::ZERO, Duration::ZERO),
        )
    }

    /// Shorthand for [`Pid::pd`] with heading-hold constants.
    pub fn heading_hold(constants: HeadingConstants) -> Self { Self::pd(constants.kp, constants.kd) }

    /// Runs one tick of [`TICK`] length and returns the control output.
    pub fn update(&mut self, error: f64) -> f64 { self.update_with_period(error, TICK) }

    /// Runs one tick that lasted `period` and returns the control output.
    ///
    /// The derivative term is per tick, so `period` only feeds the settle
    /// and timeout bookkeeping.
    pub fn update_with_period(&mut self, error: f64, period: Duration) -> f64 {
        let PidConstants { kp, ki, kd, starti } = self.constants;

        if error.abs() < starti {
            self.integral += error;
        }
        if crossed_zero(error, self.previous_error) {
            self.integral = 0.0;
        }

        let output = kp * error + ki * self.integral + kd * (error - self.previous_error);
        self.previous_error = error;

        if error.abs() < self.exit.settle_error {
            self.settled_for += period;
        } else {
            self.settled_for = Duration::ZERO;
        }
        self.elapsed += period;

        output
    }

    /// Returns true once the loop has settled or timed out.
    pub fn is_converged(&self) -> bool { self.is_settled() || self.is_timed_out() }

    /// The error has stayed inside the settle band for the settle time.
    pub fn is_settled(&self) -> bool {
        !self.settled_for.is_zero() && self.settled_for >= self.exit.settle_time
    }

    /// More than the (nonzero) timeout has elapsed.
    pub fn is_timed_out(&self) -> bool {
        !self.exit.timeout.is_zero() && self.elapsed > self.exit.timeout
    }

    /// The accumulated integral sum.
    pub fn integral(&self) -> f64 { self.integral }

    /// The error passed to the last update.
    pub fn previous_error(&self) -> f64 { self.previous_error }

    /// Total time fed to the controller so far.
    pub fn elapsed(&self) -> Duration { self.elapsed }

    /// How long the error has been continuously inside the settle band.
    pub fn settled_for(&self) -> Duration { self.settled_for }
}

fn crossed_zero(error: f64, previous: f64) -> bool {
    (error > 0.0 && previous < 0.0) || (error < 0.0 && previous > 0.0)
}
