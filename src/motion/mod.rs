//! Closed-loop motion primitives.
//!
//! - [`pid`]: The PID controller and its tuning types.
//! - [`HaltToken`]: A shared flag that stops a running motion at the next
//!   tick boundary.
//! - [`MotionOutcome`]: How a motion ended.
//!
//! The motions themselves live on [`Drive`](crate::drivetrain::Drive):
//!
//! ```
//! use chassis::{drivetrain::{Drive, Geometry}, hardware::sim::SimDrivetrain};
//!
//! let sim = SimDrivetrain::default();
//! let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
//! drive.drive_distance(12.0);
//! drive.turn_to_heading(90.0);
//! ```

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

/// PID control.
///
/// Contains the [`Pid`](pid::Pid) controller with integral anti-windup,
/// zero-crossing integral reset and settle/timeout exit detection.
pub mod pid;

/// A cooperative cancellation flag for blocking motions.
///
/// Clones share the same flag, so one clone can be handed to another thread
/// (a competition switch handler, say) while the drive polls its own. Once
/// halted, every motion returns immediately until [`HaltToken::reset`] is
/// called.
#[derive(Debug, Clone, Default)]
pub struct HaltToken(Arc<AtomicBool>);

impl HaltToken {
    pub fn new() -> Self { Self::default() }

    /// Requests that any running motion stop.
    pub fn halt(&self) { self.0.store(true, Ordering::Release); }

    /// Allows motions to run again.
    pub fn reset(&self) { self.0.store(false, Ordering::Release); }

    pub fn is_halted(&self) -> bool { self.0.load(Ordering::Acquire) }
}

/// How a blocking motion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// The error stayed inside the settle band for the settle time.
    Settled,
    /// The timeout elapsed before the motion settled.
    TimedOut,
    /// The [`HaltToken`] was set.
    Halted,
}

impl fmt::Display for MotionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotionOutcome::Settled => write!(f, "settled"),
            MotionOutcome::TimedOut => write!(f, "timed out"),
            MotionOutcome::Halted => write!(f, "halted"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    #[test]
    fn halt_is_shared_between_clones() {
        let token = HaltToken::new();
        let remote = token.clone();
        thread::spawn(move || remote.halt()).join().unwrap();
        assert!(token.is_halted());
        token.reset();
        assert!(!token.is_halted());
    }
}
