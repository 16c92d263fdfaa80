//! Autonomous routine selection and step testing.
//!
//! A [`Session`] keeps the list of routines the robot knows, which one is
//! selected, and the state of step-by-step test mode. Long routines are
//! split into numbered steps so each step can be rehearsed on its own:
//!
//! ```
//! use chassis::{
//!     auton::{Session, Steps},
//!     drivetrain::{Drive, Geometry},
//!     hardware::sim::{SimDelay, SimDrivetrain, SimImu, SimMotorGroup},
//! };
//!
//! type SimDrive = Drive<SimMotorGroup, SimImu, SimDelay>;
//!
//! fn skills(drive: &mut SimDrive, steps: &mut Steps) {
//!     if steps.at(0) {
//!         drive.turn_to_heading(180.0);
//!         if !steps.continue_step() {
//!             return;
//!         }
//!     }
//!     if steps.at(1) {
//!         drive.drive_distance(5.0);
//!     }
//! }
//!
//! let sim = SimDrivetrain::default();
//! let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
//! let mut session = Session::new();
//! session.register("skills", skills);
//!
//! session.set_test_mode(true);
//! session.run_selected(&mut drive);
//! assert_eq!(session.step(), 1);
//! ```

use std::time::Duration;

use humantime::format_duration;
use log::{info, warn};

use crate::{
    drivetrain::Drive,
    hardware::{BrakeMode, Delay, HeadingSensor, MotorGroup},
};

/// The body of an autonomous routine.
pub type RoutineFn<M, S, D> = fn(&mut Drive<M, S, D>, &mut Steps);

/// A named autonomous routine.
pub struct Routine<M, S, D> {
    pub name: &'static str,
    pub run:  RoutineFn<M, S, D>,
}

// Derives would bound M, S and D.
impl<M, S, D> Clone for Routine<M, S, D> {
    fn clone(&self) -> Self { *self }
}

impl<M, S, D> Copy for Routine<M, S, D> {}

/// Step bookkeeping handed to a running routine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Steps {
    current:   usize,
    test_mode: bool,
}

impl Steps {
    /// The step the routine should run next.
    pub fn current(&self) -> usize { self.current }

    /// Whether the routine is at step `step`.
    pub fn at(&self, step: usize) -> bool { self.current == step }

    pub fn test_mode(&self) -> bool { self.test_mode }

    /// Marks the current step as done.
    ///
    /// Returns false in test mode, telling the routine to return after a
    /// single step.
    pub fn continue_step(&mut self) -> bool {
        self.current += 1;
        !self.test_mode
    }
}

/// Routine registry plus selection and test-step state.
pub struct Session<M, S, D> {
    routines:  Vec<Routine<M, S, D>>,
    selection: usize,
    steps:     Steps,
}

impl<M, S, D> Default for Session<M, S, D> {
    fn default() -> Self {
        Self {
            routines:  Vec::new(),
            selection: 0,
            steps:     Steps::default(),
        }
    }
}

impl<M: MotorGroup, S: HeadingSensor, D: Delay> Session<M, S, D> {
    pub fn new() -> Self { Self::default() }

    /// Adds a routine to the end of the menu.
    pub fn register(&mut self, name: &'static str, run: RoutineFn<M, S, D>) -> &mut Self {
        self.routines.push(Routine { name, run });
        self
    }

    pub fn routines(&self) -> &[Routine<M, S, D>] { &self.routines }

    /// Index of the selected routine.
    pub fn selection(&self) -> usize { self.selection }

    /// Name of the selected routine, if any are registered.
    pub fn selected(&self) -> Option<&'static str> {
        self.routines.get(self.selection).map(|r| r.name)
    }

    /// Selects a routine by index, ignoring indices past the end.
    pub fn select(&mut self, index: usize) {
        if index < self.routines.len() {
            self.selection = index;
        }
    }

    /// Moves to the next routine, wrapping to the first.
    pub fn select_next(&mut self) {
        if !self.routines.is_empty() {
            self.selection = (self.selection + 1) % self.routines.len();
        }
    }

    /// Moves to the previous routine, wrapping to the last.
    pub fn select_previous(&mut self) {
        if !self.routines.is_empty() {
            let len = self.routines.len();
            self.selection = (self.selection + len - 1) % len;
        }
    }

    pub fn test_mode(&self) -> bool { self.steps.test_mode }

    /// Entering or leaving test mode rewinds to the first step.
    pub fn set_test_mode(&mut self, enabled: bool) {
        self.steps = Steps {
            current:   0,
            test_mode: enabled,
        };
    }

    pub fn step(&self) -> usize { self.steps.current }

    pub fn next_step(&mut self) { self.steps.current += 1; }

    pub fn previous_step(&mut self) { self.steps.current = self.steps.current.saturating_sub(1); }

    /// See [`Steps::continue_step`].
    pub fn continue_step(&mut self) -> bool { self.steps.continue_step() }

    /// Runs the selected routine and coasts the drive afterwards.
    ///
    /// Outside test mode the routine always starts from step 0. In test
    /// mode it starts from the current step. Returns how long the routine
    /// took on the drive's clock, or `None` if nothing is registered.
    pub fn run_selected(&mut self, drive: &mut Drive<M, S, D>) -> Option<Duration> {
        let Some(routine) = self.routines.get(self.selection).copied() else {
            warn!("No autonomous routine registered");
            return None;
        };
        if !self.steps.test_mode {
            self.steps.current = 0;
        }
        info!("Running {} from step {}", routine.name, self.steps.current);

        let start = drive.now();
        (routine.run)(drive, &mut self.steps);
        let elapsed = drive.now().saturating_sub(start);
        drive.stop(BrakeMode::Coast);

        info!("{} finished in {}", routine.name, format_duration(elapsed));
        Some(elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        drivetrain::Geometry,
        hardware::sim::{SimCommand, SimDelay, SimDrivetrain, SimImu, SimMotorGroup},
    };

    type SimDrive = Drive<SimMotorGroup, SimImu, SimDelay>;

    fn idle(_: &mut SimDrive, _: &mut Steps) {}

    fn three_steps(drive: &mut SimDrive, steps: &mut Steps) {
        for step in 0..3 {
            if steps.at(step) {
                drive.set_heading(step as f64 * 10.0);
                if !steps.continue_step() {
                    return;
                }
            }
        }
    }

    fn tile(drive: &mut SimDrive, _: &mut Steps) { drive.drive_distance(24.0); }

    fn drive(sim: &SimDrivetrain) -> SimDrive {
        Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default())
    }

    fn session() -> Session<SimMotorGroup, SimImu, SimDelay> {
        let mut session = Session::new();
        session
            .register("left", idle)
            .register("right", idle)
            .register("skills", three_steps);
        session
    }

    #[test]
    fn selection_wraps() {
        let mut session = session();
        assert_eq!(session.selected(), Some("left"));
        session.select_previous();
        assert_eq!(session.selected(), Some("skills"));
        session.select_next();
        session.select_next();
        assert_eq!(session.selection(), 1);
        session.select(7);
        assert_eq!(session.selection(), 1);
    }

    #[test]
    fn empty_session_runs_nothing() {
        let sim = SimDrivetrain::default();
        let mut drive = drive(&sim);
        let mut session = Session::new();
        session.select_next();
        assert_eq!(session.selected(), None);
        assert_eq!(session.run_selected(&mut drive), None);
        assert!(sim.events().is_empty());
    }

    #[test]
    fn steps_floor_at_zero() {
        let mut session = session();
        session.previous_step();
        assert_eq!(session.step(), 0);
        session.next_step();
        session.next_step();
        session.previous_step();
        assert_eq!(session.step(), 1);
    }

    #[test]
    fn continue_step_stops_in_test_mode() {
        let mut session = session();
        assert!(session.continue_step());
        session.set_test_mode(true);
        assert_eq!(session.step(), 0);
        assert!(!session.continue_step());
        assert_eq!(session.step(), 1);
    }

    #[test]
    fn full_run_executes_every_step_and_coasts() {
        let sim = SimDrivetrain::default();
        let mut drive = drive(&sim);
        let mut session = session();
        session.select(2);
        session.next_step();

        assert!(session.run_selected(&mut drive).is_some());

        assert_eq!(session.step(), 3);
        assert_eq!(drive.target_heading(), 20.0);
        assert_eq!(drive.stop_mode(), BrakeMode::Coast);
        let last = sim.events().last().map(|e| e.command);
        assert_eq!(last, Some(SimCommand::ResetPosition));
    }

    #[test]
    fn test_mode_runs_one_step_at_a_time() {
        let sim = SimDrivetrain::default();
        let mut drive = drive(&sim);
        let mut session = session();
        session.select(2);
        session.set_test_mode(true);

        session.run_selected(&mut drive);
        assert_eq!(drive.target_heading(), 0.0);
        assert_eq!(session.step(), 1);

        session.next_step();
        session.run_selected(&mut drive);
        assert_eq!(drive.target_heading(), 20.0);
        assert_eq!(session.step(), 3);
    }

    #[test]
    fn elapsed_time_follows_the_drive_clock() {
        let sim = SimDrivetrain::default();
        let mut drive = drive(&sim);
        drive.drive_distance(6.0);
        let before = sim.time();

        let mut session = Session::new();
        session.register("tile", tile);
        let elapsed = session.run_selected(&mut drive);

        assert!(sim.time() > before);
        assert_eq!(elapsed, Some(sim.time() - before));
    }
}
