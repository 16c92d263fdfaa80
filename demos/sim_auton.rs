//! Runs the sample autonomous routines and a few remote commands on the
//! simulated drivetrain.
//!
//! ```text
//! cargo run --example sim_auton
//! ```

use std::io::Cursor;

use chassis::{
    auton::{Session, Steps},
    command,
    drivetrain::{Drive, Geometry},
    fs::logger,
    hardware::{
        BrakeMode,
        sim::{SimDelay, SimDrivetrain, SimImu, SimMotorGroup},
    },
};
use log::{LevelFilter, info, warn};

type SimDrive = Drive<SimMotorGroup, SimImu, SimDelay>;

/// Drives forward one tile.
fn tile(drive: &mut SimDrive, _: &mut Steps) { drive.drive_distance(24.0); }

/// Starts facing backwards, backs up and comes back.
fn out_and_back(drive: &mut SimDrive, _: &mut Steps) {
    drive.set_heading(180.0);
    drive.drive_distance_with(-12.0, 6.0);
    drive.turn_to_heading_with(0.0, 6.0);
    drive.drive_distance_with(12.0, 6.0);
}

/// A longer routine split into steps for test mode.
fn skills(drive: &mut SimDrive, steps: &mut Steps) {
    if steps.at(0) {
        drive.turn_to_heading(180.0);
        if !steps.continue_step() {
            return;
        }
    }
    if steps.at(1) {
        drive.drive_distance(5.0);
        let heading = drive.heading();
        drive.turn_to_heading(heading + 90.0);
        if !steps.continue_step() {
            return;
        }
    }
    if steps.at(2) {
        let heading = drive.heading();
        drive.turn_to_heading(heading - 90.0);
        drive.drive_distance(-5.0);
    }
}

fn main() {
    if let Err(e) = logger::init(LevelFilter::Info) {
        eprintln!("Logger init failed: {}", e);
    }

    let sim = SimDrivetrain::default();
    let mut drive =
        Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
    drive.stop(BrakeMode::Coast);

    let mut session = Session::new();
    session
        .register("auton1", tile)
        .register("auton2", out_and_back)
        .register("auton_skill", skills);

    for _ in 0..session.routines().len() {
        if let Some(elapsed) = session.run_selected(&mut drive) {
            info!(
                "{} took {:?}, {:?} simulated so far",
                session.selected().unwrap_or("?"),
                elapsed,
                sim.time()
            );
        }
        info!("{}", drive.status());
        session.select_next();
    }

    // Rehearse the second step of the skills routine on its own.
    session.select(2);
    session.set_test_mode(true);
    session.next_step();
    session.run_selected(&mut drive);
    info!("Test mode stopped before step {}", session.step());

    let mut console = Cursor::new("set_heading 0\ndrive 24\n\nturn 90\nstrafe 10\ndrive -12\n");
    loop {
        match command::poll(&mut console, &mut drive) {
            Ok(Some(_)) => info!("{}", drive.status()),
            Ok(None) => break,
            Err(e) => warn!("Skipping line: {}", e),
        }
    }
    log::logger().flush();
}
