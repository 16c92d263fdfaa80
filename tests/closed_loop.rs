use std::time::Duration;

use chassis::{
    drivetrain::{Drive, Geometry},
    hardware::{
        BrakeMode, Delay,
        sim::{Side, SimDelay, SimDrivetrain, SimImu, SimMotorGroup},
    },
    motion::{HaltToken, MotionOutcome},
    util::normalize_signed,
};

type SimDrive = Drive<SimMotorGroup, SimImu, SimDelay>;

fn drive(sim: &SimDrivetrain) -> SimDrive {
    let mut drive =
        Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
    // Generous timeouts so every motion here ends by settling.
    drive.set_turn_pid(0.4, 0.0, 3.0, 15.0);
    drive.set_turn_exit_conditions(1.5, Duration::from_millis(200), Duration::from_secs(4));
    drive.set_drive_exit_conditions(1.0, Duration::from_millis(200), Duration::from_secs(5));
    drive
}

#[test]
fn drive_distance_reaches_target_and_holds() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);

    assert_eq!(drive.drive_distance(24.0), MotionOutcome::Settled);

    assert!((drive.average_position() - 24.0).abs() < 1.0);
    assert_eq!(sim.brake_mode(Side::Left), Some(BrakeMode::Hold));
    assert_eq!(sim.brake_mode(Side::Right), Some(BrakeMode::Hold));
    // Nothing turned the robot, so both sides always got the same voltage.
    assert!(sim.voltage_pairs().iter().all(|(l, r)| l == r));
    assert!(sim.voltage_pairs().iter().all(|(l, _)| l.abs() <= 10.0));
}

#[test]
fn drive_distance_is_relative_to_current_position() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);
    drive.drive_distance(12.0);
    let start = drive.average_position();

    assert_eq!(drive.drive_distance(-6.0), MotionOutcome::Settled);

    assert!((drive.average_position() - (start - 6.0)).abs() < 1.0);
}

#[test]
fn turn_to_heading_uses_opposite_voltages() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);

    assert_eq!(drive.turn_to_heading(180.0), MotionOutcome::Settled);

    let pairs = sim.voltage_pairs();
    assert!(!pairs.is_empty());
    assert!(pairs.iter().all(|&(l, r)| r == -l));
    assert!(pairs.iter().all(|(l, _)| l.abs() <= 10.0));
    assert!(normalize_signed(drive.heading() - 180.0).abs() < 2.0);
    assert_eq!(drive.target_heading(), 180.0);
}

#[test]
fn turn_takes_the_short_way() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);
    drive.set_heading(350.0);

    assert_eq!(drive.turn_to_heading(20.0), MotionOutcome::Settled);

    // Clockwise across zero: the left side leads on the first tick.
    let (left, right) = sim.voltage_pairs()[0];
    assert!(left > 0.0 && right < 0.0);
    assert!(normalize_signed(drive.heading() - 20.0).abs() < 2.0);
}

#[test]
fn turn_respects_voltage_ceiling() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);

    drive.turn_to_heading_with(90.0, 4.0);

    assert!(sim.voltage_pairs().iter().all(|(l, _)| l.abs() <= 4.0));
}

#[test]
fn target_heading_persists_into_drives() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);

    drive.turn_to_heading(90.0);
    drive.drive_distance(12.0);

    assert_eq!(drive.target_heading(), 90.0);
    assert!(normalize_signed(drive.heading() - 90.0).abs() < 2.0);
}

#[test]
fn heading_hold_corrects_an_offset() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);
    drive.set_heading(0.0);
    // Knock the robot 10 degrees clockwise without changing the target.
    sim.set_heading(10.0);

    drive.drive_distance(24.0);

    let (left, right) = sim.voltage_pairs()[0];
    assert!(left < right);
    assert!(normalize_signed(drive.heading()).abs() < 2.0);
}

#[test]
fn heading_correction_is_clamped_while_driving() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);
    // A stiff heading loop against a large offset saturates the correction.
    drive.set_heading_pid(5.0, 0.0);
    sim.set_heading(20.0);

    assert_eq!(drive.drive_distance_holding(24.0, 6.0, 0.0, 2.0), MotionOutcome::Settled);

    let pairs = sim.voltage_pairs();
    assert!(!pairs.is_empty());
    // The first tick wants 100 V of correction and gets 2 V each way.
    let (left, right) = pairs[0];
    assert!((right - left - 4.0).abs() < 1e-9);
    for (l, r) in pairs {
        assert!((l - r).abs() <= 4.0 + 1e-9);
        assert!(l.abs() <= 8.0 + 1e-9 && r.abs() <= 8.0 + 1e-9);
    }
    assert!((drive.average_position() - 24.0).abs() < 1.5);
}

#[test]
fn drive_holding_an_explicit_heading() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);

    drive.drive_distance_holding(24.0, 8.0, 30.0, 6.0);

    assert_eq!(drive.target_heading(), 30.0);
    assert!(normalize_signed(drive.heading() - 30.0).abs() < 3.0);
    // Turning clockwise toward 30 means the left side leads.
    let (left, right) = sim.voltage_pairs()[0];
    assert!(left > right);
}

struct HaltAfter {
    inner: SimDelay,
    token: HaltToken,
    ticks: usize,
}

impl Delay for HaltAfter {
    fn delay(&mut self, duration: Duration) {
        self.inner.delay(duration);
        self.ticks = self.ticks.saturating_sub(1);
        if self.ticks == 0 {
            self.token.halt();
        }
    }

    fn now(&self) -> Duration { self.inner.now() }
}

#[test]
fn halting_stops_a_running_motion() {
    let sim = SimDrivetrain::default();
    let token = HaltToken::new();
    let delay = HaltAfter {
        inner: sim.delay(),
        token: token.clone(),
        ticks: 5,
    };
    let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), delay, Geometry::default())
        .with_halt_token(token.clone());

    assert_eq!(drive.turn_to_heading(180.0), MotionOutcome::Halted);
    assert_eq!(sim.time(), Duration::from_millis(50));
    assert_eq!(sim.voltage_pairs().len(), 5);
    assert_eq!(sim.brake_mode(Side::Left), Some(BrakeMode::Hold));

    // The token stays set until it is reset.
    assert_eq!(drive.drive_distance(5.0), MotionOutcome::Halted);
    token.reset();
    assert!(!drive.halt_token().is_halted());
}

#[test]
fn status_reports_heading_and_distance() {
    let sim = SimDrivetrain::default();
    let mut drive = drive(&sim);
    drive.drive_distance(24.0);

    let status = drive.status();
    assert!((status.distance - 24.0).abs() < 1.0);
    assert!(status.to_string().starts_with("heading: "));
}
