//! A simulated differential drivetrain.
//!
//! [`SimDrivetrain`] owns a small physics model shared by the handles it
//! hands out: two [`SimMotorGroup`]s, a [`SimImu`] and a [`SimDelay`]. Time
//! only advances when the delay is called, so a full motion runs in
//! microseconds and always produces the same trace.
//!
//! Each side is modelled as a first-order motor: powered, its speed relaxes
//! toward `volts / 12 * max_speed` with the configured time constant. The
//! heading integrates the difference between the two sides' linear speeds.
//!
//! # Example
//!
//! ```
//! use chassis::{drivetrain::{Drive, Geometry}, hardware::sim::SimDrivetrain};
//!
//! let sim = SimDrivetrain::default();
//! let mut drive = Drive::new(sim.left(), sim.right(), sim.imu(), sim.delay(), Geometry::default());
//! drive.drive_with_voltage(6.0, 6.0);
//! ```

use std::{cell::RefCell, f64::consts::PI, rc::Rc, time::Duration};

use super::{BrakeMode, Delay, HardwareError, HeadingSensor, MotorGroup};
use crate::util::{MAX_VOLTAGE, normalize_unsigned};

/// Physical parameters of the simulated robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Wheel diameter in inches.
    pub wheel_diameter: f64,
    /// Wheel revolutions per motor revolution.
    pub gear_ratio:     f64,
    /// Distance between the left and right wheels in inches.
    pub track_width:    f64,
    /// Motor speed at full voltage in degrees per second.
    pub max_speed:      f64,
    /// Time constant of the motor response in seconds.
    pub time_constant:  f64,
    /// Integration step.
    pub substep:        Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            wheel_diameter: 3.25,
            gear_ratio:     0.75,
            track_width:    12.0,
            max_speed:      1200.0,
            time_constant:  0.05,
            substep:        Duration::from_millis(1),
        }
    }
}

/// Which side of the drivetrain an event targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// A command received by one of the simulated motor groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    Voltage(f64),
    Brake(BrakeMode),
    ResetPosition,
}

/// A command together with the simulated time and side it arrived on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimEvent {
    pub at:      Duration,
    pub side:    Side,
    pub command: SimCommand,
}

#[derive(Debug, Default)]
struct Wheel {
    voltage:  f64,
    /// `None` while powered.
    brake:    Option<BrakeMode>,
    velocity: f64,
    position: f64,
}

impl Wheel {
    fn step(&mut self, config: &SimConfig, dt: f64) {
        let tau = config.time_constant;
        match self.brake {
            None => {
                let target = self.voltage / MAX_VOLTAGE * config.max_speed;
                self.velocity = target + (self.velocity - target) * (-dt / tau).exp();
            }
            Some(BrakeMode::Hold) => self.velocity = 0.0,
            Some(BrakeMode::Brake) => self.velocity *= (-dt / (tau * 0.5)).exp(),
            Some(BrakeMode::Coast) => self.velocity *= (-dt / (tau * 5.0)).exp(),
        }
        self.position += self.velocity * dt;
    }
}

#[derive(Debug)]
struct World {
    config:        SimConfig,
    time:          Duration,
    left:          Wheel,
    right:         Wheel,
    heading:       f64,
    imu_connected: bool,
    events:        Vec<SimEvent>,
}

impl World {
    fn wheel(&mut self, side: Side) -> &mut Wheel {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    fn record(&mut self, side: Side, command: SimCommand) {
        let at = self.time;
        self.events.push(SimEvent { at, side, command });
    }

    fn linear(&self, degrees_per_second: f64) -> f64 {
        degrees_per_second / 360.0 * self.config.gear_ratio * PI * self.config.wheel_diameter
    }

    fn advance(&mut self, duration: Duration) {
        let step = self.config.substep.max(Duration::from_micros(1));
        let mut remaining = duration;
        while !remaining.is_zero() {
            let dt = remaining.min(step);
            let secs = dt.as_secs_f64();
            let config = self.config;
            self.left.step(&config, secs);
            self.right.step(&config, secs);
            let turn_rate = (self.linear(self.left.velocity) - self.linear(self.right.velocity)) /
                self.config.track_width;
            self.heading += turn_rate.to_degrees() * secs;
            self.time += dt;
            remaining -= dt;
        }
    }
}

/// A simulated robot that hands out hardware handles sharing one world.
#[derive(Clone)]
pub struct SimDrivetrain {
    world: Rc<RefCell<World>>,
}

impl Default for SimDrivetrain {
    fn default() -> Self { Self::new(SimConfig::default()) }
}

impl SimDrivetrain {
    pub fn new(config: SimConfig) -> Self {
        Self {
            world: Rc::new(RefCell::new(World {
                config,
                time: Duration::ZERO,
                left: Wheel::default(),
                right: Wheel::default(),
                heading: 0.0,
                imu_connected: true,
                events: Vec::new(),
            })),
        }
    }

    /// The left motor group.
    pub fn left(&self) -> SimMotorGroup { self.group(Side::Left) }

    /// The right motor group.
    pub fn right(&self) -> SimMotorGroup { self.group(Side::Right) }

    fn group(&self, side: Side) -> SimMotorGroup {
        SimMotorGroup {
            world: self.world.clone(),
            side,
        }
    }

    /// The inertial sensor.
    pub fn imu(&self) -> SimImu {
        SimImu {
            world: self.world.clone(),
        }
    }

    /// A delay that advances simulated time instead of sleeping.
    pub fn delay(&self) -> SimDelay {
        SimDelay {
            world: self.world.clone(),
        }
    }

    /// Elapsed simulated time.
    pub fn time(&self) -> Duration { self.world.borrow().time }

    /// The unwrapped heading in degrees.
    pub fn heading(&self) -> f64 { self.world.borrow().heading }

    /// Rotates the simulated robot without touching the wheels.
    pub fn set_heading(&self, degrees: f64) { self.world.borrow_mut().heading = degrees; }

    /// Motor positions of the left and right groups in degrees.
    pub fn positions(&self) -> (f64, f64) {
        let world = self.world.borrow();
        (world.left.position, world.right.position)
    }

    /// Motor velocities of the left and right groups in degrees per second.
    pub fn velocities(&self) -> (f64, f64) {
        let world = self.world.borrow();
        (world.left.velocity, world.right.velocity)
    }

    /// Sets both sides spinning without recording a command.
    pub fn set_velocities(&self, left: f64, right: f64) {
        let mut world = self.world.borrow_mut();
        world.left.velocity = left;
        world.right.velocity = right;
    }

    /// The brake mode of a side, or `None` if it is powered.
    pub fn brake_mode(&self, side: Side) -> Option<BrakeMode> {
        self.world.borrow_mut().wheel(side).brake
    }

    /// Unplugs or reconnects the inertial sensor.
    pub fn set_imu_connected(&self, connected: bool) {
        self.world.borrow_mut().imu_connected = connected;
    }

    /// Every command received so far, oldest first.
    pub fn events(&self) -> Vec<SimEvent> { self.world.borrow().events.clone() }

    pub fn clear_events(&self) { self.world.borrow_mut().events.clear(); }

    /// Pairs up consecutive left/right voltage commands issued at the same
    /// instant, as written by one control-loop tick.
    pub fn voltage_pairs(&self) -> Vec<(f64, f64)> {
        let world = self.world.borrow();
        world
            .events
            .windows(2)
            .filter_map(|pair| match (pair[0], pair[1]) {
                (
                    SimEvent {
                        at: a,
                        side: Side::Left,
                        command: SimCommand::Voltage(left),
                    },
                    SimEvent {
                        at: b,
                        side: Side::Right,
                        command: SimCommand::Voltage(right),
                    },
                ) if a == b => Some((left, right)),
                _ => None,
            })
            .collect()
    }
}

/// One side of a [`SimDrivetrain`].
pub struct SimMotorGroup {
    world: Rc<RefCell<World>>,
    side:  Side,
}

impl MotorGroup for SimMotorGroup {
    fn set_voltage(&mut self, volts: f64) -> Result<(), HardwareError> {
        let mut world = self.world.borrow_mut();
        world.record(self.side, SimCommand::Voltage(volts));
        let wheel = world.wheel(self.side);
        wheel.voltage = volts.clamp(-MAX_VOLTAGE, MAX_VOLTAGE);
        wheel.brake = None;
        Ok(())
    }

    fn brake(&mut self, mode: BrakeMode) -> Result<(), HardwareError> {
        let mut world = self.world.borrow_mut();
        world.record(self.side, SimCommand::Brake(mode));
        let wheel = world.wheel(self.side);
        wheel.voltage = 0.0;
        wheel.brake = Some(mode);
        Ok(())
    }

    fn position(&self) -> Result<f64, HardwareError> {
        Ok(self.world.borrow_mut().wheel(self.side).position)
    }

    fn reset_position(&mut self) -> Result<(), HardwareError> {
        let mut world = self.world.borrow_mut();
        world.record(self.side, SimCommand::ResetPosition);
        world.wheel(self.side).position = 0.0;
        Ok(())
    }
}

/// The inertial sensor of a [`SimDrivetrain`].
///
/// Reports heading wrapped to `[0, 360)` like the V5 inertial sensor.
pub struct SimImu {
    world: Rc<RefCell<World>>,
}

impl HeadingSensor for SimImu {
    fn heading(&self) -> Result<f64, HardwareError> {
        let world = self.world.borrow();
        if !world.imu_connected {
            return Err(HardwareError::Disconnected);
        }
        Ok(normalize_unsigned(world.heading))
    }

    fn set_heading(&mut self, degrees: f64) -> Result<(), HardwareError> {
        let mut world = self.world.borrow_mut();
        if !world.imu_connected {
            return Err(HardwareError::Disconnected);
        }
        world.heading = degrees;
        Ok(())
    }
}

/// Advances the simulation of a [`SimDrivetrain`].
pub struct SimDelay {
    world: Rc<RefCell<World>>,
}

impl Delay for SimDelay {
    fn delay(&mut self, duration: Duration) { self.world.borrow_mut().advance(duration); }

    fn now(&self) -> Duration { self.world.borrow().time }
}

/// A standalone motor with no physics that remembers what it was told.
///
/// Useful for mecanum corners and other mechanisms outside the drivetrain.
#[derive(Debug, Default)]
pub struct SimMotor {
    pub voltage:  f64,
    pub brake:    Option<BrakeMode>,
    pub position: f64,
    pub commands: Vec<SimCommand>,
}

impl MotorGroup for SimMotor {
    fn set_voltage(&mut self, volts: f64) -> Result<(), HardwareError> {
        self.commands.push(SimCommand::Voltage(volts));
        self.voltage = volts;
        self.brake = None;
        Ok(())
    }

    fn brake(&mut self, mode: BrakeMode) -> Result<(), HardwareError> {
        self.commands.push(SimCommand::Brake(mode));
        self.voltage = 0.0;
        self.brake = Some(mode);
        Ok(())
    }

    fn position(&self) -> Result<f64, HardwareError> { Ok(self.position) }

    fn reset_position(&mut self) -> Result<(), HardwareError> {
        self.commands.push(SimCommand::ResetPosition);
        self.position = 0.0;
        Ok(())
    }
}
