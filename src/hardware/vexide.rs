//! [`MotorGroup`] and [`HeadingSensor`] for vexide smart devices.
//!
//! ```ignore
//! use chassis::{
//!     drivetrain::{Drive, Geometry},
//!     hardware::{StdDelay, vexide::{Imu, VexMotorGroup}},
//! };
//! use vexide::prelude::*;
//!
//! #[vexide::main]
//! async fn main(peripherals: Peripherals) {
//!     let left = VexMotorGroup::new([
//!         Motor::new(peripherals.port_1, Gearset::Blue, Direction::Reverse),
//!         Motor::new(peripherals.port_2, Gearset::Blue, Direction::Reverse),
//!     ]);
//!     let right = VexMotorGroup::new([
//!         Motor::new(peripherals.port_3, Gearset::Blue, Direction::Forward),
//!         Motor::new(peripherals.port_4, Gearset::Blue, Direction::Forward),
//!     ]);
//!     let imu = Imu::new(InertialSensor::new(peripherals.port_5));
//!
//!     let mut drive = Drive::new(left, right, imu, StdDelay::new(), Geometry::new(3.25, 0.75));
//!     drive.drive_distance(24.0);
//! }
//! ```
//!
//! Motions are blocking loops and [`StdDelay`](super::StdDelay) sleeps the
//! thread between ticks. The vexide executor runs on that same thread, so
//! spawned tasks stall until a motion returns. Run motions from the main
//! task and keep background work (screen updates, logging tasks) short or
//! between motions.

use std::{cell::RefCell, rc::Rc};

use log::warn;
use ::vexide::{
    math::Angle,
    prelude::Motor,
    smart::{imu::InertialSensor, motor::BrakeMode as VexBrakeMode},
};

use super::{BrakeMode, HardwareError, HeadingSensor, MotorGroup};

fn device_error(e: impl std::fmt::Display) -> HardwareError { HardwareError::Device(e.to_string()) }

impl From<BrakeMode> for VexBrakeMode {
    fn from(mode: BrakeMode) -> Self {
        match mode {
            BrakeMode::Coast => VexBrakeMode::Coast,
            BrakeMode::Brake => VexBrakeMode::Brake,
            BrakeMode::Hold => VexBrakeMode::Hold,
        }
    }
}

/// Several vexide motors driven as one side of the drivetrain.
///
/// The motors sit in a shared cell so other mechanisms can keep a handle to
/// them.
#[derive(Clone)]
pub struct VexMotorGroup {
    motors: Rc<RefCell<dyn AsMut<[Motor]>>>,
}

impl VexMotorGroup {
    pub fn new<G: AsMut<[Motor]> + 'static>(motors: G) -> Self {
        Self {
            motors: Rc::new(RefCell::new(motors)),
        }
    }

    /// Wraps motors that are already shared.
    pub fn from_shared<G: AsMut<[Motor]> + 'static>(motors: Rc<RefCell<G>>) -> Self {
        Self { motors }
    }

    /// Applies `command` to every motor, attempting all of them and
    /// returning the first failure.
    fn for_each(
        &mut self,
        mut command: impl FnMut(&mut Motor) -> Result<(), HardwareError>,
    ) -> Result<(), HardwareError> {
        let mut motors = self.motors.try_borrow_mut().map_err(device_error)?;
        let mut result = Ok(());
        for motor in motors.as_mut() {
            if let Err(e) = command(motor)
                && result.is_ok()
            {
                result = Err(e);
            }
        }
        result
    }
}

impl MotorGroup for VexMotorGroup {
    fn set_voltage(&mut self, volts: f64) -> Result<(), HardwareError> {
        self.for_each(|motor| motor.set_voltage(volts).map_err(device_error))
    }

    fn brake(&mut self, mode: BrakeMode) -> Result<(), HardwareError> {
        self.for_each(|motor| motor.brake(mode.into()).map_err(device_error))
    }

    /// Averages the motors that answered; a motor that fails is left out.
    fn position(&self) -> Result<f64, HardwareError> {
        let mut motors = self.motors.try_borrow_mut().map_err(device_error)?;
        let mut total = 0.0;
        let mut count = 0;
        for motor in motors.as_mut().iter() {
            match motor.position() {
                Ok(angle) => {
                    total += angle.as_degrees();
                    count += 1;
                }
                Err(e) => warn!("Error Getting Motor Encoder Position: {}", e),
            }
        }
        if count == 0 {
            return Err(HardwareError::Disconnected);
        }
        Ok(total / count as f64)
    }

    fn reset_position(&mut self) -> Result<(), HardwareError> {
        self.for_each(|motor| motor.reset_position().map_err(device_error))
    }
}

/// A V5 inertial sensor.
pub struct Imu {
    sensor: InertialSensor,
}

impl Imu {
    pub fn new(sensor: InertialSensor) -> Self { Self { sensor } }

    pub fn sensor(&mut self) -> &mut InertialSensor { &mut self.sensor }
}

impl HeadingSensor for Imu {
    fn heading(&self) -> Result<f64, HardwareError> {
        self.sensor
            .heading()
            .map(|angle| angle.as_degrees())
            .map_err(device_error)
    }

    fn set_heading(&mut self, degrees: f64) -> Result<(), HardwareError> {
        self.sensor
            .set_heading(Angle::from_degrees(degrees))
            .map_err(device_error)
    }
}
