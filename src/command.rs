//! Text commands for driving the robot from a serial console.
//!
//! One command per line:
//!
//! ```text
//! drive 24
//! turn 90
//! set_heading 180
//! ```
//!
//! Drives and turns run at a gentle 6 V ceiling, and every executed command
//! ends by coasting the drivetrain.

use std::{io::BufRead, str::FromStr};

use log::{info, warn};
use thiserror::Error;

use crate::{
    drivetrain::Drive,
    hardware::{BrakeMode, Delay, HeadingSensor, MotorGroup},
    motion::MotionOutcome,
};

/// Voltage ceiling for remote drives and turns.
pub const REMOTE_MAX_VOLTAGE: f64 = 6.0;

/// A parsed remote command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RemoteCommand {
    /// `drive <inches>`
    Drive(f64),
    /// `turn <degrees>`
    Turn(f64),
    /// `set_heading <degrees>`
    SetHeading(f64),
}

/// Errors from reading or parsing a remote command.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`")]
    UnknownCommand(String),
    #[error("`{0}` needs a numeric argument")]
    MissingArgument(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("failed to read command: {0}")]
    Io(#[from] std::io::Error),
}

impl FromStr for RemoteCommand {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let constructor: fn(f64) -> Self = match name {
            "drive" => Self::Drive,
            "turn" => Self::Turn,
            "set_heading" => Self::SetHeading,
            _ => return Err(CommandError::UnknownCommand(name.to_string())),
        };
        let argument = words
            .next()
            .ok_or_else(|| CommandError::MissingArgument(name.to_string()))?;
        let value = argument
            .parse::<f64>()
            .map_err(|_| CommandError::InvalidNumber(argument.to_string()))?;
        Ok(constructor(value))
    }
}

impl RemoteCommand {
    /// Runs the command on `drive`, then coasts.
    ///
    /// Returns how the motion ended, or `None` for `set_heading`.
    pub fn execute<M, S, D>(self, drive: &mut Drive<M, S, D>) -> Option<MotionOutcome>
    where
        M: MotorGroup,
        S: HeadingSensor,
        D: Delay,
    {
        info!("Remote command: {:?}", self);
        let outcome = match self {
            RemoteCommand::Drive(inches) => {
                Some(drive.drive_distance_with(inches, REMOTE_MAX_VOLTAGE))
            }
            RemoteCommand::Turn(degrees) => {
                Some(drive.turn_to_heading_with(degrees, REMOTE_MAX_VOLTAGE))
            }
            RemoteCommand::SetHeading(degrees) => {
                drive.set_heading(degrees);
                None
            }
        };
        drive.stop(BrakeMode::Coast);
        outcome
    }
}

/// Reads the next command from `reader` and executes it.
///
/// Blank lines are skipped, so `Ok(None)` only means end of input. A line
/// that does not parse is logged and returned as an error without moving
/// the robot.
pub fn poll<R, M, S, D>(
    reader: &mut R,
    drive: &mut Drive<M, S, D>,
) -> Result<Option<RemoteCommand>, CommandError>
where
    R: BufRead,
    M: MotorGroup,
    S: HeadingSensor,
    D: Delay,
{
    let mut line = String::new();
    let command = loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        match line.parse::<RemoteCommand>() {
            Ok(command) => break command,
            Err(CommandError::Empty) => continue,
            Err(e) => {
                warn!("Rejected remote command {:?}: {}", line.trim(), e);
                return Err(e);
            }
        }
    };
    command.execute(drive);
    Ok(Some(command))
}
