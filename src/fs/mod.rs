//! Filesystem utilities.
//!
//! # Logging
//!
//! The `logger` submodule installs a [`log`] backend that writes every
//! record to the console and to `log.txt`, so a run on the robot can be
//! read back from the SD card afterwards.
//!
//! ```no_run
//! use chassis::fs::logger;
//! use log::{LevelFilter, info};
//!
//! logger::init(LevelFilter::Debug).expect("Failed to initialize logger");
//! info!("Robot initialized");
//! ```

/// Console and file logging.
pub mod logger;
