//! Console and file logger for robot programs.
//!
//! [`ChassisLogger`] implements the [`log`] facade. Every record is printed
//! to the terminal and appended to a log file, which defaults to `log.txt`
//! (the root of the SD card on a V5 Brain).
//!
//! Each line reads `LEVEL [uptime] target - message`:
//!
//! ```text
//! INFO [2s 130ms] chassis::drivetrain::motion - Turn settled after 1.25s at 89.4 deg
//! WARN [2s 140ms] chassis::drivetrain - Inertial Sensor Heading Error: device disconnected
//! ```
//!
//! ```no_run
//! use chassis::fs::logger;
//! use log::{LevelFilter, info};
//!
//! logger::init(LevelFilter::Info).expect("logger already set");
//! info!("Program started");
//! ```

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
    sync::{Mutex, OnceLock},
    time::{Duration, Instant},
};

use humantime::format_duration;
use log::{LevelFilter, Metadata, Record, SetLoggerError};

/// The file written by [`init`].
pub const DEFAULT_LOG_FILE: &str = "log.txt";

/// A logger writing to the console and a file.
pub struct ChassisLogger {
    /// `None` if the file could not be opened, e.g. with no SD card.
    file:  Mutex<Option<BufWriter<File>>>,
    #[cfg_attr(all(feature = "vexide", target_os = "vexos"), allow(dead_code))]
    start: Instant,
}

impl ChassisLogger {
    /// Creates a logger writing to `path`, truncating any earlier log.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .ok()
            .map(BufWriter::new);

        Self {
            file:  Mutex::new(file),
            start: Instant::now(),
        }
    }

    /// Whether the log file is open.
    pub fn has_file(&self) -> bool { self.file.lock().map(|f| f.is_some()).unwrap_or(false) }

    #[cfg(all(feature = "vexide", target_os = "vexos"))]
    fn uptime(&self) -> Duration { vexide::time::user_uptime() }

    #[cfg(not(all(feature = "vexide", target_os = "vexos")))]
    fn uptime(&self) -> Duration { self.start.elapsed() }
}

impl log::Log for ChassisLogger {
    fn enabled(&self, metadata: &Metadata) -> bool { metadata.level() <= log::max_level() }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = format_line(record, self.uptime());
        print!("{}", line);

        if let Ok(mut file) = self.file.lock()
            && let Some(writer) = file.as_mut()
        {
            let _ = writer.write_all(line.as_bytes());
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock()
            && let Some(writer) = file.as_mut()
        {
            let _ = writer.flush();
        }
    }
}

/// Formats one log line, newline included.
pub fn format_line(record: &Record, uptime: Duration) -> String {
    // Whole milliseconds keep the line short.
    let uptime = Duration::from_millis(uptime.as_millis() as u64);
    format!(
        "{} [{}] {} - {}\n",
        record.level(),
        format_duration(uptime),
        record.target(),
        record.args()
    )
}

static LOGGER: OnceLock<ChassisLogger> = OnceLock::new();

/// Installs a [`ChassisLogger`] writing to [`DEFAULT_LOG_FILE`].
///
/// # Errors
///
/// Returns [`SetLoggerError`] if a logger has already been set.
pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    init_with_file(DEFAULT_LOG_FILE, level)
}

/// Installs a [`ChassisLogger`] writing to `path`.
///
/// Only the first call opens a file; later calls fail without touching the
/// filesystem again.
pub fn init_with_file(path: impl AsRef<Path>, level: LevelFilter) -> Result<(), SetLoggerError> {
    let logger = LOGGER.get_or_init(|| ChassisLogger::new(path));
    log::set_logger(logger).map(|()| log::set_max_level(level))
}
