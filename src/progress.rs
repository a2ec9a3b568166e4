use crate::error::{EtlError, Result};
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Year-Monthname-Day-Hour:Minute:Second, e.g. `2026-Oct-17-14:03:09`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Append-only progress log.
///
/// Every call opens the file, appends one `<timestamp>, <message>` line and
/// closes it again; no handle is kept between calls and the file is never
/// truncated.
pub struct ProgressLogger {
    log_file: PathBuf,
}

impl ProgressLogger {
    /// Creates a logger appending to `log_file`. The file is not touched
    /// until the first message.
    pub fn new(log_file: impl Into<PathBuf>) -> Self {
        Self {
            log_file: log_file.into(),
        }
    }

    /// Appends `message` stamped with the current local time.
    ///
    /// # Errors
    /// Returns `SinkWrite` if the log file cannot be opened or written.
    pub fn log(&self, message: &str) -> Result<()> {
        self.log_at(Local::now(), message)
    }

    /// Appends `message` stamped with `timestamp`.
    pub fn log_at<Tz>(&self, timestamp: DateTime<Tz>, message: &str) -> Result<()>
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        let line = format_line(&timestamp, message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file)
            .map_err(|e| EtlError::sink_write(&self.log_file, e))?;
        file.write_all(line.as_bytes())
            .map_err(|e| EtlError::sink_write(&self.log_file, e))?;

        info!("{}", message);
        Ok(())
    }
}

fn format_line<Tz>(timestamp: &DateTime<Tz>, message: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!("{}, {}\n", timestamp.format(TIMESTAMP_FORMAT), message)
}
