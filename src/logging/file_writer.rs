//! Daily-rotated log files
//!
//! Resolves a logical log name plus the current date to a physical file
//! (`<dir>/<name>.log-YYMMDD`) and appends to it. Files are never kept open
//! between writes.

use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDate};

use crate::error::LogError;
use crate::severity::Severity;

/// Date suffix appended to every log file name
const DATE_SUFFIX_FORMAT: &str = "%y%m%d";

/// Logical log destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogName {
    Info,
    Error,
    Debug,
    /// Unconditional audit-style lines
    Access,
}

impl LogName {
    /// Base file name, without the date suffix
    pub fn file_name(&self) -> &'static str {
        match self {
            LogName::Info => "info.log",
            LogName::Error => "error.log",
            LogName::Debug => "debug.log",
            LogName::Access => "access.log",
        }
    }
}

impl From<Severity> for LogName {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => LogName::Error,
            Severity::Info => LogName::Info,
            Severity::Debug => LogName::Debug,
        }
    }
}

/// Source of the current local time
pub trait Clock: fmt::Debug + Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Clock pinned to a single instant, for simulating dates
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Local>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.0
    }
}

/// Appends lines to `<dir>/<name>.log-YYMMDD`
///
/// A sink without a directory is "unconfigured": every open fails with
/// [`LogError::NotConfigured`].
#[derive(Debug, Clone, Default)]
pub struct RotatingFileSink {
    log_dir: Option<PathBuf>,
}

impl RotatingFileSink {
    /// Create a sink writing into `log_dir`
    ///
    /// The directory is expected to exist already; it is created at
    /// configuration time, not per write.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: Some(log_dir.into()),
        }
    }

    /// Create a sink that rejects every write
    pub fn unconfigured() -> Self {
        Self::default()
    }

    pub fn is_configured(&self) -> bool {
        self.log_dir.is_some()
    }

    /// Physical path for `name` on `date`
    pub fn path_for(&self, name: LogName, date: NaiveDate) -> Option<PathBuf> {
        self.log_dir.as_ref().map(|dir| {
            dir.join(format!(
                "{}-{}",
                name.file_name(),
                date.format(DATE_SUFFIX_FORMAT)
            ))
        })
    }

    /// Open the file for `name` on `date` for appending, creating it if needed
    pub fn open(&self, name: LogName, date: NaiveDate) -> Result<File, LogError> {
        let path = self.path_for(name, date).ok_or(LogError::NotConfigured)?;
        open_append(&path)
    }

    /// Append `line` to the file for `name` on `date`
    ///
    /// The file is opened and closed within this call.
    pub fn append(&self, name: LogName, date: NaiveDate, line: &str) -> Result<(), LogError> {
        let path = self.path_for(name, date).ok_or(LogError::NotConfigured)?;
        let mut file = open_append(&path)?;
        file.write_all(line.as_bytes()).map_err(|e| LogError::io(path, e))
    }
}

fn open_append(path: &Path) -> Result<File, LogError> {
    let mut options = OpenOptions::new();
    options.create(true).append(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o666);
    }

    options.open(path).map_err(|e| LogError::io(path, e))
}
