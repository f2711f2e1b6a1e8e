//! Level-gated direct writes
//!
//! [`LogGate`] holds the severity threshold, the rotating sink and the clock.
//! Its entry points format one line and write it immediately; nothing is
//! buffered. Every failure is absorbed here so callers never see one.

use std::fmt::{self, Write as _};
use std::panic::Location;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, warn};

use super::file_writer::{Clock, LogName, RotatingFileSink, SystemClock};
use crate::config::LogConfig;
use crate::error::{categorize_io_error, LogError};
use crate::severity::Severity;

/// Timestamp prefix for direct writes
const DIRECT_TIMESTAMP_FORMAT: &str = "%H:%M:%S%.6f";

/// Severity gate plus rotating file sink
#[derive(Debug, Clone)]
pub struct LogGate {
    min_severity: Severity,
    sink: RotatingFileSink,
    clock: Arc<dyn Clock>,
}

impl LogGate {
    /// Create a gate for `config`
    ///
    /// Does not touch the file system; see [`LogConfig::ensure_log_dir`].
    pub fn new(config: &LogConfig) -> Self {
        Self {
            min_severity: config.min_severity,
            sink: RotatingFileSink::new(&config.log_dir),
            clock: Arc::new(SystemClock),
        }
    }

    /// Gate used before any configuration exists
    ///
    /// Lets only errors through, and those are dropped with a warning
    /// because there is nowhere to write them.
    pub fn unconfigured() -> Self {
        Self {
            min_severity: Severity::Error,
            sink: RotatingFileSink::unconfigured(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock (used to simulate dates)
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn min_severity(&self) -> Severity {
        self.min_severity
    }

    /// Whether a call at `severity` would be recorded
    pub fn enabled(&self, severity: Severity) -> bool {
        self.min_severity.allows(severity)
    }

    pub fn is_configured(&self) -> bool {
        self.sink.is_configured()
    }

    /// Current local time according to this gate's clock
    pub fn now(&self) -> DateTime<Local> {
        self.clock.now()
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.write_gated(Severity::Info, || args.to_string());
    }

    pub fn infoln(&self, fields: &[&dyn fmt::Display]) {
        self.write_gated(Severity::Info, || join_fields(fields));
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.write_gated(Severity::Error, || args.to_string());
    }

    pub fn errorln(&self, fields: &[&dyn fmt::Display]) {
        self.write_gated(Severity::Error, || join_fields(fields));
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.write_gated(Severity::Debug, || args.to_string());
    }

    /// Like [`LogGate::infoln`] at Debug level, prefixed with the caller's
    /// `<file>:<line>`
    #[track_caller]
    pub fn debugln(&self, fields: &[&dyn fmt::Display]) {
        let location = Location::caller();
        self.write_gated(Severity::Debug, || {
            let mut message = caller_prefix(location);
            if !fields.is_empty() {
                message.push(' ');
                message.push_str(&join_fields(fields));
            }
            message
        });
    }

    /// Write an access line; never gated
    pub fn access_log(&self, fields: &[&dyn fmt::Display]) {
        let now = self.now();
        let line = direct_line(now, &join_fields(fields));
        self.append(LogName::Access, now, &line);
    }

    fn write_gated(&self, severity: Severity, message: impl FnOnce() -> String) {
        if !self.enabled(severity) {
            return;
        }
        let now = self.now();
        let line = direct_line(now, &message());
        self.append(LogName::from(severity), now, &line);
    }

    /// Append a finished line to `name`'s file for `now`'s date
    ///
    /// Returns whether the line reached the file. Errors are logged through
    /// `tracing` and otherwise swallowed.
    pub(crate) fn append(&self, name: LogName, now: DateTime<Local>, line: &str) -> bool {
        match self.sink.append(name, now.date_naive(), line) {
            Ok(()) => true,
            Err(err @ LogError::NotConfigured) => {
                warn!(log = name.file_name(), "{}", err);
                false
            }
            Err(LogError::Io { path, source }) => {
                debug!(
                    path = %path.display(),
                    kind = categorize_io_error(&source).description(),
                    error = %source,
                    "Dropped log line"
                );
                false
            }
        }
    }
}

impl Default for LogGate {
    fn default() -> Self {
        Self::unconfigured()
    }
}

/// Join fields with single spaces
pub(crate) fn join_fields(fields: &[&dyn fmt::Display]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{}", field);
    }
    out
}

/// `<file basename>:<line>` for a call site
fn caller_prefix(location: &Location<'_>) -> String {
    let file = Path::new(location.file())
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| location.file().to_string());
    format!("{}:{}", file, location.line())
}

/// Timestamped line, newline-terminated exactly once
fn direct_line(now: DateTime<Local>, message: &str) -> String {
    let mut line = format!("{} {}", now.format(DIRECT_TIMESTAMP_FORMAT), message);
    if !line.ends_with('\n') {
        line.push('\n');
    }
    line
}
