//! Request-scoped buffered logging
//!
//! A [`ScopedLogger`] collects lines for one logical operation (typically one
//! HTTP request) and writes them out on [`ScopedLogger::flush`] as a single
//! line per severity, tagged with the operation identifier.
//!
//! Appends and flush take `&mut self`: one logger belongs to one task. To
//! share a logger between tasks wrap it in a mutex, as
//! [`crate::http::RequestLog`] does.

use std::fmt;
use std::sync::Arc;

use super::buffer::LineBuffer;
use super::file_writer::LogName;
use super::gate::{join_fields, LogGate};
use crate::severity::Severity;

/// Timestamp prefix for flushed lines
const FLUSH_TIMESTAMP_FORMAT: &str = "%H:%M:%S";

const INFO_CAPACITY: usize = 20;
const ERROR_CAPACITY: usize = 20;
const DEBUG_CAPACITY: usize = 5;

/// Identifies the operation a scoped logger belongs to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationContext {
    operation_id: Option<String>,
}

impl OperationContext {
    /// Context for the operation named `operation_id` (e.g. a request URI)
    pub fn new(operation_id: impl Into<String>) -> Self {
        Self {
            operation_id: Some(operation_id.into()),
        }
    }

    /// Context without an identifier; flushed lines get a `-` placeholder
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn operation_id(&self) -> Option<&str> {
        self.operation_id.as_deref()
    }
}

impl From<&str> for OperationContext {
    fn from(operation_id: &str) -> Self {
        Self::new(operation_id)
    }
}

impl From<String> for OperationContext {
    fn from(operation_id: String) -> Self {
        Self::new(operation_id)
    }
}

/// Buffers log lines for one operation and writes them on flush
#[derive(Debug)]
pub struct ScopedLogger {
    gate: Arc<LogGate>,
    context: OperationContext,
    info: LineBuffer,
    error: LineBuffer,
    debug: LineBuffer,
}

impl ScopedLogger {
    /// Create a logger for the operation described by `context`
    pub fn new(gate: Arc<LogGate>, context: impl Into<OperationContext>) -> Self {
        Self {
            gate,
            context: context.into(),
            info: LineBuffer::with_capacity(INFO_CAPACITY),
            error: LineBuffer::with_capacity(ERROR_CAPACITY),
            debug: LineBuffer::with_capacity(DEBUG_CAPACITY),
        }
    }

    pub fn gate(&self) -> &LogGate {
        &self.gate
    }

    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    /// Rebind the operation context, e.g. before reusing the logger
    pub fn set_context(&mut self, context: impl Into<OperationContext>) {
        self.context = context.into();
    }

    pub fn infof(&mut self, args: fmt::Arguments<'_>) {
        self.record(Severity::Info, || args.to_string());
    }

    pub fn infoln(&mut self, fields: &[&dyn fmt::Display]) {
        self.record(Severity::Info, || join_fields(fields));
    }

    pub fn errorf(&mut self, args: fmt::Arguments<'_>) {
        self.record(Severity::Error, || args.to_string());
    }

    pub fn errorln(&mut self, fields: &[&dyn fmt::Display]) {
        self.record(Severity::Error, || join_fields(fields));
    }

    pub fn debugf(&mut self, args: fmt::Arguments<'_>) {
        self.record(Severity::Debug, || args.to_string());
    }

    pub fn debugln(&mut self, fields: &[&dyn fmt::Display]) {
        self.record(Severity::Debug, || join_fields(fields));
    }

    /// Write an access line immediately; not buffered, never gated
    pub fn access_log(&self, fields: &[&dyn fmt::Display]) {
        self.gate.access_log(fields);
    }

    /// Entries waiting for the next flush at `severity`
    pub fn pending(&self, severity: Severity) -> &[String] {
        self.buffer(severity).entries()
    }

    /// Whether nothing is waiting to be flushed
    pub fn is_empty(&self) -> bool {
        !(self.info.has_entries() || self.error.has_entries() || self.debug.has_entries())
    }

    /// Write one line per non-empty severity, then reset every buffer
    ///
    /// Severities are written in the order Info, Error, Debug. A severity
    /// whose file cannot be written is dropped; the others are still
    /// attempted. Returns the number of lines that reached a file.
    pub fn flush(&mut self) -> usize {
        let now = self.gate.now();
        let timestamp = now.format(FLUSH_TIMESTAMP_FORMAT).to_string();
        let operation_id = self.context.operation_id.clone();
        let mut written = 0;

        for severity in Severity::FLUSH_ORDER {
            let buffer = self.buffer_mut(severity);
            if !buffer.has_entries() {
                continue;
            }
            let line = format!("{} {}\n", timestamp, buffer.render(operation_id.as_deref()));
            if self.gate.append(LogName::from(severity), now, &line) {
                written += 1;
            }
        }

        self.info.reset();
        self.error.reset();
        self.debug.reset();
        written
    }

    fn record(&mut self, severity: Severity, message: impl FnOnce() -> String) {
        if !self.gate.enabled(severity) {
            return;
        }
        let message = single_line(&message());
        self.buffer_mut(severity).push(message);
    }

    fn buffer(&self, severity: Severity) -> &LineBuffer {
        match severity {
            Severity::Info => &self.info,
            Severity::Error => &self.error,
            Severity::Debug => &self.debug,
        }
    }

    fn buffer_mut(&mut self, severity: Severity) -> &mut LineBuffer {
        match severity {
            Severity::Info => &mut self.info,
            Severity::Error => &mut self.error,
            Severity::Debug => &mut self.debug,
        }
    }
}

/// Drop trailing line breaks and turn interior ones into spaces
fn single_line(message: &str) -> String {
    message
        .trim_end_matches(|c: char| c == '\r' || c == '\n')
        .replace("\r\n", " ")
        .replace(|c: char| c == '\r' || c == '\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogConfig;
    use crate::logging::file_writer::FixedClock;
    use chrono::{Local, TimeZone};
    use std::path::Path;
    use tempfile::TempDir;

    fn gate_in(dir: &Path, level: &str) -> Arc<LogGate> {
        let clock = FixedClock(Local.with_ymd_and_hms(2026, 10, 18, 14, 2, 3).unwrap());
        Arc::new(LogGate::new(&LogConfig::new(dir, level)).with_clock(clock))
    }

    fn read_log(dir: &Path, name: &str) -> Option<String> {
        std::fs::read_to_string(dir.join(format!("{}-261018", name))).ok()
    }

    fn file_count(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_end_to_end_request() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), "/home");

        logger.infoln(&[&"hello"]);
        logger.debugln(&[&"hidden"]);
        logger.errorln(&[&"boom"]);

        assert_eq!(logger.flush(), 2);

        let info = read_log(temp_dir.path(), "info.log").unwrap();
        let error = read_log(temp_dir.path(), "error.log").unwrap();
        assert_eq!(info, "14:02:03 /home hello\n");
        assert_eq!(error, "14:02:03 /home boom\n");
        assert!(read_log(temp_dir.path(), "debug.log").is_none());
    }

    #[test]
    fn test_existing_debug_file_gains_no_line() {
        let temp_dir = TempDir::new().unwrap();
        let debug_path = temp_dir.path().join("debug.log-261018");
        std::fs::write(&debug_path, "earlier run\n").unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), "/home");

        logger.infoln(&[&"hello"]);
        logger.debugln(&[&"hidden"]);
        logger.errorln(&[&"boom"]);
        assert_eq!(logger.flush(), 2);

        assert_eq!(std::fs::read_to_string(&debug_path).unwrap(), "earlier run\n");
        assert_eq!(read_log(temp_dir.path(), "info.log").unwrap(), "14:02:03 /home hello\n");
    }

    #[test]
    fn test_flush_without_appends_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "DEBUG"), "/idle");

        assert!(logger.is_empty());
        assert_eq!(logger.flush(), 0);
        assert_eq!(file_count(temp_dir.path()), 0);
    }

    #[test]
    fn test_flush_preserves_append_order() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), "/order");

        logger.infoln(&[&"a"]);
        logger.infof(format_args!("{}", "b"));
        logger.infoln(&[&"c", &1]);
        logger.flush();

        let info = read_log(temp_dir.path(), "info.log").unwrap();
        assert_eq!(info, "14:02:03 /order a b c 1\n");
    }

    #[test]
    fn test_flush_resets_buffers() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "DEBUG"), "/twice");

        logger.infoln(&[&"one"]);
        logger.errorln(&[&"two"]);
        logger.debugln(&[&"three"]);
        assert_eq!(logger.flush(), 3);
        assert!(logger.is_empty());

        assert_eq!(logger.flush(), 0);

        // Each file still holds exactly one line
        for name in ["info.log", "error.log", "debug.log"] {
            let content = read_log(temp_dir.path(), name).unwrap();
            assert_eq!(content.lines().count(), 1, "{}", name);
        }
    }

    #[test]
    fn test_errors_never_gated() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "ERROR"), "/quiet");

        logger.infof(format_args!("info"));
        logger.debugf(format_args!("debug"));
        logger.errorf(format_args!("error {}", 500));

        assert!(logger.pending(Severity::Info).is_empty());
        assert!(logger.pending(Severity::Debug).is_empty());
        assert_eq!(logger.pending(Severity::Error), ["error 500"]);
    }

    #[test]
    fn test_trailing_newlines_trimmed_from_entries() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), "/nl");

        logger.infof(format_args!("first\n"));
        logger.infof(format_args!("second\r\n"));

        assert_eq!(logger.pending(Severity::Info), ["first", "second"]);
    }

    #[test]
    fn test_interior_newlines_become_spaces() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), "/multi");

        logger.infof(format_args!("a\nb"));
        logger.infoln(&[&"c\r\nd"]);
        logger.flush();

        let info = read_log(temp_dir.path(), "info.log").unwrap();
        assert_eq!(info, "14:02:03 /multi a b c d\n");
        assert_eq!(info.lines().count(), 1);
    }

    #[test]
    fn test_missing_operation_id_uses_placeholder() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger =
            ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), OperationContext::empty());

        logger.infoln(&[&"anonymous"]);
        logger.flush();

        let info = read_log(temp_dir.path(), "info.log").unwrap();
        assert_eq!(info, "14:02:03 - anonymous\n");
    }

    #[test]
    fn test_set_context_reuses_logger() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "INFO"), "/first");

        logger.infoln(&[&"one"]);
        logger.flush();

        logger.set_context("/second");
        assert_eq!(logger.context().operation_id(), Some("/second"));
        logger.infoln(&[&"two"]);
        logger.flush();

        let info = read_log(temp_dir.path(), "info.log").unwrap();
        assert_eq!(info, "14:02:03 /first one\n14:02:03 /second two\n");
    }

    #[test]
    fn test_failed_flush_drops_entries() {
        let temp_dir = TempDir::new().unwrap();
        let log_dir = temp_dir.path().join("later");
        let mut logger = ScopedLogger::new(gate_in(&log_dir, "INFO"), "/lost");

        logger.infoln(&[&"gone"]);
        logger.errorln(&[&"also gone"]);
        assert_eq!(logger.flush(), 0);
        assert!(logger.is_empty());

        // Directory appears afterwards; nothing was kept for a retry
        std::fs::create_dir(&log_dir).unwrap();
        assert_eq!(logger.flush(), 0);
        assert_eq!(file_count(&log_dir), 0);
    }

    #[test]
    fn test_one_failed_severity_does_not_block_others() {
        let temp_dir = TempDir::new().unwrap();
        // A directory in place of the info file makes only that open fail
        std::fs::create_dir(temp_dir.path().join("info.log-261018")).unwrap();
        let mut logger = ScopedLogger::new(gate_in(temp_dir.path(), "DEBUG"), "/partial");

        logger.infoln(&[&"i"]);
        logger.errorln(&[&"e"]);
        logger.debugln(&[&"d"]);

        assert_eq!(logger.flush(), 2);
        assert!(logger.is_empty());
        assert_eq!(
            read_log(temp_dir.path(), "error.log").unwrap(),
            "14:02:03 /partial e\n"
        );
        assert_eq!(
            read_log(temp_dir.path(), "debug.log").unwrap(),
            "14:02:03 /partial d\n"
        );
    }

    #[test]
    fn test_unconfigured_gate_flush_is_silent() {
        let mut logger = ScopedLogger::new(Arc::new(LogGate::unconfigured()), "/early");

        logger.infoln(&[&"ignored by threshold"]);
        logger.errorln(&[&"recorded"]);
        assert_eq!(logger.pending(Severity::Error).len(), 1);

        assert_eq!(logger.flush(), 0);
        assert!(logger.is_empty());
    }

    #[test]
    fn test_scoped_logger_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<ScopedLogger>();
    }
}
