//! Process-wide gate
//!
//! [`configure`] installs the gate once at startup. Until then every entry
//! point behaves as if only errors were enabled and no directory existed:
//! calls complete, nothing is written, and a warning goes to `tracing`.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use tracing::{info, warn};

use super::gate::LogGate;
use super::scoped::{OperationContext, ScopedLogger};
use crate::config::LogConfig;

static GATE: OnceLock<Arc<LogGate>> = OnceLock::new();
static UNCONFIGURED: OnceLock<Arc<LogGate>> = OnceLock::new();

/// Configure process-wide logging into `log_dir` at `level`
///
/// `level` is matched case-insensitively against ERROR, INFO and DEBUG;
/// anything else means Error-only. See [`configure_with`].
pub fn configure(log_dir: impl Into<PathBuf>, level: &str) -> Arc<LogGate> {
    configure_with(LogConfig::new(log_dir, level))
}

/// Install `config` as the process-wide configuration
///
/// Creates the log directory if it is missing. Only the first call takes
/// effect; later calls log a warning and return the gate already installed.
pub fn configure_with(config: LogConfig) -> Arc<LogGate> {
    let mut installed = false;
    let gate = GATE.get_or_init(|| {
        installed = true;
        if let Err(e) = config.ensure_log_dir() {
            warn!("{:#}", e);
        }
        info!(
            log_dir = %config.log_dir.display(),
            level = %config.min_severity,
            "Logging configured"
        );
        Arc::new(LogGate::new(&config))
    });

    if !installed {
        warn!(
            log_dir = %config.log_dir.display(),
            "Logging already configured, ignoring new configuration"
        );
    }

    Arc::clone(gate)
}

/// Whether [`configure`] has run
pub fn is_configured() -> bool {
    GATE.get().is_some()
}

/// The process-wide gate, or an unconfigured one before [`configure`]
pub fn gate() -> Arc<LogGate> {
    let gate = GATE
        .get()
        .unwrap_or_else(|| UNCONFIGURED.get_or_init(|| Arc::new(LogGate::unconfigured())));
    Arc::clone(gate)
}

/// Create a scoped logger on the process-wide gate
///
/// The logger keeps the gate it was created with, so call [`configure`]
/// first: a logger created before that drops everything, even if it is
/// flushed after configuration.
pub fn new_scoped(context: impl Into<OperationContext>) -> ScopedLogger {
    ScopedLogger::new(gate(), context)
}

pub fn infof(args: fmt::Arguments<'_>) {
    gate().infof(args);
}

pub fn infoln(fields: &[&dyn fmt::Display]) {
    gate().infoln(fields);
}

pub fn errorf(args: fmt::Arguments<'_>) {
    gate().errorf(args);
}

pub fn errorln(fields: &[&dyn fmt::Display]) {
    gate().errorln(fields);
}

pub fn debugf(args: fmt::Arguments<'_>) {
    gate().debugf(args);
}

/// Debug line prefixed with the caller's `<file>:<line>`
#[track_caller]
pub fn debugln(fields: &[&dyn fmt::Display]) {
    gate().debugln(fields);
}

pub fn access_log(fields: &[&dyn fmt::Display]) {
    gate().access_log(fields);
}

/// Formatted info line on the process-wide gate
#[macro_export]
macro_rules! infof {
    ($($arg:tt)+) => {
        $crate::logging::global::infof(::std::format_args!($($arg)+))
    };
}

/// Space-joined info line on the process-wide gate
#[macro_export]
macro_rules! infoln {
    ($($field:expr),* $(,)?) => {
        $crate::logging::global::infoln(&[$(&$field as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! errorf {
    ($($arg:tt)+) => {
        $crate::logging::global::errorf(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! errorln {
    ($($field:expr),* $(,)?) => {
        $crate::logging::global::errorln(&[$(&$field as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! debugf {
    ($($arg:tt)+) => {
        $crate::logging::global::debugf(::std::format_args!($($arg)+))
    };
}

/// Space-joined debug line, prefixed with the call site
#[macro_export]
macro_rules! debugln {
    ($($field:expr),* $(,)?) => {
        $crate::logging::global::debugln(&[$(&$field as &dyn ::std::fmt::Display),*])
    };
}

#[macro_export]
macro_rules! access_log {
    ($($field:expr),* $(,)?) => {
        $crate::logging::global::access_log(&[$(&$field as &dyn ::std::fmt::Display),*])
    };
}
