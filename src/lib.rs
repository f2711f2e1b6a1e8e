//! scopelog - daily-rotated log files with request-scoped buffering
//!
//! Two ways to log:
//!
//! - direct, level-gated writes through [`LogGate`] or the process-wide
//!   macros ([`infof!`], [`errorln!`], ...), one line per call;
//! - a [`ScopedLogger`] per operation that buffers lines in memory and writes
//!   one combined line per severity on [`ScopedLogger::flush`].
//!
//! Logging never fails the caller: missing configuration and I/O errors turn
//! the call into a no-op.

pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod severity;

pub use config::LogConfig;
pub use error::LogError;
pub use logging::global::{configure, configure_with, is_configured, new_scoped};
pub use logging::{LogGate, OperationContext, ScopedLogger};
pub use severity::Severity;
