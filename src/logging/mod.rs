//! Logging system for scopelog
//!
//! Provides daily-rotated per-severity log files, a level gate for direct
//! writes, and request-scoped loggers that buffer lines until the operation
//! finishes.

mod buffer;
mod file_writer;
mod gate;
pub mod global;
mod scoped;

pub use buffer::{LineBuffer, MISSING_OPERATION_ID};
pub use file_writer::{Clock, FixedClock, LogName, RotatingFileSink, SystemClock};
pub use gate::LogGate;
pub use scoped::{OperationContext, ScopedLogger};
