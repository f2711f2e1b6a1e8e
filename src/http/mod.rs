//! HTTP integration
//!
//! Every request gets its own [`ScopedLogger`], keyed by the request URI.
//! Handlers reach it through the [`RequestLog`] request extension; the
//! middleware flushes it once the response is ready and writes one access
//! line per request.

pub mod server;

pub use server::{router, start, ServerHandle};

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use axum::{
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
    Router,
};
use tracing::debug;

use crate::logging::{LogGate, ScopedLogger};

/// Shared handle to the scoped logger of one request
///
/// The logger itself is single-owner; this wrapper adds the mutex needed to
/// reach it from both the handler and the middleware.
#[derive(Debug, Clone)]
pub struct RequestLog {
    inner: Arc<Mutex<ScopedLogger>>,
}

impl RequestLog {
    pub fn new(logger: ScopedLogger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(logger)),
        }
    }

    pub fn infof(&self, args: fmt::Arguments<'_>) {
        self.with(|log| log.infof(args));
    }

    pub fn infoln(&self, fields: &[&dyn fmt::Display]) {
        self.with(|log| log.infoln(fields));
    }

    pub fn errorf(&self, args: fmt::Arguments<'_>) {
        self.with(|log| log.errorf(args));
    }

    pub fn errorln(&self, fields: &[&dyn fmt::Display]) {
        self.with(|log| log.errorln(fields));
    }

    pub fn debugf(&self, args: fmt::Arguments<'_>) {
        self.with(|log| log.debugf(args));
    }

    pub fn debugln(&self, fields: &[&dyn fmt::Display]) {
        self.with(|log| log.debugln(fields));
    }

    /// Flush the underlying logger, returning the number of lines written
    pub fn flush(&self) -> usize {
        self.with(|log| log.flush()).unwrap_or(0)
    }

    fn with<R>(&self, f: impl FnOnce(&mut ScopedLogger) -> R) -> Option<R> {
        // A poisoned lock means a handler panicked mid-append; drop the line
        self.inner.lock().ok().map(|mut log| f(&mut log))
    }
}

/// Middleware binding a [`RequestLog`] to each request
pub async fn scoped_logging(
    State(gate): State<Arc<LogGate>>,
    mut request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().to_string();

    let log = RequestLog::new(ScopedLogger::new(Arc::clone(&gate), uri.as_str()));
    request.extensions_mut().insert(log.clone());

    let response = next.run(request).await;

    let lines = log.flush();
    debug!(%uri, lines, "Flushed request log");

    let elapsed = format!("{}ms", started.elapsed().as_millis());
    gate.access_log(&[&method, &uri, &response.status().as_u16(), &elapsed]);

    response
}

/// Wrap every route of `router` with [`scoped_logging`]
pub fn with_request_logging(router: Router, gate: Arc<LogGate>) -> Router {
    router.layer(middleware::from_fn_with_state(gate, scoped_logging))
}
