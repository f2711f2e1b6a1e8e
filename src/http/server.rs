//! Demo HTTP server
//!
//! A couple of routes wrapped in the request logging middleware, enough to
//! watch scoped lines land in the log directory.

use anyhow::Result;
use axum::{http::StatusCode, routing::get, Extension, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::{with_request_logging, RequestLog};
use crate::logging::LogGate;

/// Handle to control the running server
pub struct ServerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    addr: SocketAddr,
}

impl ServerHandle {
    /// Get the address the server is listening on
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shutdown the server gracefully
    ///
    /// Returns once in-flight requests have completed and been flushed and
    /// the listener is closed.
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            // Ignore error if receiver is already dropped
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            task.await?;
        }
        Ok(())
    }
}

/// Routes of the demo server, with request logging applied
pub fn router(gate: Arc<LogGate>) -> Router {
    let routes = Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/fail", get(fail_handler));

    with_request_logging(routes, gate)
}

/// Start the demo server on 127.0.0.1:`port`
///
/// Port 0 picks a free port; see [`ServerHandle::addr`].
pub async fn start(port: u16, gate: Arc<LogGate>) -> Result<ServerHandle> {
    let app = router(gate);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound_addr = listener.local_addr()?;

    info!("Server listening on {}", bound_addr);

    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async {
                shutdown_rx.await.ok();
                info!("Server shutting down");
            })
            .await
        {
            warn!("Server error: {}", e);
        }
    });

    Ok(ServerHandle {
        shutdown_tx: Some(shutdown_tx),
        task: Some(task),
        addr: bound_addr,
    })
}

/// GET /
async fn index_handler(Extension(log): Extension<RequestLog>) -> &'static str {
    log.infoln(&[&"index", &"served"]);
    log.debugf(format_args!("handler {}", "index_handler"));
    "scopelog\n"
}

/// GET /health
async fn health_handler(Extension(log): Extension<RequestLog>) -> StatusCode {
    log.infoln(&[&"health", &"ok"]);
    StatusCode::OK
}

/// GET /fail
///
/// Always fails, to show error lines being collected.
async fn fail_handler(Extension(log): Extension<RequestLog>) -> StatusCode {
    log.infoln(&[&"about", &"to", &"fail"]);
    log.errorf(format_args!("simulated failure, code {}", 500));
    StatusCode::INTERNAL_SERVER_ERROR
}
