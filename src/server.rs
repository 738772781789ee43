//! Status endpoint — a one-route HTTP server over the poller's snapshot.
//!
//! `GET /status` answers with
//!
//! ```json
//! {"status": "Updated: 3 quakes", "count": 3, "latest": {"place": "...", "mag": 4.7}}
//! ```
//!
//! `latest` is the first record in the snapshot's current ordering and is
//! omitted when there are no records. The handler only goes through
//! [`Poller::snapshot`], so a request waits on nothing longer than the
//! snapshot lock.
//!
//! [`StatusServer::spawn`] returns a [`ServerHandle`] that owns the serving
//! task; [`ServerHandle::shutdown`] stops it gracefully and joins it.

use axum::{extract::State, routing::get, Json, Router};
use quakewatch_core::Snapshot;
use quakewatch_feeds::Poller;
use serde::Serialize;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, ToSocketAddrs};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// JSON body of `GET /status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusBody {
    pub status: String,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest: Option<LatestQuake>,
}

/// Summary of the representative record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatestQuake {
    pub place: String,
    pub mag: f64,
}

impl From<&Snapshot> for StatusBody {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            status: snapshot.status.to_string(),
            count: snapshot.quakes.len(),
            latest: snapshot.latest().map(|q| LatestQuake {
                place: q.place.clone(),
                mag: q.magnitude,
            }),
        }
    }
}

/// Build the router. Exposed separately so tests can drive it with
/// `tower::ServiceExt::oneshot` without binding a socket.
pub fn router(poller: Arc<Poller>) -> Router {
    Router::new()
        .route("/status", get(status))
        .with_state(poller)
}

async fn status(State(poller): State<Arc<Poller>>) -> Json<StatusBody> {
    Json(StatusBody::from(&poller.snapshot()))
}

// ---------------------------------------------------------------------------
// Server lifecycle
// ---------------------------------------------------------------------------

/// A bound listener that has not started serving yet.
pub struct StatusServer {
    listener: TcpListener,
}

impl StatusServer {
    pub async fn bind(addr: impl ToSocketAddrs) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Start serving on a spawned task.
    pub fn spawn(self, poller: Arc<Poller>) -> io::Result<ServerHandle> {
        let local_addr = self.listener.local_addr()?;
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let app = router(poller);

        tracing::info!(addr = %local_addr, "status endpoint listening");
        let handle = tokio::spawn(async move {
            axum::serve(self.listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await
        });

        Ok(ServerHandle {
            local_addr,
            cancel,
            handle,
        })
    }
}

/// Owner of a running status server.
pub struct ServerHandle {
    local_addr: SocketAddr,
    cancel: CancellationToken,
    handle: JoinHandle<io::Result<()>>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting connections, let in-flight requests finish, and wait
    /// for the serving task to exit.
    pub async fn shutdown(self) -> io::Result<()> {
        self.cancel.cancel();
        let result = match self.handle.await {
            Ok(result) => result,
            Err(err) => Err(io::Error::other(err)),
        };
        tracing::info!(addr = %self.local_addr, "status endpoint stopped");
        result
    }
}
