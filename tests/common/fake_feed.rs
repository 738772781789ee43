//! Fake USGS feed server for integration tests.
//!
//! Spins up a minimal `axum` HTTP server on a random TCP port bound to
//! 127.0.0.1. Serves:
//! - `GET /feed` — the configured body with the configured status code
//! - `GET /moved` — a 303 redirect to `/feed`
//!
//! # Example
//!
//! ```rust,no_run
//! let feed = FakeFeed::start().await.unwrap();
//! feed.set_body(FEED_THREE).await;
//! let poller = PollerBuilder::new(feed.url()).build();
//! ```

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

/// State shared between the router and test code.
struct FeedState {
    body: String,
    status: StatusCode,
    hits: usize,
}

/// Handle to the running fake feed server.
pub struct FakeFeed {
    addr: SocketAddr,
    state: Arc<Mutex<FeedState>>,
}

impl FakeFeed {
    /// Start the server on a random port, initially serving an empty
    /// feature collection. Returns once the server is listening.
    pub async fn start() -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let state = Arc::new(Mutex::new(FeedState {
            body: r#"{"features":[]}"#.to_string(),
            status: StatusCode::OK,
            hits: 0,
        }));

        let app = Router::new()
            .route("/feed", get(serve_feed))
            .route("/moved", get(|| async { Redirect::to("/feed") }))
            .with_state(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Ok(Self { addr, state })
    }

    /// URL of the feed route.
    pub fn url(&self) -> String {
        format!("http://{}/feed", self.addr)
    }

    /// URL that redirects to [`FakeFeed::url`].
    pub fn redirect_url(&self) -> String {
        format!("http://{}/moved", self.addr)
    }

    pub async fn set_body(&self, body: impl Into<String>) {
        let mut state = self.state.lock().await;
        state.body = body.into();
        state.status = StatusCode::OK;
    }

    /// Make every following request fail with `status`.
    pub async fn fail_with(&self, status: StatusCode) {
        self.state.lock().await.status = status;
    }

    pub async fn hits(&self) -> usize {
        self.state.lock().await.hits
    }
}

async fn serve_feed(State(state): State<Arc<Mutex<FeedState>>>) -> impl IntoResponse {
    let mut state = state.lock().await;
    state.hits += 1;
    if !state.status.is_success() {
        return (state.status, [(header::CONTENT_TYPE, "text/plain")], "unavailable".to_string());
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/geo+json")],
        state.body.clone(),
    )
}
