//! Feed client — one HTTP(S) GET per call, no state, no retries.
//!
//! Retrying is the poller's job (it simply tries again next tick), so a
//! failed fetch comes back as a [`FetchError`] value and nothing more.

use bytes::Bytes;
use futures::future::BoxFuture;
use quakewatch_core::config::FeedConfig;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("could not build HTTP client: {0}")]
    Build(#[source] reqwest::Error),
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("server answered {0}")]
    Status(u16),
    #[error("could not read response body: {0}")]
    Body(#[source] reqwest::Error),
}

/// Anything that can hand the poller a raw feed body.
///
/// Implemented by [`HttpFeed`] for the real endpoint; tests plug in
/// scripted sources.
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> BoxFuture<'_, Result<Bytes, FetchError>>;
}

/// [`FeedSource`] backed by `reqwest`, with TLS and redirect following.
#[derive(Debug, Clone)]
pub struct HttpFeed {
    client: reqwest::Client,
    url: String,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>, timeout: Duration, user_agent: &str) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(FetchError::Build)?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(cfg: &FeedConfig) -> Result<Self, FetchError> {
        Self::new(
            cfg.url.clone(),
            Duration::from_secs(cfg.timeout_secs),
            &cfg.user_agent,
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn get(&self) -> Result<Bytes, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(FetchError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response.bytes().await.map_err(FetchError::Body)
    }
}

impl FeedSource for HttpFeed {
    fn fetch(&self) -> BoxFuture<'_, Result<Bytes, FetchError>> {
        Box::pin(self.get())
    }
}
