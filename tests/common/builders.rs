//! Test builders — ergonomic constructors for `Poller` instances wired to a
//! fake feed.
//!
//! These builders are designed for readability in tests, not for production
//! use. They panic on invalid input rather than returning `Result`.

use quakewatch::{HttpFeed, Poller, Quake, Settings};
use std::sync::Arc;
use std::time::Duration;

/// Fluent builder for a [`Poller`] reading from `url`.
pub struct PollerBuilder {
    url: String,
    interval: Duration,
    min_magnitude: f64,
    sort_by_magnitude: bool,
    timeout: Duration,
}

impl PollerBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            interval: Duration::from_secs(15),
            min_magnitude: 0.0,
            sort_by_magnitude: true,
            timeout: Duration::from_secs(5),
        }
    }

    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn min_magnitude(mut self, magnitude: f64) -> Self {
        self.min_magnitude = magnitude;
        self
    }

    pub fn sorted(mut self, sort: bool) -> Self {
        self.sort_by_magnitude = sort;
        self
    }

    pub fn build(self) -> Arc<Poller> {
        let feed = HttpFeed::new(self.url, self.timeout, "quakewatch-tests").unwrap();
        Arc::new(Poller::new(
            Arc::new(feed),
            Settings::new(self.interval, self.min_magnitude, self.sort_by_magnitude),
        ))
    }
}

/// Ids of `quakes`, in order.
pub fn ids(quakes: &[Quake]) -> Vec<&str> {
    quakes.iter().map(|q| q.id.as_str()).collect()
}
