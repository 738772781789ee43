//! Core types for quakewatch-core.
//!
//! This module defines the data structures shared by the parser, the poller
//! and the status endpoint: the normalised [`Quake`] record, the
//! [`FeedStatus`] of the most recent cycle, and the [`Snapshot`] pairing the
//! two.

use chrono::{DateTime, Utc};

/// A single seismic event extracted from one GeoJSON feature.
///
/// Every field has a default. The parser fills in whatever the feature
/// provides and leaves the rest untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quake {
    /// Feed-assigned identifier. Opaque; empty when the feature has none.
    pub id: String,
    /// Event magnitude (conventionally 0–10).
    pub magnitude: f64,
    /// Free-text location description, e.g. `"10km SE of Town"`.
    pub place: String,
    /// Origin time in milliseconds since the Unix epoch. `0` when absent.
    pub time_ms: i64,
    pub longitude: f64,
    pub latitude: f64,
    pub depth_km: f64,
}

impl Quake {
    /// Origin time as a UTC timestamp. `None` when the feed gave no time.
    pub fn time_utc(&self) -> Option<DateTime<Utc>> {
        if self.time_ms == 0 {
            return None;
        }
        DateTime::from_timestamp_millis(self.time_ms)
    }
}

/// Outcome of the most recent fetch cycle, as shown to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FeedStatus {
    /// No cycle has run yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Fetching,
    /// The last cycle committed this many records.
    Updated(usize),
    /// The last cycle failed; previously committed records are kept.
    Error(String),
}

impl FeedStatus {
    /// Status published when the feed could not be retrieved.
    pub fn connection_failed() -> Self {
        FeedStatus::Error("Connection failed".to_string())
    }
}

impl std::fmt::Display for FeedStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedStatus::Idle => write!(f, "Idle"),
            FeedStatus::Fetching => write!(f, "Fetching..."),
            FeedStatus::Updated(count) => write!(f, "Updated: {count} quakes"),
            FeedStatus::Error(reason) => write!(f, "Error: {reason}"),
        }
    }
}

/// The `(records, status)` pair published by the poller.
///
/// Replaced wholesale on every cycle; never mutated in place once readers
/// can see it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub quakes: Vec<Quake>,
    pub status: FeedStatus,
}

impl Snapshot {
    /// The representative record for summaries: the first one in the
    /// snapshot's current ordering.
    pub fn latest(&self) -> Option<&Quake> {
        self.quakes.first()
    }
}
