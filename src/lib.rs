//! quakewatch — background USGS earthquake feed poller.
//!
//! This crate wires the workspace together and exposes the pieces so that
//! integration tests and the binary can import them from one place.
//!
//! # Architecture
//!
//! ```text
//! timer ──► FeedSource ──► parser ──► Poller snapshot ──► /status
//!                                         │
//!                                         └──► CLI / other readers
//! ```
//!
//! The poller runs on its own tokio task; the status endpoint runs its own
//! accept loop. Both are owned handles that shut down on request.

pub mod server;

pub use quakewatch_core::{config, favorites, parser, FeedStatus, Quake, Snapshot};
pub use quakewatch_feeds::{FeedSource, FetchError, HttpFeed, Poller, Settings};
