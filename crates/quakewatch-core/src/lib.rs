//! quakewatch-core — shared types and pure logic for quakewatch.
//!
//! Everything here is free of I/O scheduling: the feed [`parser`], the
//! domain [`types`], [`config`] loading and the [`favorites`] key-set store.
//!
//! # Architecture
//!
//! ```text
//! FeedSource ──► parser ──► Poller snapshot ──► /status, CLI
//! ```
//!
//! The network side lives in `quakewatch-feeds`; this crate only sees bytes.

pub mod config;
pub mod favorites;
pub mod parser;
pub mod types;

pub use types::{FeedStatus, Quake, Snapshot};
