//! quakewatch-feeds — feed retrieval and the background poller.
//!
//! [`client`] performs a single GET against the USGS feed and returns the raw
//! body. [`poller`] drives the fetch → parse → commit cycle on a timer and
//! publishes the resulting [`quakewatch_core::Snapshot`] to readers.

pub mod client;
pub mod poller;

pub use client::{FeedSource, FetchError, HttpFeed};
pub use poller::{Poller, Settings};
