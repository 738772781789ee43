//! Shared test utilities for quakewatch integration harnesses.
//!
//! Import everything you need via `mod common; use common::*;` at the top of
//! each harness file.

pub mod builders;
pub mod fake_feed;
pub mod fixtures;

pub use builders::*;
pub use fake_feed::FakeFeed;
pub use fixtures::*;
