//! Mock collaborators for testing
//!
//! These wrap the in-memory implementations with call counters, recorded
//! arguments, injectable failures and an optional cooperative yield before
//! answering, so tests can observe exactly which tiers a resolution touched.

mod cache;
mod origin;

pub use cache::{MockCache, RecordedPut};
pub use origin::MockOrigin;
