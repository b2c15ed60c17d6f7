//! In-memory collaborator implementations
//!
//! Useful for embedding the resolver in tools that already hold their assets
//! in memory, and for unit tests where no network or disk is wanted.

mod cache;
mod origin;

pub use cache::MemoryCache;
pub use origin::MemoryOrigin;
