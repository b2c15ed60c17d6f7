//! Collaborator implementations
//!
//! ## Available Implementations
//!
//! - `memory/` - In-process secondary cache and remote origin
//! - `mock/` - Call-counting, failure-injecting collaborators for tests

pub mod memory;
pub mod mock;
