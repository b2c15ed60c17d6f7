//! Collaborator trait definitions
//!
//! Implementations live in `implementations/`.

mod cache;
mod origin;

pub use cache::SecondaryCache;
pub use origin::{ContentOrigin, MetadataOrigin};
