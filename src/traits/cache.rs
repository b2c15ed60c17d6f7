//! SecondaryCache trait for the persistent tier between memory and network

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::ids::AssetId;

/// Persistent, out-of-process cache consulted before the remote origin
///
/// Errors from either method are never fatal to a resolution: a failed `get`
/// is treated as a miss and a failed `put` is logged.
#[async_trait]
pub trait SecondaryCache: Send + Sync {
    /// Get cached bytes for an asset. `Ok(None)` means not found.
    async fn get(&self, id: &AssetId) -> Result<Option<Bytes>>;

    /// Store bytes for an asset
    async fn put(&self, id: &AssetId, bytes: Bytes, content_type: &str) -> Result<()>;
}
