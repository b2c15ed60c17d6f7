//! Remote origin traits

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::ids::AssetId;
use crate::types::{AssetDto, AssetSnapshot};

/// Authoritative source of asset metadata
#[async_trait]
pub trait MetadataOrigin: Send + Sync {
    /// Fetch the transfer object for an asset, including its linked asset tree
    async fn fetch_metadata(&self, id: &AssetId) -> Result<AssetDto>;
}

/// Authoritative source of asset bytes
#[async_trait]
pub trait ContentOrigin: Send + Sync {
    /// Fetch the raw bytes addressed by the asset's remote locator
    async fn fetch_content(&self, asset: &AssetSnapshot) -> Result<Bytes>;
}
