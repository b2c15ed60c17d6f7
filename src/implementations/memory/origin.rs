//! In-memory remote origin serving transfer objects and bytes

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ids::AssetId;
use crate::traits::{ContentOrigin, MetadataOrigin};
use crate::types::{AssetDto, AssetSnapshot};

/// Origin backed by maps: transfer objects by id, bytes by remote locator
#[derive(Debug, Default)]
pub struct MemoryOrigin {
    metadata: Mutex<HashMap<AssetId, AssetDto>>,
    content: Mutex<HashMap<String, Bytes>>,
}

impl MemoryOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load transfer objects from a JSON array
    pub fn from_json(json: &str) -> Result<Self> {
        let dtos: Vec<AssetDto> =
            serde_json::from_str(json).context("failed to parse transfer objects")?;
        let origin = Self::new();
        for dto in dtos {
            origin.insert_metadata(dto);
        }
        Ok(origin)
    }

    /// Serve a transfer object. Nested transfer objects become fetchable by
    /// their own id as well.
    pub fn insert_metadata(&self, dto: AssetDto) {
        let mut metadata = self.metadata.lock().unwrap();
        for edge in dto.flatten_links() {
            metadata
                .entry(edge.child.id.clone())
                .or_insert_with(|| edge.child.clone());
        }
        metadata.insert(dto.id.clone(), dto);
    }

    /// Serve bytes under a remote locator
    pub fn insert_content(&self, locator: impl Into<String>, bytes: impl Into<Bytes>) {
        self.content
            .lock()
            .unwrap()
            .insert(locator.into(), bytes.into());
    }

    pub fn has_metadata(&self, id: &AssetId) -> bool {
        self.metadata.lock().unwrap().contains_key(id)
    }
}

#[async_trait]
impl MetadataOrigin for MemoryOrigin {
    async fn fetch_metadata(&self, id: &AssetId) -> Result<AssetDto> {
        self.metadata
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("asset not found: {}", id))
    }
}

#[async_trait]
impl ContentOrigin for MemoryOrigin {
    async fn fetch_content(&self, asset: &AssetSnapshot) -> Result<Bytes> {
        if asset.remote_locator.is_empty() {
            anyhow::bail!("asset {} has no remote locator", asset.id);
        }
        self.content
            .lock()
            .unwrap()
            .get(&asset.remote_locator)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no content at {}", asset.remote_locator))
    }
}
