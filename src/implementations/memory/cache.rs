//! In-memory SecondaryCache implementation

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::ids::AssetId;
use crate::traits::SecondaryCache;

#[derive(Debug, Clone)]
struct CacheEntry {
    bytes: Bytes,
    content_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<AssetId, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry without going through the async trait
    pub fn insert(&self, id: impl Into<AssetId>, bytes: impl Into<Bytes>, content_type: &str) {
        self.entries.lock().unwrap().insert(
            id.into(),
            CacheEntry {
                bytes: bytes.into(),
                content_type: content_type.to_string(),
            },
        );
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.entries.lock().unwrap().contains_key(id)
    }

    pub fn content_type(&self, id: &AssetId) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(id)
            .map(|entry| entry.content_type.clone())
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }
}

#[async_trait]
impl SecondaryCache for MemoryCache {
    async fn get(&self, id: &AssetId) -> Result<Option<Bytes>> {
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(id).map(|entry| entry.bytes.clone()))
    }

    async fn put(&self, id: &AssetId, bytes: Bytes, content_type: &str) -> Result<()> {
        self.insert(id.clone(), bytes, content_type);
        Ok(())
    }
}
