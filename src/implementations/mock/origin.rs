//! Mock remote origin

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::ids::AssetId;
use crate::implementations::memory::MemoryOrigin;
use crate::traits::{ContentOrigin, MetadataOrigin};
use crate::types::{AssetDto, AssetSnapshot};

#[derive(Debug, Default)]
pub struct MockOrigin {
    inner: MemoryOrigin,
    metadata_calls: AtomicUsize,
    content_calls: AtomicUsize,
    metadata_failure: Mutex<Option<String>>,
    content_failure: Mutex<Option<String>>,
    yield_first: AtomicBool,
}

impl MockOrigin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_metadata(&self, dto: AssetDto) {
        self.inner.insert_metadata(dto);
    }

    pub fn insert_content(&self, locator: impl Into<String>, bytes: impl Into<Bytes>) {
        self.inner.insert_content(locator, bytes);
    }

    /// Serve an asset whose content lives at `mem://{id}`
    pub fn insert_asset(&self, dto: AssetDto, bytes: impl Into<Bytes>) {
        let locator = format!("mem://{}", dto.id);
        self.insert_metadata(dto.with_remote_locator(locator.clone()));
        self.insert_content(locator, bytes);
    }

    /// Make every metadata fetch fail with `message`
    pub fn fail_metadata(&self, message: impl Into<String>) {
        *self.metadata_failure.lock().unwrap() = Some(message.into());
    }

    /// Make every content fetch fail with `message`
    pub fn fail_content(&self, message: impl Into<String>) {
        *self.content_failure.lock().unwrap() = Some(message.into());
    }

    /// Stop failing content fetches
    pub fn recover_content(&self) {
        *self.content_failure.lock().unwrap() = None;
    }

    /// Yield to the scheduler before answering each call
    pub fn yield_before_reply(&self, enabled: bool) {
        self.yield_first.store(enabled, Ordering::SeqCst);
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn content_calls(&self) -> usize {
        self.content_calls.load(Ordering::SeqCst)
    }

    async fn maybe_yield(&self) {
        if self.yield_first.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl MetadataOrigin for MockOrigin {
    async fn fetch_metadata(&self, id: &AssetId) -> Result<AssetDto> {
        self.metadata_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_yield().await;
        let failure = self.metadata_failure.lock().unwrap().clone();
        if let Some(message) = failure {
            anyhow::bail!(message);
        }
        self.inner.fetch_metadata(id).await
    }
}

#[async_trait]
impl ContentOrigin for MockOrigin {
    async fn fetch_content(&self, asset: &AssetSnapshot) -> Result<Bytes> {
        self.content_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_yield().await;
        let failure = self.content_failure.lock().unwrap().clone();
        if let Some(message) = failure {
            anyhow::bail!(message);
        }
        self.inner.fetch_content(asset).await
    }
}
