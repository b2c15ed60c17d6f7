//! Mock secondary cache

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use crate::ids::AssetId;
use crate::implementations::memory::MemoryCache;
use crate::traits::SecondaryCache;

/// Arguments of one `put` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedPut {
    pub id: AssetId,
    pub bytes: Bytes,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MockCache {
    inner: MemoryCache,
    get_calls: AtomicUsize,
    puts: Mutex<Vec<RecordedPut>>,
    get_failure: Mutex<Option<String>>,
    put_failure: Mutex<Option<String>>,
    yield_first: AtomicBool,
}

impl MockCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an entry
    pub fn insert(&self, id: impl Into<AssetId>, bytes: impl Into<Bytes>, content_type: &str) {
        self.inner.insert(id, bytes, content_type);
    }

    /// Make every `get` fail with `message`
    pub fn fail_get(&self, message: impl Into<String>) {
        *self.get_failure.lock().unwrap() = Some(message.into());
    }

    /// Make every `put` fail with `message`
    pub fn fail_put(&self, message: impl Into<String>) {
        *self.put_failure.lock().unwrap() = Some(message.into());
    }

    /// Yield to the scheduler before answering each call
    pub fn yield_before_reply(&self, enabled: bool) {
        self.yield_first.store(enabled, Ordering::SeqCst);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn put_calls(&self) -> usize {
        self.puts.lock().unwrap().len()
    }

    pub fn puts(&self) -> Vec<RecordedPut> {
        self.puts.lock().unwrap().clone()
    }

    pub fn contains(&self, id: &AssetId) -> bool {
        self.inner.contains(id)
    }

    async fn maybe_yield(&self) {
        if self.yield_first.load(Ordering::SeqCst) {
            tokio::task::yield_now().await;
        }
    }
}

#[async_trait]
impl SecondaryCache for MockCache {
    async fn get(&self, id: &AssetId) -> Result<Option<Bytes>> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.maybe_yield().await;
        let failure = self.get_failure.lock().unwrap().clone();
        if let Some(message) = failure {
            anyhow::bail!(message);
        }
        self.inner.get(id).await
    }

    async fn put(&self, id: &AssetId, bytes: Bytes, content_type: &str) -> Result<()> {
        self.puts.lock().unwrap().push(RecordedPut {
            id: id.clone(),
            bytes: bytes.clone(),
            content_type: content_type.to_string(),
        });
        self.maybe_yield().await;
        let failure = self.put_failure.lock().unwrap().clone();
        if let Some(message) = failure {
            anyhow::bail!(message);
        }
        self.inner.put(id, bytes, content_type).await
    }
}
