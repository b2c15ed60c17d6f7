//! Local content handles
//!
//! A [`HandleRegistry`] is the process-local table of staged content. Each
//! entry is addressed by a URL of the form `{scheme}:{handle_id}` and lives
//! exactly as long as the [`LocalContentHandle`] that registered it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tracing::trace;

use crate::ids::HandleId;
use crate::types::{ContentRef, LocalContent};

pub const DEFAULT_HANDLE_SCHEME: &str = "blob:asset";

/// Table of live local content handles
#[derive(Debug)]
pub struct HandleRegistry {
    scheme: String,
    entries: Mutex<HashMap<HandleId, LocalContent>>,
    released: AtomicUsize,
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::with_scheme(DEFAULT_HANDLE_SCHEME)
    }
}

impl HandleRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Create a registry whose handle URLs start with `scheme`
    pub fn with_scheme(scheme: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            entries: Mutex::new(HashMap::new()),
            released: AtomicUsize::new(0),
        }
    }

    /// Stage content and return the owning handle
    pub fn register(self: &Arc<Self>, content: LocalContent) -> LocalContentHandle {
        let id = HandleId::new();
        let url = format!("{}:{}", self.scheme, id);
        self.entries
            .lock()
            .expect("handle registry lock poisoned")
            .insert(id.clone(), content.clone());
        trace!(%url, size = content.len(), "registered local handle");

        LocalContentHandle {
            id,
            url,
            content,
            registry: Arc::clone(self),
        }
    }

    /// Look up live content by handle URL
    pub fn lookup(&self, url: &str) -> Option<LocalContent> {
        let id = url
            .strip_prefix(self.scheme.as_str())
            .and_then(|rest| rest.strip_prefix(':'))?;
        self.entries
            .lock()
            .expect("handle registry lock poisoned")
            .get(&HandleId::from_string(id))
            .cloned()
    }

    /// Number of handles currently alive
    pub fn live_count(&self) -> usize {
        self.entries.lock().expect("handle registry lock poisoned").len()
    }

    /// Number of handles released since the registry was created
    pub fn release_count(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    fn revoke(&self, id: &HandleId) {
        let removed = self
            .entries
            .lock()
            .expect("handle registry lock poisoned")
            .remove(id);
        if removed.is_some() {
            self.released.fetch_add(1, Ordering::SeqCst);
            trace!(handle_id = %id, "released local handle");
        }
    }
}

/// Exclusive owner of one staged piece of local content
///
/// Dropping the handle revokes its registry entry.
#[derive(Debug)]
pub struct LocalContentHandle {
    id: HandleId,
    url: String,
    content: LocalContent,
    registry: Arc<HandleRegistry>,
}

impl LocalContentHandle {
    pub fn id(&self) -> &HandleId {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn content(&self) -> &LocalContent {
        &self.content
    }

    /// Derive a fresh caller-facing reference
    pub fn content_ref(&self) -> ContentRef {
        ContentRef {
            url: self.url.clone(),
            content: self.content.clone(),
        }
    }
}

impl Drop for LocalContentHandle {
    fn drop(&mut self) {
        self.registry.revoke(&self.id);
    }
}
