//! Asset records: one asset's metadata, links and local-content lifecycle
//!
//! A record is a pure state container. Setters only notify observers when
//! the stored value actually changes, and the local content handle is owned
//! exclusively by the record and released when it is replaced, cleared or
//! the record is disposed.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::handle::{HandleRegistry, LocalContentHandle};
use crate::ids::AssetId;
use crate::types::{
    AssetMetadata, AssetSnapshot, ContentRef, FetchFailure, LinkedAssets, LocalContent,
};

/// The record field that changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    Name,
    Description,
    Owner,
    Filename,
    Archived,
    RemoteLocator,
    LinkedAssets,
    LocalContent,
    FetchingContent,
    FetchError,
}

/// Change notification emitted by an [`AssetRecord`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEvent {
    pub id: AssetId,
    pub field: RecordField,
}

#[derive(Debug)]
pub struct AssetRecord {
    id: AssetId,
    metadata: AssetMetadata,
    remote_locator: String,
    linked_assets: LinkedAssets,
    local_handle: Option<LocalContentHandle>,
    is_fetching_content: bool,
    last_fetch_error: Option<FetchFailure>,
    registry: Arc<HandleRegistry>,
    observers: Vec<mpsc::UnboundedSender<RecordEvent>>,
    disposed: bool,
}

impl AssetRecord {
    /// Create an empty record whose local handles are staged in `registry`
    pub fn new(id: impl Into<AssetId>, registry: Arc<HandleRegistry>) -> Self {
        Self {
            id: id.into(),
            metadata: AssetMetadata::default(),
            remote_locator: String::new(),
            linked_assets: LinkedAssets::new(),
            local_handle: None,
            is_fetching_content: false,
            last_fetch_error: None,
            registry,
            observers: Vec::new(),
            disposed: false,
        }
    }

    pub fn id(&self) -> &AssetId {
        &self.id
    }

    pub fn metadata(&self) -> &AssetMetadata {
        &self.metadata
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn description(&self) -> &str {
        &self.metadata.description
    }

    pub fn owner(&self) -> &str {
        &self.metadata.owner
    }

    pub fn filename(&self) -> &str {
        &self.metadata.filename
    }

    pub fn archived(&self) -> bool {
        self.metadata.archived
    }

    pub fn remote_locator(&self) -> &str {
        &self.remote_locator
    }

    pub fn linked_assets(&self) -> &LinkedAssets {
        &self.linked_assets
    }

    pub fn has_local_content(&self) -> bool {
        self.local_handle.is_some()
    }

    pub fn local_handle(&self) -> Option<&LocalContentHandle> {
        self.local_handle.as_ref()
    }

    pub fn is_fetching_content(&self) -> bool {
        self.is_fetching_content
    }

    pub fn last_fetch_error(&self) -> Option<&FetchFailure> {
        self.last_fetch_error.as_ref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Register an observer for change notifications.
    ///
    /// Events queue without bound until received; drop the receiver to
    /// unsubscribe.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<RecordEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers.push(tx);
        rx
    }

    fn notify(&mut self, field: RecordField) {
        let event = RecordEvent {
            id: self.id.clone(),
            field,
        };
        self.observers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn set_remote_locator(&mut self, locator: impl Into<String>) -> bool {
        let locator = locator.into();
        if self.remote_locator == locator {
            return false;
        }
        self.remote_locator = locator;
        self.notify(RecordField::RemoteLocator);
        true
    }

    /// Apply scalar metadata, notifying once per field that changed.
    /// Returns true if anything changed.
    pub fn set_metadata(&mut self, metadata: AssetMetadata) -> bool {
        let AssetMetadata {
            name,
            description,
            owner,
            filename,
            archived,
        } = metadata;

        let mut changed = Vec::new();
        if self.metadata.name != name {
            self.metadata.name = name;
            changed.push(RecordField::Name);
        }
        if self.metadata.description != description {
            self.metadata.description = description;
            changed.push(RecordField::Description);
        }
        if self.metadata.owner != owner {
            self.metadata.owner = owner;
            changed.push(RecordField::Owner);
        }
        if self.metadata.filename != filename {
            self.metadata.filename = filename;
            changed.push(RecordField::Filename);
        }
        if self.metadata.archived != archived {
            self.metadata.archived = archived;
            changed.push(RecordField::Archived);
        }

        let any = !changed.is_empty();
        for field in changed {
            self.notify(field);
        }
        any
    }

    /// Link another asset. A given id is only linked once, by its first type.
    pub fn add_linked_asset(&mut self, link_type: &str, asset_id: &AssetId) -> bool {
        let added = self.linked_assets.add(link_type, asset_id);
        if added {
            self.notify(RecordField::LinkedAssets);
        }
        added
    }

    pub fn remove_linked_asset(&mut self, link_type: &str, asset_id: &AssetId) -> bool {
        let removed = self.linked_assets.remove(link_type, asset_id);
        if removed {
            self.notify(RecordField::LinkedAssets);
        }
        removed
    }

    pub fn linked_assets_by_type(&self, link_type: &str) -> Vec<AssetId> {
        self.linked_assets.by_type(link_type)
    }

    /// Stage content locally, releasing any previously owned handle first
    pub fn set_local_content(&mut self, content: LocalContent) -> ContentRef {
        if let Some(previous) = self.local_handle.take() {
            debug!(asset_id = %self.id, url = previous.url(), "replacing local handle");
            drop(previous);
        }
        let handle = self.registry.register(content);
        let content_ref = handle.content_ref();
        self.local_handle = Some(handle);
        self.notify(RecordField::LocalContent);
        content_ref
    }

    /// Release the local handle, if any. Returns true if one was released.
    pub fn clear_local_content(&mut self) -> bool {
        match self.local_handle.take() {
            Some(handle) => {
                drop(handle);
                self.notify(RecordField::LocalContent);
                true
            }
            None => false,
        }
    }

    /// Derive a fresh content reference from the owned handle
    pub fn content_ref(&self) -> Option<ContentRef> {
        self.local_handle.as_ref().map(LocalContentHandle::content_ref)
    }

    pub fn set_fetching_content(&mut self, fetching: bool) -> bool {
        if self.is_fetching_content == fetching {
            return false;
        }
        self.is_fetching_content = fetching;
        self.notify(RecordField::FetchingContent);
        true
    }

    /// Set or clear the last fetch error. Setting an error with the same
    /// message as the current one is a no-op.
    pub fn set_fetch_error(&mut self, error: Option<FetchFailure>) -> bool {
        if self.last_fetch_error == error {
            return false;
        }
        self.last_fetch_error = error;
        self.notify(RecordField::FetchError);
        true
    }

    /// Enter the fetching state, clearing the previous error
    pub fn begin_fetch(&mut self) {
        self.set_fetching_content(true);
        self.set_fetch_error(None);
    }

    /// Leave the fetching state with content in hand
    pub fn complete_fetch(&mut self, content: LocalContent) -> ContentRef {
        let content_ref = self.set_local_content(content);
        self.set_fetching_content(false);
        content_ref
    }

    /// Leave the fetching state with an error recorded
    pub fn fail_fetch(&mut self, failure: FetchFailure) {
        self.set_fetch_error(Some(failure));
        self.set_fetching_content(false);
    }

    pub fn snapshot(&self) -> AssetSnapshot {
        AssetSnapshot {
            id: self.id.clone(),
            metadata: self.metadata.clone(),
            remote_locator: self.remote_locator.clone(),
            linked_assets: self.linked_assets.clone(),
            has_local_content: self.has_local_content(),
            local_url: self.local_handle.as_ref().map(|h| h.url().to_string()),
            is_fetching_content: self.is_fetching_content,
            last_fetch_error: self.last_fetch_error.clone(),
        }
    }

    /// Release the owned local handle and detach observers.
    /// Safe to call repeatedly and when no handle exists.
    pub fn dispose(&mut self) {
        if let Some(handle) = self.local_handle.take() {
            debug!(asset_id = %self.id, url = handle.url(), "disposing local handle");
            drop(handle);
        }
        self.observers.clear();
        self.disposed = true;
    }
}

impl Drop for AssetRecord {
    fn drop(&mut self) {
        self.dispose();
    }
}
