//! Asset catalog: the keyed owner of every asset record
//!
//! Records never leave the catalog. Callers read them through snapshots or
//! short closures ([`AssetCatalog::read`], [`AssetCatalog::update`]) that run
//! while the catalog lock is held; no lock is ever held across an await.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::handle::HandleRegistry;
use crate::ids::AssetId;
use crate::record::{AssetRecord, RecordEvent};
use crate::types::{AssetDto, AssetSnapshot, ContentRef};

/// Creates empty records for ids the catalog has not seen yet
pub trait RecordFactory: Send + Sync {
    fn create(&self, id: AssetId) -> AssetRecord;
}

impl<F> RecordFactory for F
where
    F: Fn(AssetId) -> AssetRecord + Send + Sync,
{
    fn create(&self, id: AssetId) -> AssetRecord {
        self(id)
    }
}

/// Factory creating plain records backed by a shared handle registry
#[derive(Debug, Clone, Default)]
pub struct DefaultRecordFactory {
    registry: Arc<HandleRegistry>,
}

impl DefaultRecordFactory {
    pub fn new(registry: Arc<HandleRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<HandleRegistry> {
        &self.registry
    }
}

impl RecordFactory for DefaultRecordFactory {
    fn create(&self, id: AssetId) -> AssetRecord {
        AssetRecord::new(id, Arc::clone(&self.registry))
    }
}

/// Membership change notification emitted by the catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEvent {
    Added(AssetId),
    Removed(AssetId),
}

pub struct AssetCatalog {
    records: Mutex<HashMap<AssetId, AssetRecord>>,
    factory: Option<Arc<dyn RecordFactory>>,
    fallback: DefaultRecordFactory,
    observers: Mutex<Vec<mpsc::UnboundedSender<CatalogEvent>>>,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssetCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCatalog")
            .field("len", &self.len())
            .field("has_factory", &self.factory.is_some())
            .finish()
    }
}

impl AssetCatalog {
    /// Create a catalog without an injected factory. Records are created by
    /// a fallback [`DefaultRecordFactory`].
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
            factory: None,
            fallback: DefaultRecordFactory::default(),
            observers: Mutex::new(Vec::new()),
        }
    }

    /// Create a catalog that builds records with `factory`
    pub fn with_factory(factory: Arc<dyn RecordFactory>) -> Self {
        Self {
            factory: Some(factory),
            ..Self::new()
        }
    }

    fn records(&self) -> MutexGuard<'_, HashMap<AssetId, AssetRecord>> {
        self.records.lock().expect("catalog lock poisoned")
    }

    /// Register an observer for membership changes.
    ///
    /// The channel is unbounded and a sender is only pruned once its receiver
    /// is dropped. A subscriber that never drains keeps every event queued.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<CatalogEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.observers
            .lock()
            .expect("catalog observers lock poisoned")
            .push(tx);
        rx
    }

    /// Register an observer on a record owned by this catalog
    pub fn subscribe_record(&self, id: &AssetId) -> Option<mpsc::UnboundedReceiver<RecordEvent>> {
        self.update(id, AssetRecord::subscribe)
    }

    fn notify(&self, event: CatalogEvent) {
        self.observers
            .lock()
            .expect("catalog observers lock poisoned")
            .retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn has(&self, id: &AssetId) -> bool {
        self.records().contains_key(id)
    }

    pub fn get(&self, id: &AssetId) -> Option<AssetSnapshot> {
        self.read(id, AssetRecord::snapshot)
    }

    /// Run `f` against a record while the catalog lock is held
    pub fn read<R>(&self, id: &AssetId, f: impl FnOnce(&AssetRecord) -> R) -> Option<R> {
        self.records().get(id).map(f)
    }

    /// Mutate a record while the catalog lock is held
    pub fn update<R>(&self, id: &AssetId, f: impl FnOnce(&mut AssetRecord) -> R) -> Option<R> {
        self.records().get_mut(id).map(f)
    }

    /// Derive a content reference from the record's local handle
    pub fn content_ref(&self, id: &AssetId) -> Option<ContentRef> {
        self.read(id, AssetRecord::content_ref).flatten()
    }

    pub fn linked_assets_by_type(&self, id: &AssetId, link_type: &str) -> Vec<AssetId> {
        self.read(id, |record| record.linked_assets_by_type(link_type))
            .unwrap_or_default()
    }

    /// Build a record for `id`. Called without the catalog lock held, so
    /// factories may read the catalog.
    fn create_record(&self, id: &AssetId) -> AssetRecord {
        let Some(factory) = &self.factory else {
            warn!(asset_id = %id, "no record factory configured, using default factory");
            return self.fallback.create(id.clone());
        };

        let record = factory.create(id.clone());
        if record.id() != id {
            warn!(
                asset_id = %id,
                record_id = %record.id(),
                "record factory returned a record for another id, using default factory"
            );
            return self.fallback.create(id.clone());
        }
        record
    }

    /// Return the existing record for `id`, creating and adding one if absent.
    /// Observers are notified only for a genuinely new insertion.
    pub fn get_or_create(&self, id: &AssetId) -> AssetSnapshot {
        if let Some(snapshot) = self.get(id) {
            return snapshot;
        }

        let record = self.create_record(id);
        let (snapshot, surplus) = {
            let mut records = self.records();
            match records.entry(id.clone()) {
                Entry::Occupied(existing) => (existing.get().snapshot(), Some(record)),
                Entry::Vacant(slot) => (slot.insert(record).snapshot(), None),
            }
        };

        match surplus {
            // another caller inserted first
            Some(duplicate) => drop(duplicate),
            None => {
                debug!(asset_id = %id, "created asset record");
                self.notify(CatalogEvent::Added(id.clone()));
            }
        }
        snapshot
    }

    /// Add a record. A record whose id is already present is dropped and
    /// nothing is notified. Returns true if the record was inserted.
    pub fn add(&self, record: AssetRecord) -> bool {
        let id = record.id().clone();
        let rejected = {
            let mut records = self.records();
            if records.contains_key(&id) {
                Some(record)
            } else {
                records.insert(id.clone(), record);
                None
            }
        };

        match rejected {
            Some(duplicate) => {
                drop(duplicate);
                false
            }
            None => {
                self.notify(CatalogEvent::Added(id));
                true
            }
        }
    }

    /// Remove and dispose a record. Returns false if it was absent.
    pub fn remove(&self, id: &AssetId) -> bool {
        let removed = self.records().remove(id);
        match removed {
            Some(mut record) => {
                record.dispose();
                debug!(asset_id = %id, "removed asset record");
                self.notify(CatalogEvent::Removed(id.clone()));
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// All asset ids, sorted
    pub fn ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = self.records().keys().cloned().collect();
        ids.sort();
        ids
    }

    fn apply_scalars(&self, dto: &AssetDto) {
        self.get_or_create(&dto.id);
        self.update(&dto.id, |record| {
            record.set_metadata(dto.metadata());
            record.set_remote_locator(dto.remote_locator.as_str());
        });
    }

    /// Ingest a transfer object tree.
    ///
    /// Creates or updates one record per distinct id anywhere in the tree and
    /// attaches each `(link_type, id)` edge to the record of the transfer
    /// object that declared it. Returns the root record.
    pub fn ingest(&self, root: &AssetDto) -> AssetSnapshot {
        self.apply_scalars(root);

        let edges = root.flatten_links();
        for edge in &edges {
            self.apply_scalars(edge.child);
        }
        for edge in &edges {
            self.update(&edge.parent.id, |record| {
                record.add_linked_asset(edge.link_type, &edge.child.id);
            });
        }

        debug!(asset_id = %root.id, linked = edges.len(), "ingested transfer object");
        self.get_or_create(&root.id)
    }
}
