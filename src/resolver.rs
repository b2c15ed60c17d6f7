//! Content resolution: local handle, then secondary cache, then remote origin
//!
//! Each call to [`ContentResolver::resolve_content_with`] walks the stages
//! `CHECK_LOCAL -> CHECK_CACHE -> FETCH_REMOTE -> DONE` (or `ERROR`). The
//! awaits on the cache, the metadata origin and the content origin are the
//! only suspension points; record mutations between them are synchronous.
//!
//! Concurrent calls for the same id are not coalesced. Each one walks the
//! stages on its own and may hit the network again.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use futures::future::join_all;
use tracing::{debug, error, warn};

use crate::catalog::AssetCatalog;
use crate::config::ResolverConfig;
use crate::error::{ResolveError, Result};
use crate::ids::AssetId;
use crate::metadata::MetadataResolver;
use crate::record::AssetRecord;
use crate::traits::{ContentOrigin, SecondaryCache};
use crate::types::{AssetSnapshot, ContentRef, FetchFailure, LocalContent};

/// Stage of a single resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveStage {
    CheckLocal,
    CheckCache,
    FetchRemote,
    Done,
    Error,
}

impl fmt::Display for ResolveStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolveStage::CheckLocal => "CHECK_LOCAL",
            ResolveStage::CheckCache => "CHECK_CACHE",
            ResolveStage::FetchRemote => "FETCH_REMOTE",
            ResolveStage::Done => "DONE",
            ResolveStage::Error => "ERROR",
        };
        f.write_str(name)
    }
}

/// Per-id outcome of a batch resolution
pub type BatchResult = Vec<(AssetId, Result<ContentRef>)>;

/// Wires the collaborators of a [`ContentResolver`]. Any of them may be left
/// out; resolution then fails with [`ResolveError::MissingDependency`].
#[derive(Default)]
pub struct ContentResolverBuilder {
    catalog: Option<Arc<AssetCatalog>>,
    metadata: Option<Arc<MetadataResolver>>,
    origin: Option<Arc<dyn ContentOrigin>>,
    cache: Option<Arc<dyn SecondaryCache>>,
    config: ResolverConfig,
}

impl ContentResolverBuilder {
    pub fn catalog(mut self, catalog: Arc<AssetCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn metadata_resolver(mut self, metadata: Arc<MetadataResolver>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn content_origin(mut self, origin: Arc<dyn ContentOrigin>) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn cache(mut self, cache: Arc<dyn SecondaryCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(mut self, config: ResolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> ContentResolver {
        ContentResolver {
            catalog: self.catalog,
            metadata: self.metadata,
            origin: self.origin,
            cache: self.cache,
            use_cache_by_default: self.config.use_cache,
            fallback_content_type: self.config.fallback_content_type,
        }
    }
}

pub struct ContentResolver {
    catalog: Option<Arc<AssetCatalog>>,
    metadata: Option<Arc<MetadataResolver>>,
    origin: Option<Arc<dyn ContentOrigin>>,
    cache: Option<Arc<dyn SecondaryCache>>,
    use_cache_by_default: bool,
    fallback_content_type: String,
}

impl ContentResolver {
    pub fn builder() -> ContentResolverBuilder {
        ContentResolverBuilder::default()
    }

    pub fn catalog(&self) -> Option<&Arc<AssetCatalog>> {
        self.catalog.as_ref()
    }

    fn dependencies(&self) -> Result<(&AssetCatalog, &MetadataResolver, &dyn ContentOrigin)> {
        let catalog = self
            .catalog
            .as_deref()
            .ok_or(ResolveError::MissingDependency("asset catalog"))?;
        let metadata = self
            .metadata
            .as_deref()
            .ok_or(ResolveError::MissingDependency("metadata resolver"))?;
        let origin = self
            .origin
            .as_deref()
            .ok_or(ResolveError::MissingDependency("content origin"))?;
        Ok((catalog, metadata, origin))
    }

    /// Resolve content using the configured cache default
    pub async fn resolve_content(&self, id: &AssetId) -> Result<ContentRef> {
        self.resolve_content_with(id, self.use_cache_by_default).await
    }

    /// Resolve an asset to a local content reference.
    ///
    /// With `use_cache == false` the secondary cache is never read, even if
    /// it holds the asset. A successful remote fetch is written through to
    /// the cache either way.
    pub async fn resolve_content_with(&self, id: &AssetId, use_cache: bool) -> Result<ContentRef> {
        let (catalog, metadata, origin) = self.dependencies()?;

        debug!(asset_id = %id, stage = %ResolveStage::CheckLocal);
        if let Some(content_ref) = catalog.content_ref(id) {
            debug!(asset_id = %id, stage = %ResolveStage::Done, "served from local handle");
            return Ok(content_ref);
        }

        if use_cache {
            if let Some(cache) = self.cache.as_deref() {
                debug!(asset_id = %id, stage = %ResolveStage::CheckCache);
                if let Some(bytes) = Self::check_cache(cache, id).await {
                    let snapshot = metadata.resolve(id).await?;
                    let content = self.wrap(&snapshot, bytes);
                    let content_ref = catalog
                        .update(id, |record| record.set_local_content(content))
                        .ok_or_else(|| ResolveError::RecordEvicted(id.clone()))?;
                    debug!(asset_id = %id, stage = %ResolveStage::Done, "served from secondary cache");
                    return Ok(content_ref);
                }
            }
        }

        debug!(asset_id = %id, stage = %ResolveStage::FetchRemote);
        metadata.resolve(id).await?;
        let snapshot = catalog
            .update(id, |record| {
                record.begin_fetch();
                record.snapshot()
            })
            .ok_or_else(|| ResolveError::RecordEvicted(id.clone()))?;

        let bytes = match origin.fetch_content(&snapshot).await {
            Ok(bytes) => bytes,
            Err(source) => {
                let failure = FetchFailure::from_error(&source);
                error!(asset_id = %id, stage = %ResolveStage::Error, error = %failure, "content fetch failed");
                catalog.update(id, |record| record.fail_fetch(failure));
                return Err(ResolveError::ContentFetch {
                    id: id.clone(),
                    source,
                });
            }
        };

        let content = self.wrap(&snapshot, bytes.clone());
        let content_type = content.content_type.clone();
        let content_ref = catalog
            .update(id, |record| record.complete_fetch(content))
            .ok_or_else(|| ResolveError::RecordEvicted(id.clone()))?;

        if let Some(cache) = self.cache.as_deref() {
            if let Err(source) = cache.put(id, bytes, &content_type).await {
                let err = ResolveError::Cache {
                    id: id.clone(),
                    source,
                };
                warn!(asset_id = %id, error = %err, "cache write-through failed");
            }
        }

        debug!(asset_id = %id, stage = %ResolveStage::Done, size = content_ref.bytes().len(), "fetched from remote origin");
        Ok(content_ref)
    }

    /// Query the secondary cache, treating errors as misses
    async fn check_cache(cache: &dyn SecondaryCache, id: &AssetId) -> Option<Bytes> {
        match cache.get(id).await {
            Ok(Some(bytes)) => Some(bytes),
            Ok(None) => {
                debug!(asset_id = %id, "secondary cache miss");
                None
            }
            Err(source) => {
                let err = ResolveError::Cache {
                    id: id.clone(),
                    source,
                };
                warn!(asset_id = %id, error = %err, "secondary cache lookup failed, falling back to remote");
                None
            }
        }
    }

    fn wrap(&self, snapshot: &AssetSnapshot, bytes: Bytes) -> LocalContent {
        let filename = snapshot.effective_filename();
        LocalContent::from_filename(bytes, &filename, &self.fallback_content_type)
    }

    /// Resolve several assets concurrently. Each id succeeds or fails on its
    /// own; results keep the order of `ids`.
    pub async fn resolve_many(&self, ids: &[AssetId], use_cache: bool) -> BatchResult {
        join_all(ids.iter().map(|id| async move {
            let result = self.resolve_content_with(id, use_cache).await;
            (id.clone(), result)
        }))
        .await
    }

    /// Resolve every asset linked to `id` with `link_type`
    pub async fn resolve_linked(
        &self,
        id: &AssetId,
        link_type: &str,
        use_cache: bool,
    ) -> Result<BatchResult> {
        let (_, metadata, _) = self.dependencies()?;
        let parent = metadata.resolve(id).await?;
        let linked = parent.linked_assets_by_type(link_type);
        debug!(asset_id = %id, link_type, count = linked.len(), "resolving linked assets");
        Ok(self.resolve_many(&linked, use_cache).await)
    }

    /// Release an asset's local handle without removing its record.
    /// Returns true if a handle was released.
    pub fn release_content(&self, id: &AssetId) -> Result<bool> {
        let catalog = self
            .catalog
            .as_deref()
            .ok_or(ResolveError::MissingDependency("asset catalog"))?;
        Ok(catalog
            .update(id, AssetRecord::clear_local_content)
            .unwrap_or(false))
    }
}
