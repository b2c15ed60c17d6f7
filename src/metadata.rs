//! Metadata resolution: catalog first, remote origin once per miss

use std::sync::Arc;

use tracing::{debug, error};

use crate::catalog::AssetCatalog;
use crate::error::{ResolveError, Result};
use crate::ids::AssetId;
use crate::traits::MetadataOrigin;
use crate::types::AssetSnapshot;

/// Ensures an asset record with metadata exists in the catalog
pub struct MetadataResolver {
    catalog: Arc<AssetCatalog>,
    origin: Arc<dyn MetadataOrigin>,
}

impl MetadataResolver {
    pub fn new(catalog: Arc<AssetCatalog>, origin: Arc<dyn MetadataOrigin>) -> Self {
        Self { catalog, origin }
    }

    pub fn catalog(&self) -> &Arc<AssetCatalog> {
        &self.catalog
    }

    /// Resolve the record for `id`.
    ///
    /// Returns immediately when the catalog already knows the id. Otherwise
    /// the origin is asked once and its response is ingested; a failed fetch
    /// creates no record.
    pub async fn resolve(&self, id: &AssetId) -> Result<AssetSnapshot> {
        if let Some(snapshot) = self.catalog.get(id) {
            return Ok(snapshot);
        }

        debug!(asset_id = %id, "fetching remote metadata");
        match self.origin.fetch_metadata(id).await {
            Ok(dto) => Ok(self.catalog.ingest(&dto)),
            Err(source) => {
                error!(asset_id = %id, error = %format!("{:#}", source), "metadata fetch failed");
                Err(ResolveError::MetadataFetch {
                    id: id.clone(),
                    source,
                })
            }
        }
    }
}
