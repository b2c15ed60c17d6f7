//! Cloneable views of asset records

use serde::Serialize;

use crate::ids::AssetId;
use crate::types::{AssetMetadata, FetchFailure, LinkedAssets};

/// Point-in-time copy of an asset record's observable state
///
/// Records are owned by the catalog; snapshots are what callers hold on to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AssetSnapshot {
    pub id: AssetId,
    pub metadata: AssetMetadata,
    pub remote_locator: String,
    pub linked_assets: LinkedAssets,
    pub has_local_content: bool,
    /// URL of the live local handle, if any
    pub local_url: Option<String>,
    pub is_fetching_content: bool,
    pub last_fetch_error: Option<FetchFailure>,
}

impl AssetSnapshot {
    /// Filename to stage content under, falling back to the asset id
    pub fn effective_filename(&self) -> String {
        if self.metadata.filename.is_empty() {
            self.id.to_string()
        } else {
            self.metadata.filename.clone()
        }
    }

    pub fn linked_assets_by_type(&self, link_type: &str) -> Vec<AssetId> {
        self.linked_assets.by_type(link_type)
    }
}
