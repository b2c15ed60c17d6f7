//! Typed, id-only edges between assets

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;

/// A single `(link_type, asset_id)` edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAsset {
    pub link_type: String,
    pub asset_id: AssetId,
}

/// Ordered set of linked assets, keyed by asset id
///
/// An asset id can only be linked once; the first link type wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkedAssets(Vec<LinkedAsset>);

impl LinkedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an edge. Returns false if the asset id is already linked.
    pub fn add(&mut self, link_type: &str, asset_id: &AssetId) -> bool {
        if self.contains(asset_id) {
            return false;
        }
        self.0.push(LinkedAsset {
            link_type: link_type.to_string(),
            asset_id: asset_id.clone(),
        });
        true
    }

    /// Remove the edge matching both type and id exactly
    pub fn remove(&mut self, link_type: &str, asset_id: &AssetId) -> bool {
        let before = self.0.len();
        self.0
            .retain(|link| !(link.link_type == link_type && &link.asset_id == asset_id));
        self.0.len() != before
    }

    pub fn contains(&self, asset_id: &AssetId) -> bool {
        self.0.iter().any(|link| &link.asset_id == asset_id)
    }

    /// All asset ids linked with the given type, in insertion order
    pub fn by_type(&self, link_type: &str) -> Vec<AssetId> {
        self.0
            .iter()
            .filter(|link| link.link_type == link_type)
            .map(|link| link.asset_id.clone())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LinkedAsset> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
