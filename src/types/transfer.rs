//! Transfer objects returned by the metadata origin
//!
//! Every field except `id` defaults when absent. Ingestion does no schema
//! validation, so consumers see empty strings for missing scalar fields.

use serde::{Deserialize, Serialize};

use crate::ids::AssetId;
use crate::types::AssetMetadata;

/// Asset metadata with a nested tree of linked assets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
    pub id: AssetId,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub remote_locator: String,
    #[serde(default)]
    pub linked_assets: Vec<LinkedAssetDto>,
}

/// A typed link to a nested transfer object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAssetDto {
    #[serde(rename = "type")]
    pub link_type: String,
    pub asset: AssetDto,
}

/// An edge declared somewhere in a transfer object tree
#[derive(Debug, Clone, Copy)]
pub struct LinkEdge<'a> {
    /// The transfer object that declared the link
    pub parent: &'a AssetDto,
    pub link_type: &'a str,
    pub child: &'a AssetDto,
}

impl AssetDto {
    /// Create a transfer object with only an id
    pub fn new(id: impl Into<AssetId>) -> Self {
        Self {
            id: id.into(),
            owner: String::new(),
            name: String::new(),
            description: String::new(),
            archived: false,
            filename: String::new(),
            remote_locator: String::new(),
            linked_assets: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    pub fn with_remote_locator(mut self, locator: impl Into<String>) -> Self {
        self.remote_locator = locator.into();
        self
    }

    /// Nest a linked transfer object under this one
    pub fn with_link(mut self, link_type: impl Into<String>, asset: AssetDto) -> Self {
        self.linked_assets.push(LinkedAssetDto {
            link_type: link_type.into(),
            asset,
        });
        self
    }

    /// The scalar metadata fields of this transfer object
    pub fn metadata(&self) -> AssetMetadata {
        AssetMetadata {
            name: self.name.clone(),
            description: self.description.clone(),
            owner: self.owner.clone(),
            filename: self.filename.clone(),
            archived: self.archived,
        }
    }

    /// Every link in the tree, depth first, each paired with the transfer
    /// object that declared it
    pub fn flatten_links(&self) -> Vec<LinkEdge<'_>> {
        self.linked_assets
            .iter()
            .flat_map(|link| {
                let edge = LinkEdge {
                    parent: self,
                    link_type: &link.link_type,
                    child: &link.asset,
                };
                std::iter::once(edge).chain(link.asset.flatten_links())
            })
            .collect()
    }
}
