//! Asset metadata types

use serde::{Deserialize, Serialize};

/// Scalar metadata of an asset as published by the metadata origin
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetMetadata {
    pub name: String,
    pub description: String,
    pub owner: String,
    /// Filename used when the content is materialized locally
    pub filename: String,
    pub archived: bool,
}

impl AssetMetadata {
    /// Create metadata with only a name set
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the filename
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = filename.into();
        self
    }

    /// Set the owner
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Mark as archived
    pub fn archived(mut self) -> Self {
        self.archived = true;
        self
    }
}

/// The last error observed while fetching an asset's content
///
/// Two failures are considered the same when their messages match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchFailure {
    pub message: String,
}

impl FetchFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Capture the full error chain of a collaborator error
    pub fn from_error(err: &anyhow::Error) -> Self {
        Self::new(format!("{:#}", err))
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
