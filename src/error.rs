//! Errors returned by the resolvers

use crate::ids::AssetId;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A required collaborator was not configured
    #[error("missing dependency: {0}")]
    MissingDependency(&'static str),

    /// The metadata origin failed
    #[error("failed to fetch metadata for asset {id}: {source:#}")]
    MetadataFetch {
        id: AssetId,
        #[source]
        source: anyhow::Error,
    },

    /// The content origin failed. The message is also recorded on the asset.
    #[error("failed to fetch content for asset {id}: {source:#}")]
    ContentFetch {
        id: AssetId,
        #[source]
        source: anyhow::Error,
    },

    /// The secondary cache failed. Recovered by the content resolver and
    /// only ever logged.
    #[error("secondary cache failed for asset {id}: {source:#}")]
    Cache {
        id: AssetId,
        #[source]
        source: anyhow::Error,
    },

    /// The record was removed while its content was being resolved
    #[error("asset {0} was removed from the catalog during resolution")]
    RecordEvicted(AssetId),
}

impl ResolveError {
    pub fn is_missing_dependency(&self) -> bool {
        matches!(self, ResolveError::MissingDependency(_))
    }

    /// The asset the error refers to, if any
    pub fn asset_id(&self) -> Option<&AssetId> {
        match self {
            ResolveError::MissingDependency(_) => None,
            ResolveError::MetadataFetch { id, .. }
            | ResolveError::ContentFetch { id, .. }
            | ResolveError::Cache { id, .. }
            | ResolveError::RecordEvicted(id) => Some(id),
        }
    }
}

pub type Result<T, E = ResolveError> = std::result::Result<T, E>;
