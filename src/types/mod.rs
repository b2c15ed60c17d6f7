//! Value types shared by the catalog, records and resolvers

pub mod content;
pub mod linked;
pub mod metadata;
pub mod snapshot;
pub mod transfer;

pub use content::{content_type_for, ContentRef, LocalContent};
pub use linked::{LinkedAsset, LinkedAssets};
pub use metadata::{AssetMetadata, FetchFailure};
pub use snapshot::AssetSnapshot;
pub use transfer::{AssetDto, LinkedAssetDto};
