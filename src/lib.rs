//! Asset content resolution and caching
//!
//! Turns an asset id into usable local content bytes, trying in order:
//!
//! 1. the local handle already owned by the asset's record,
//! 2. a secondary (persistent) cache,
//! 3. the remote content origin, writing the result through to the cache.
//!
//! - **Catalog**: `AssetCatalog` owns every `AssetRecord` and ingests nested
//!   transfer objects into a flat set of linked records
//! - **Resolvers**: `MetadataResolver` (catalog first, origin once per miss)
//!   and `ContentResolver` (the three-tier content lookup)
//! - **Collaborators**: `MetadataOrigin`, `ContentOrigin`, `SecondaryCache`,
//!   with in-memory and mock implementations
//!
//! # Example
//!
//! ```ignore
//! use asset_resolver::{AssetCatalog, ContentResolver, MetadataResolver};
//!
//! let catalog = Arc::new(AssetCatalog::new());
//! let metadata = Arc::new(MetadataResolver::new(catalog.clone(), origin.clone()));
//! let resolver = ContentResolver::builder()
//!     .catalog(catalog)
//!     .metadata_resolver(metadata)
//!     .content_origin(origin)
//!     .cache(cache)
//!     .build();
//!
//! let content = resolver.resolve_content(&"a1".into()).await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod handle;
pub mod ids;
pub mod implementations;
pub mod logging;
pub mod metadata;
pub mod record;
pub mod resolver;
pub mod traits;
pub mod types;

pub use catalog::{AssetCatalog, CatalogEvent, DefaultRecordFactory, RecordFactory};
pub use config::{LoggingConfig, ResolverConfig};
pub use error::ResolveError;
pub use handle::{HandleRegistry, LocalContentHandle};
pub use ids::{AssetId, HandleId};
pub use metadata::MetadataResolver;
pub use record::{AssetRecord, RecordEvent, RecordField};
pub use resolver::{BatchResult, ContentResolver, ContentResolverBuilder, ResolveStage};
pub use traits::{ContentOrigin, MetadataOrigin, SecondaryCache};
pub use types::{
    AssetDto, AssetMetadata, AssetSnapshot, ContentRef, FetchFailure, LinkedAsset,
    LinkedAssetDto, LinkedAssets, LocalContent,
};
