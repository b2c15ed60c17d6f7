//! Resolver configuration stored in `resolver.toml`

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalog::DefaultRecordFactory;
use crate::handle::{DEFAULT_HANDLE_SCHEME, HandleRegistry};

fn default_use_cache() -> bool {
    true
}

fn default_handle_scheme() -> String {
    DEFAULT_HANDLE_SCHEME.to_string()
}

fn default_fallback_content_type() -> String {
    "application/octet-stream".to_string()
}

fn default_log_filter() -> String {
    "info,asset_resolver=debug".to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, overridden by `RUST_LOG` when set
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Append logs to this file instead of stderr
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Whether `resolve_content` consults the secondary cache by default
    #[serde(default = "default_use_cache")]
    pub use_cache: bool,
    /// Prefix of local handle URLs
    #[serde(default = "default_handle_scheme")]
    pub handle_scheme: String,
    /// Content type used when the filename extension is unknown
    #[serde(default = "default_fallback_content_type")]
    pub fallback_content_type: String,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            use_cache: default_use_cache(),
            handle_scheme: default_handle_scheme(),
            fallback_content_type: default_fallback_content_type(),
            logging: LoggingConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Get the default config file path (`<config dir>/asset-resolver/resolver.toml`)
    pub fn default_path() -> Option<PathBuf> {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("asset-resolver").join("resolver.toml"))
    }

    /// Load configuration from the default path, or defaults if absent
    pub fn load() -> anyhow::Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ResolverConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Record factory staging local handles under the configured scheme
    pub fn record_factory(&self) -> DefaultRecordFactory {
        DefaultRecordFactory::new(Arc::new(HandleRegistry::with_scheme(
            self.handle_scheme.clone(),
        )))
    }
}
