//! Configuration for the gallery index

use crate::core::classifier::DEFAULT_PREFIX;
use crate::core::scanner::ScanConfig;
use crate::core::store::DEFAULT_COLLECTION;
use crate::error::{GalleryError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where chat apps drop received images on Android external storage
pub const DEFAULT_IMAGE_DIR: &str =
    "/storage/emulated/0/Android/media/com.whatsapp/WhatsApp/Media/WhatsApp Images";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryConfig {
    /// Directory whose direct children are indexed
    pub directory: PathBuf,

    /// SQLite file holding the persisted index
    pub store_path: PathBuf,

    /// Collection name inside the store
    pub collection: String,

    /// Literal prefix the classifier looks for before the digits
    pub classifier_prefix: String,

    /// Scanner settings
    pub scan: ScanConfig,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from(DEFAULT_IMAGE_DIR),
            store_path: default_store_path(),
            collection: DEFAULT_COLLECTION.to_string(),
            classifier_prefix: DEFAULT_PREFIX.to_string(),
            scan: ScanConfig::default(),
        }
    }
}

fn default_store_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("contact-gallery")
        .join("index.db")
}

impl GalleryConfig {
    /// Load configuration from a JSON file; missing fields take defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| GalleryError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.collection.trim().is_empty() {
            return Err(GalleryError::Config("collection must not be empty".to_string()));
        }
        if self.classifier_prefix.is_empty() {
            return Err(GalleryError::Config("classifier prefix must not be empty".to_string()));
        }
        if let Some(extensions) = &self.scan.extensions {
            if extensions.is_empty() {
                return Err(GalleryError::Config("extension allow-list must not be empty".to_string()));
            }
        }
        Ok(())
    }
}
