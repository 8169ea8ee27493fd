use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StrewnError {
    // Catalog / configuration errors
    #[error("Invalid catalog: {reason}")]
    InvalidCatalog { reason: String },

    #[error("Catalog file not found at path: {path}")]
    CatalogFileNotFound { path: PathBuf },

    #[error("Failed to serialize catalog: {0}")]
    CatalogSerializationFailed(#[from] toml::ser::Error),

    #[error("Failed to deserialize catalog: {0}")]
    CatalogDeserializationFailed(#[from] toml::de::Error),

    // Height field errors
    #[error("Invalid height field: {reason}")]
    InvalidField { reason: String },

    // Engine configuration errors
    #[error("Invalid engine config: {reason}")]
    InvalidConfig { reason: String },

    // Layout persistence errors
    #[error("Layout file not found at path: {path}")]
    LayoutFileNotFound { path: PathBuf },

    #[error("Failed to serialize layout: {reason}")]
    LayoutSerializationFailed { reason: String },

    #[error("Corrupted layout file: {reason}")]
    CorruptedLayoutFile { reason: String },

    #[error("Invalid layout data: {reason}")]
    InvalidLayoutData { reason: String },

    #[error("File operation failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for all operations
pub type StrewnResult<T> = Result<T, StrewnError>;
