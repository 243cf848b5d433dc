//! # I/O Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  std::io / serde_json / csv / toml errors      CoreError (cbpm-core)   │
//! │       │                                              │                  │
//! │       ▼                                              ▼                  │
//! │  IoError (this module) ← adds the export/config failure categories     │
//! │       │                                                                 │
//! │       ├──► bool wrappers (export_to_csv, ...) log and return false     │
//! │       └──► provision-admin main → anyhow                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use cbpm_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// A CSV row is not a JSON object.
    #[error("Record {index} is not a key/value record")]
    NotARecord { index: usize },

    /// Nothing to export.
    #[error("No records to export")]
    EmptyExport,

    /// A later record has a field the header does not.
    #[error("Record {index} has field '{field}' not present in the header")]
    FieldMismatch { index: usize, field: String },

    /// Configuration could not be located or is unusable.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl From<cbpm_core::ValidationError> for IoError {
    fn from(err: cbpm_core::ValidationError) -> Self {
        IoError::Core(err.into())
    }
}

pub type IoResult<T> = Result<T, IoError>;
