use std::io;
use thiserror::Error;

/// Result type for dumpfs operations
pub type Result<T> = std::result::Result<T, DumpFsError>;

/// Unified error type for all dumpfs operations
#[derive(Debug, Error)]
pub enum DumpFsError {
    // Lookup errors
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Directory already exists: {0}")]
    AlreadyExists(String),

    // Bounded field errors
    #[error("Name too long: {name} ({len} bytes, max {max})")]
    NameTooLong { name: String, len: usize, max: usize },

    #[error("Path too long: {path} ({len} bytes, max {max})")]
    PathTooLong { path: String, len: usize, max: usize },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // Archive structure errors
    #[error("Invalid archive format: {0}")]
    InvalidFormat(String),

    #[error("Entry table is full: {capacity} entries fit before the data region")]
    TableFull { capacity: u32 },

    #[error("Archive is full: data region cannot grow past {0} bytes")]
    ArchiveFull(u64),

    #[error("Operation not supported by the {0} layout")]
    Unsupported(&'static str),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<toml::de::Error> for DumpFsError {
    fn from(err: toml::de::Error) -> Self {
        DumpFsError::Config(err.to_string())
    }
}

impl DumpFsError {
    /// True for errors that mean a referenced file or directory is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, DumpFsError::NotFound(_))
    }
}
