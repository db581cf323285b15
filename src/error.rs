//! Error types for ArchiveKV
//!
//! Provides a unified error type for all store operations.

use thiserror::Error;

use crate::marshal::MarshalError;

/// Result type alias using ArchiveError
pub type Result<T> = std::result::Result<T, ArchiveError>;

/// Unified error type for ArchiveKV operations
#[derive(Debug, Error)]
pub enum ArchiveError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Layout Errors
    // -------------------------------------------------------------------------
    /// A record is cut short or runs past end-of-file.
    #[error("Corrupt entry at offset {offset}: {reason}")]
    Corruption { offset: u64, reason: String },

    // -------------------------------------------------------------------------
    // Capacity Errors
    // -------------------------------------------------------------------------
    #[error("Locator is {len} bytes, limit is {} bytes", u16::MAX)]
    LocatorTooLong { len: usize },

    #[error("Data is {len} bytes, limit is {} bytes", u32::MAX)]
    DataTooLarge { len: usize },

    #[error("Store already holds the maximum number of entries")]
    StoreFull,

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Locator not found")]
    LocatorNotFound,

    // -------------------------------------------------------------------------
    // Marshaling Errors
    // -------------------------------------------------------------------------
    #[error("Marshal error: {0}")]
    Marshal(#[from] MarshalError),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ArchiveError {
    pub(crate) fn corruption(offset: u64, reason: impl Into<String>) -> Self {
        ArchiveError::Corruption {
            offset,
            reason: reason.into(),
        }
    }
}
