//! Configuration for ArchiveKV
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

/// File opened by [`StoreConfig::default`] and the shared default instance.
pub const DEFAULT_STORAGE_FILE: &str = "userdata.arc";

/// Main configuration for a Store instance
#[derive(Debug, Clone)]
pub struct StoreConfig {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// The single file holding header and entries
    pub path: PathBuf,

    /// How hard to push bytes to disk after each mutation
    pub sync_strategy: SyncStrategy,

    // -------------------------------------------------------------------------
    // Delete Configuration
    // -------------------------------------------------------------------------
    /// How the gap left by a deleted entry is closed
    pub compaction: CompactionMode,

    // -------------------------------------------------------------------------
    // Lookup Configuration
    // -------------------------------------------------------------------------
    /// Keep an in-memory locator → offset index next to the linear scan
    pub indexed: bool,
}

/// Sync strategy applied after every completed mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// Flush userspace buffers only; the OS decides when to write back
    Flush,

    /// fsync file data after every mutation (safest, slowest)
    EveryMutation,
}

/// How `delete` reclaims the space of a non-tail entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactionMode {
    /// Shift every following entry backward inside the file, then truncate.
    /// A crash mid-shift leaves a partially shifted file.
    InPlace,

    /// Write the compacted content to `<file>.compact`, fsync it, rename it
    /// over the store file, and fsync the parent directory (Unix only). The
    /// original stays intact until the rename.
    Staged,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_STORAGE_FILE),
            sync_strategy: SyncStrategy::Flush,
            compaction: CompactionMode::InPlace,
            indexed: false,
        }
    }
}

impl StoreConfig {
    /// Create a new config builder
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }
}

/// Builder for StoreConfig
#[derive(Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    /// Set the store file path
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.path = path.into();
        self
    }

    /// Set the sync strategy
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    /// Set the compaction mode used by delete
    pub fn compaction(mut self, mode: CompactionMode) -> Self {
        self.config.compaction = mode;
        self
    }

    /// Enable or disable the in-memory locator index
    pub fn indexed(mut self, indexed: bool) -> Self {
        self.config.indexed = indexed;
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}
