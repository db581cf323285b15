//! Store Module
//!
//! The single-file archive: header, entry chain, and the operations on it.
//!
//! ## Responsibilities
//! - Own the one open file handle for the store's lifetime
//! - Keep the header count equal to the number of entries after every
//!   completed mutation
//! - Scan the entry chain (`scanner`), mutate it (`mutator`), and wrap raw
//!   access with typed marshaling (`typed`)
//!
//! ## Ownership Model
//!
//! Every operation takes `&mut self`: the file cursor is shared state, so a
//! `Store` is used by one caller at a time. Sharing across call sites goes
//! through [`crate::SharedStore`], which serializes access with a mutex.
//!
//! ## Offsets
//!
//! Offsets returned by the scanner are transient. Deleting any earlier entry
//! moves every later entry backward by the deleted entry's encoded size.

mod index;
mod mutator;
mod scanner;
mod typed;

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::{StoreConfig, SyncStrategy};
use crate::entry::HEADER_SIZE;
use crate::error::{ArchiveError, Result};

use index::LocatorIndex;

pub use scanner::Entries;

/// A persistent key-value archive backed by one flat file
pub struct Store {
    /// Store configuration
    config: StoreConfig,

    /// Open read/write handle on `config.path`
    file: File,

    /// Live entry count, mirrored in the first four bytes of the file
    entry_count: u32,

    /// Locator → offset of the first matching entry (when enabled)
    index: Option<LocatorIndex>,
}

/// Outcome of walking the whole entry chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    /// Count recorded in the header
    pub header_count: u32,

    /// Entries actually present in the chain
    pub entries_found: u64,

    /// Offset where the chain ended
    pub end_offset: u64,

    /// File size on disk
    pub file_size: u64,
}

impl VerifyReport {
    /// Header count matches the chain and the chain covers the whole file
    pub fn is_consistent(&self) -> bool {
        self.header_count as u64 == self.entries_found && self.end_offset == self.file_size
    }
}

impl Store {
    /// Open or create a store with the given config
    ///
    /// On startup:
    /// 1. Open the file, creating it if missing
    /// 2. Read the header count, or write a zero count if the file is new
    ///    or too short to hold one
    /// 3. Build the locator index if enabled
    pub fn open(config: StoreConfig) -> Result<Self> {
        if config.path.as_os_str().is_empty() {
            return Err(ArchiveError::Config("store path is empty".to_string()));
        }

        let mut file = open_rw(&config.path)?;
        let entry_count = read_or_init_header(&mut file, &config.path)?;

        let mut store = Self {
            config,
            file,
            entry_count,
            index: None,
        };

        if store.config.indexed {
            let index = LocatorIndex::build(&mut store)?;
            store.index = Some(index);
        }

        info!(
            path = %store.config.path.display(),
            entries = store.entry_count,
            file_size = store.file_size()?,
            indexed = store.config.indexed,
            "Store opened"
        );

        Ok(store)
    }

    /// Open with a path (convenience method)
    ///
    /// Uses default config with the specified file
    pub fn open_path(path: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder().path(path.as_ref()).build();
        Self::open(config)
    }

    /// Walk every entry and compare against the header. Never modifies the file.
    pub fn verify(&mut self) -> Result<VerifyReport> {
        let mut cursor = HEADER_SIZE;
        let mut entries_found = 0u64;

        while let Some(next) = self.next_entry(cursor)? {
            entries_found += 1;
            cursor = next;
        }

        Ok(VerifyReport {
            header_count: self.entry_count,
            entries_found,
            end_offset: cursor,
            file_size: self.file_size()?,
        })
    }

    /// Force file data to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Close the store gracefully, syncing to disk
    pub fn close(mut self) -> Result<()> {
        self.sync()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Number of live entries, as recorded in the header
    pub fn len(&self) -> u32 {
        self.entry_count
    }

    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Current size of the store file in bytes
    pub fn file_size(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    /// Get the configuration
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    // =========================================================================
    // Header
    // =========================================================================

    /// Write the in-memory count to offset 0
    fn persist_header(&mut self) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.write_all(&self.entry_count.to_le_bytes())?;
        Ok(())
    }

    /// Apply the configured sync strategy after a completed mutation
    fn finish_mutation(&mut self) -> Result<()> {
        self.file.flush()?;
        if self.config.sync_strategy == SyncStrategy::EveryMutation {
            self.file.sync_data()?;
        }
        Ok(())
    }

    /// Reopen the handle after the file was replaced on disk
    fn reopen(&mut self) -> Result<()> {
        self.file = open_rw(&self.config.path)?;
        Ok(())
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.file.flush().and_then(|_| self.file.sync_all()) {
            warn!(path = %self.config.path.display(), error = %e, "Failed to sync store on drop");
        }
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

fn open_rw(path: &Path) -> Result<File> {
    let file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)?;
    Ok(file)
}

/// Read the header count, initializing it to zero when the file cannot hold one
fn read_or_init_header(file: &mut File, path: &Path) -> Result<u32> {
    let len = file.metadata()?.len();

    if len < HEADER_SIZE {
        if len > 0 {
            warn!(
                path = %path.display(),
                file_size = len,
                "Store header cut short, resetting entry count"
            );
        }
        file.set_len(0)?;
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&0u32.to_le_bytes())?;
        file.flush()?;
        debug!(path = %path.display(), "Initialized empty store");
        return Ok(0);
    }

    let mut header = [0u8; HEADER_SIZE as usize];
    file.seek(SeekFrom::Start(0))?;
    file.read_exact(&mut header)?;
    Ok(u32::from_le_bytes(header))
}

/// Sibling path used to stage a compacted copy of the store
fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".compact");
    PathBuf::from(name)
}
