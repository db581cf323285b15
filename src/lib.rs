//! # ArchiveKV
//!
//! A persistent key-value archive backed by a single flat file:
//! - Named byte blobs ("locator" → data) stored as packed records
//! - Same-size overwrites in place, other overwrites relocate to the end
//! - Deletes reclaim space by compaction (in place or via a staged copy)
//! - Typed get/put with a portable, explicit byte encoding
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 Typed Accessor (get / put)                   │
//! │                 marshal: T ⇄ bytes                           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │              Raw Accessor (get_raw / put_raw / delete)       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Scanner   │          │   Mutator   │
//!   │ (locate)    │          │ (append,    │
//!   │             │          │  compact)   │
//!   └──────┬──────┘          └──────┬──────┘
//!          └────────────┬───────────┘
//!                       ▼
//!               ┌──────────────┐
//!               │ Entry Codec  │
//!               │ Header | ... │
//!               └──────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod entry;
pub mod marshal;
pub mod store;
pub mod shared;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{ArchiveError, Result};
pub use config::{CompactionMode, StoreConfig, SyncStrategy, DEFAULT_STORAGE_FILE};
pub use entry::Entry;
pub use marshal::{Bincoded, Marshal, MarshalError, Unmarshal};
pub use store::{Store, VerifyReport};
pub use shared::SharedStore;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ArchiveKV
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
