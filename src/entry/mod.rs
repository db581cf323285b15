//! Entry Module
//!
//! The on-disk record format of the archive.
//!
//! ## File Format
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Header (4 bytes)                                        │
//! │   EntryCount: u32 LE                                    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Entries (variable, packed, no padding)                  │
//! │   [LocLen: u16 LE][DataLen: u32 LE][Locator][Data]      │
//! │   ... repeated for each live entry ...                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! An entry's offset is the position of its `LocLen` field.

mod codec;

pub use codec::{Entry, EntryHeader};
pub(crate) use codec::read_payload;

/// Size of the live-entry counter at file offset 0
pub const HEADER_SIZE: u64 = 4;

/// Size of the two length prefixes: LocLen (2) + DataLen (4)
pub const ENTRY_PREFIX_SIZE: u64 = 6;

/// Largest locator the u16 prefix can describe
pub const MAX_LOCATOR_LEN: usize = u16::MAX as usize;

/// Largest data blob the u32 prefix can describe
pub const MAX_DATA_LEN: usize = u32::MAX as usize;
