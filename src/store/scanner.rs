//! Scanner
//!
//! Read-side traversal of the entry chain. Every lookup is a linear walk
//! from the first entry unless the locator index is enabled.

use std::io::{Seek, SeekFrom};

use crate::entry::{read_payload, Entry, EntryHeader, HEADER_SIZE};
use crate::error::{ArchiveError, Result};

use super::Store;

impl Store {
    /// Offset of the entry that follows the one starting at `prev_pos`.
    ///
    /// Returns:
    /// - `Ok(Some(offset))` — end of the entry at `prev_pos`; equal to the
    ///   file size when that entry is the last one
    /// - `Ok(None)` — `prev_pos` is at end-of-file, no entry starts there
    /// - `Err(Corruption)` — the entry at `prev_pos` is cut short
    pub fn next_entry(&mut self, prev_pos: u64) -> Result<Option<u64>> {
        Ok(self
            .read_header_at(prev_pos)?
            .map(|header| prev_pos + header.span()))
    }

    /// Offset of the first entry whose locator equals `locator`
    pub fn locate_entry(&mut self, locator: &[u8]) -> Result<Option<u64>> {
        if let Some(index) = &self.index {
            return Ok(index.get(locator));
        }
        self.scan_for(locator)
    }

    /// Offset of the `n`-th entry (zero-based) in file order
    pub fn locate_idx(&mut self, n: u32) -> Result<Option<u64>> {
        if n >= self.entry_count {
            return Ok(None);
        }

        let mut cursor = HEADER_SIZE;
        for _ in 0..n {
            match self.next_entry(cursor)? {
                Some(next) => cursor = next,
                None => return Ok(None),
            }
        }

        // Header may claim more entries than the chain holds
        if cursor >= self.file_size()? {
            return Ok(None);
        }
        Ok(Some(cursor))
    }

    /// Data payload of the entry starting at `offset`, skipping its locator
    pub fn read_data_at(&mut self, offset: u64) -> Result<Option<Vec<u8>>> {
        let header = match self.read_header_at(offset)? {
            Some(header) => header,
            None => return Ok(None),
        };

        self.file.seek(SeekFrom::Current(header.locator_len as i64))?;
        read_payload(&mut self.file, header.data_len as usize, offset).map(Some)
    }

    /// Full entry starting at `offset`
    pub fn read_entry_at(&mut self, offset: u64) -> Result<Option<Entry>> {
        Entry::decode_at(&mut self.file, offset)
    }

    /// Get the data stored under `locator`
    ///
    /// Returns:
    /// - `Ok(Some(data))` — locator found
    /// - `Ok(None)` — no entry with this locator
    pub fn get_raw(&mut self, locator: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.locate_entry(locator)? {
            Some(offset) => self.read_data_at(offset),
            None => Ok(None),
        }
    }

    pub fn contains(&mut self, locator: &[u8]) -> Result<bool> {
        Ok(self.locate_entry(locator)?.is_some())
    }

    /// Iterate over `(offset, entry)` pairs in file order
    pub fn entries(&mut self) -> Entries<'_> {
        Entries {
            store: self,
            cursor: HEADER_SIZE,
            done: false,
        }
    }

    /// All locators in file order
    pub fn locators(&mut self) -> Result<Vec<Vec<u8>>> {
        self.entries()
            .map(|item| item.map(|(_, entry)| entry.locator))
            .collect()
    }

    // =========================================================================
    // Crate-internal Helpers
    // =========================================================================

    /// Read the prefixes at `offset` and check the entry fits inside the file
    pub(super) fn read_header_at(&mut self, offset: u64) -> Result<Option<EntryHeader>> {
        let header = match EntryHeader::read_at(&mut self.file, offset)? {
            Some(header) => header,
            None => return Ok(None),
        };

        let file_size = self.file_size()?;
        if offset + header.span() > file_size {
            return Err(ArchiveError::corruption(
                offset,
                format!(
                    "entry of {} bytes runs past end of file at {}",
                    header.span(),
                    file_size
                ),
            ));
        }

        Ok(Some(header))
    }

    /// Linear scan from the first entry, ignoring the index
    pub(super) fn scan_for(&mut self, locator: &[u8]) -> Result<Option<u64>> {
        let mut cursor = HEADER_SIZE;

        while let Some(header) = self.read_header_at(cursor)? {
            // Prefixes were just read, the file cursor sits on the locator
            if header.locator_len as usize == locator.len() {
                let candidate = read_payload(&mut self.file, locator.len(), cursor)?;
                if candidate == locator {
                    return Ok(Some(cursor));
                }
            }
            cursor += header.span();
        }

        Ok(None)
    }

    /// `(offset, locator)` of every entry, without reading data payloads
    pub(super) fn walk_locators(&mut self) -> Result<Vec<(u64, Vec<u8>)>> {
        let mut cursor = HEADER_SIZE;
        let mut found = Vec::new();

        while let Some(header) = self.read_header_at(cursor)? {
            let locator = read_payload(&mut self.file, header.locator_len as usize, cursor)?;
            found.push((cursor, locator));
            cursor += header.span();
        }

        Ok(found)
    }
}

// =============================================================================
// Entries Iterator
// =============================================================================

/// Iterator over store entries in file order
///
/// Stops after the first error.
pub struct Entries<'a> {
    store: &'a mut Store,
    cursor: u64,
    done: bool,
}

impl Iterator for Entries<'_> {
    /// (offset, entry)
    type Item = Result<(u64, Entry)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let offset = self.cursor;
        match self.store.read_entry_at(offset) {
            Ok(Some(entry)) => {
                self.cursor = offset + entry.encoded_len();
                Some(Ok((offset, entry)))
            }
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
