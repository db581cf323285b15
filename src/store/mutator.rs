//! Mutator
//!
//! Write-side operations: append, same-size overwrite, and delete with
//! compaction. The raw positional write is private; callers only reach it
//! through the two paths that keep the layout intact.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::config::CompactionMode;
use crate::entry::{Entry, EntryHeader, HEADER_SIZE};
use crate::error::{ArchiveError, Result};

use super::{staging_path, Store};

impl Store {
    /// Create or overwrite the entry for `locator`
    ///
    /// Steps:
    /// 1. Encode (rejects oversized locator/data before any write)
    /// 2. Locate the existing entry
    /// 3. Absent: append at end-of-file
    /// 4. Same data length: overwrite in place, offset unchanged
    /// 5. Different data length: delete with compaction, then append
    pub fn put_raw(&mut self, locator: &[u8], data: &[u8]) -> Result<()> {
        let encoded = Entry::encode_parts(locator, data)?;

        match self.locate_entry(locator)? {
            None => {
                self.append(locator, &encoded)?;
            }
            Some(offset) => {
                let stored = self.read_header_at(offset)?.ok_or_else(|| {
                    ArchiveError::corruption(offset, "located entry is missing")
                })?;

                if stored.data_len as usize == data.len() {
                    self.overwrite_in_place(offset, stored, &encoded)?;
                } else {
                    debug!(
                        offset,
                        old_len = stored.data_len,
                        new_len = data.len(),
                        "Relocating entry"
                    );
                    self.remove_at(locator, offset)?;
                    self.append(locator, &encoded)?;
                }
            }
        }

        self.finish_mutation()
    }

    /// Delete the entry for `locator` and reclaim its space
    ///
    /// Fails with `LocatorNotFound` if absent. No rollback: an error during
    /// in-place compaction can leave a partially shifted file and a stale
    /// header count.
    pub fn delete(&mut self, locator: &[u8]) -> Result<()> {
        let offset = self
            .locate_entry(locator)?
            .ok_or(ArchiveError::LocatorNotFound)?;

        self.remove_at(locator, offset)?;
        self.finish_mutation()
    }

    // =========================================================================
    // Safe Write Paths
    // =========================================================================

    /// Write an encoded entry at end-of-file and count it
    fn append(&mut self, locator: &[u8], encoded: &[u8]) -> Result<u64> {
        if self.entry_count == u32::MAX {
            return Err(ArchiveError::StoreFull);
        }

        let offset = self.file.seek(SeekFrom::End(0))?;
        self.write_entry_at(offset, encoded)?;

        self.entry_count += 1;
        self.persist_header()?;

        if let Some(index) = &mut self.index {
            index.insert_first(locator.to_vec(), offset);
        }

        debug!(offset, size = encoded.len(), entries = self.entry_count, "Appended entry");
        Ok(offset)
    }

    /// Replace an entry with one of exactly the same encoded size
    fn overwrite_in_place(
        &mut self,
        offset: u64,
        stored: EntryHeader,
        encoded: &[u8],
    ) -> Result<()> {
        debug_assert_eq!(stored.span(), encoded.len() as u64);

        self.write_entry_at(offset, encoded)?;

        debug!(offset, size = encoded.len(), "Overwrote entry in place");
        Ok(())
    }

    /// Raw positional write. Never shifts the bytes that follow `offset`, so
    /// it is only sound at end-of-file or over an entry of equal size.
    fn write_entry_at(&mut self, offset: u64, encoded: &[u8]) -> Result<()> {
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(encoded)?;
        Ok(())
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Remove the entry at `offset`, close the gap, and update the header
    fn remove_at(&mut self, locator: &[u8], offset: u64) -> Result<()> {
        let end = self
            .next_entry(offset)?
            .ok_or_else(|| ArchiveError::corruption(offset, "no entry at located offset"))?;
        let span = end - offset;
        let file_size = self.file_size()?;

        if end == file_size {
            self.file.set_len(offset)?;
            debug!(offset, span, "Truncated tail entry");
        } else {
            match self.config.compaction {
                CompactionMode::InPlace => self.compact_in_place(offset, end)?,
                CompactionMode::Staged => self.compact_staged(offset, end, file_size)?,
            }
        }

        self.entry_count = self.entry_count.saturating_sub(1);
        self.persist_header()?;

        if self.index.is_some() {
            // A later duplicate of this locator is now the first match
            let duplicate = self.scan_for(locator)?;
            if let Some(index) = &mut self.index {
                index.remove(locator);
                index.shift_after(offset, span);
                if let Some(dup) = duplicate {
                    index.insert_first(locator.to_vec(), dup);
                }
            }
        }

        Ok(())
    }

    /// Copy each following entry backward over the gap, then truncate
    fn compact_in_place(&mut self, offset: u64, end: u64) -> Result<()> {
        let mut write_pos = offset;
        let mut read_pos = end;
        let mut buffer = Vec::new();
        let mut moved = 0u64;

        while let Some(next) = self.next_entry(read_pos)? {
            let len = (next - read_pos) as usize;
            buffer.resize(len, 0);

            self.file.seek(SeekFrom::Start(read_pos))?;
            self.file.read_exact(&mut buffer)?;
            self.file.seek(SeekFrom::Start(write_pos))?;
            self.file.write_all(&buffer)?;

            write_pos += len as u64;
            read_pos = next;
            moved += 1;
        }

        self.file.set_len(write_pos)?;

        debug!(
            offset,
            reclaimed = end - offset,
            moved,
            new_size = write_pos,
            "Compacted in place"
        );
        Ok(())
    }

    /// Build the compacted file beside the store and rename it over the original
    fn compact_staged(&mut self, offset: u64, end: u64, file_size: u64) -> Result<()> {
        let staging = staging_path(&self.config.path);

        if let Err(e) = self.write_staged(&staging, offset, end, file_size) {
            let _ = fs::remove_file(&staging);
            return Err(e);
        }

        install_staged(&staging, &self.config.path)?;
        self.reopen()?;

        info!(
            path = %self.config.path.display(),
            reclaimed = end - offset,
            new_size = file_size - (end - offset),
            "Compacted via staging file"
        );
        Ok(())
    }

    fn write_staged(
        &mut self,
        staging: &Path,
        offset: u64,
        end: u64,
        file_size: u64,
    ) -> Result<()> {
        let mut staged = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(staging)?;

        let remaining = self.entry_count.saturating_sub(1);
        staged.write_all(&remaining.to_le_bytes())?;

        self.file.seek(SeekFrom::Start(HEADER_SIZE))?;
        copy_exact(&mut self.file, &mut staged, offset - HEADER_SIZE, HEADER_SIZE)?;

        self.file.seek(SeekFrom::Start(end))?;
        copy_exact(&mut self.file, &mut staged, file_size - end, end)?;

        staged.sync_all()?;
        Ok(())
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Rename a fully written staging file over `target`, then sync the
/// directory so the rename itself survives a crash.
///
/// On failure the staging file is removed and `target` is left as it was.
fn install_staged(staging: &Path, target: &Path) -> Result<()> {
    if let Err(e) = fs::rename(staging, target) {
        let _ = fs::remove_file(staging);
        return Err(e.into());
    }
    sync_parent_dir(target)
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) -> Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    File::open(parent)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files here
#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) -> Result<()> {
    Ok(())
}

/// Copy exactly `len` bytes from the current position of `from`
///
/// Staged compaction copies both halves of the store through this.
fn copy_exact(from: &mut File, to: &mut File, len: u64, start: u64) -> Result<()> {
    let mut limited = Read::by_ref(from).take(len);
    let copied = io::copy(&mut limited, to)?;

    if copied != len {
        return Err(ArchiveError::corruption(
            start,
            format!("expected {} bytes to copy, found {}", len, copied),
        ));
    }
    Ok(())
}
