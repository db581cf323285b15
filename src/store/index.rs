//! Locator index
//!
//! Optional in-memory map from locator to the offset of its first entry,
//! rebuilt from the file at open and kept in step with every mutation.
//! Lookups through it answer exactly what the linear scan answers.

use std::collections::BTreeMap;

use crate::error::Result;

use super::Store;

/// In-memory index: locator → file offset of the first matching entry
#[derive(Debug, Default)]
pub(crate) struct LocatorIndex {
    offsets: BTreeMap<Vec<u8>, u64>,
}

impl LocatorIndex {
    /// Walk the entry chain once, keeping the first offset per locator
    pub(super) fn build(store: &mut Store) -> Result<Self> {
        let mut index = Self::default();
        for (offset, locator) in store.walk_locators()? {
            index.insert_first(locator, offset);
        }
        Ok(index)
    }

    pub(super) fn get(&self, locator: &[u8]) -> Option<u64> {
        self.offsets.get(locator).copied()
    }

    /// Record `offset` unless an earlier entry already owns the locator
    pub(super) fn insert_first(&mut self, locator: Vec<u8>, offset: u64) {
        self.offsets.entry(locator).or_insert(offset);
    }

    pub(super) fn remove(&mut self, locator: &[u8]) {
        self.offsets.remove(locator);
    }

    /// Move every offset past `removed_at` back by `span` bytes
    pub(super) fn shift_after(&mut self, removed_at: u64, span: u64) {
        for offset in self.offsets.values_mut() {
            if *offset > removed_at {
                *offset -= span;
            }
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.offsets.len()
    }
}
