//! Shared store handle
//!
//! A cloneable handle for callers that need one store across independent
//! call sites. It is constructed explicitly and lives as long as its last
//! clone; there is no process-wide global.
//!
//! ## Concurrency
//! A `Store` has no internal locking. `SharedStore` serializes every call
//! through one `parking_lot::Mutex`, so each operation runs to completion
//! before the next begins. Two handles must not be opened on the same file;
//! this is not detected.

use std::path::Path;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::config::{StoreConfig, DEFAULT_STORAGE_FILE};
use crate::error::Result;
use crate::marshal::{Marshal, Unmarshal};
use crate::store::Store;

/// Cloneable, mutex-guarded handle to one Store
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Store>>,
}

impl SharedStore {
    /// Wrap an already open store
    pub fn new(store: Store) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn open(config: StoreConfig) -> Result<Self> {
        Ok(Self::new(Store::open(config)?))
    }

    /// Open `userdata.arc` in the working directory
    pub fn open_default() -> Result<Self> {
        Self::open(StoreConfig::default())
    }

    /// Open the default file name inside `dir`
    pub fn open_default_in(dir: impl AsRef<Path>) -> Result<Self> {
        let config = StoreConfig::builder()
            .path(dir.as_ref().join(DEFAULT_STORAGE_FILE))
            .build();
        Self::open(config)
    }

    /// Exclusive access for a sequence of operations
    pub fn lock(&self) -> MutexGuard<'_, Store> {
        self.inner.lock()
    }

    pub fn get_raw(&self, locator: &[u8]) -> Result<Option<Vec<u8>>> {
        self.lock().get_raw(locator)
    }

    pub fn put_raw(&self, locator: &[u8], data: &[u8]) -> Result<()> {
        self.lock().put_raw(locator, data)
    }

    pub fn delete(&self, locator: &[u8]) -> Result<()> {
        self.lock().delete(locator)
    }

    pub fn get<T: Unmarshal>(&self, locator: &[u8]) -> Result<Option<T>> {
        self.lock().get(locator)
    }

    pub fn put<T: Marshal + ?Sized>(&self, locator: &[u8], value: &T) -> Result<()> {
        self.lock().put(locator, value)
    }

    /// Number of live handles to this store
    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}
