//! Typed access on top of the raw byte accessors.

use crate::error::Result;
use crate::marshal::{Marshal, Unmarshal};

use super::Store;

impl Store {
    /// Get the value under `locator` decoded as `T`
    ///
    /// Returns `Err(Marshal(_))` if the stored bytes do not fit `T`'s shape.
    pub fn get<T: Unmarshal>(&mut self, locator: &[u8]) -> Result<Option<T>> {
        match self.get_raw(locator)? {
            Some(bytes) => Ok(Some(T::unmarshal(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Store `value` under `locator` in its marshaled form
    pub fn put<T: Marshal + ?Sized>(&mut self, locator: &[u8], value: &T) -> Result<()> {
        let bytes = value.marshal()?;
        self.put_raw(locator, &bytes)
    }
}
