//! Serde-backed values.
//!
//! Structs and enums deriving `Serialize`/`Deserialize` are stored through
//! bincode with fixed-width little-endian integers, so the layout is the
//! same on every machine.

use bincode::Options;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Marshal, MarshalError, Unmarshal};

/// Wrapper that marshals any serde type with bincode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bincoded<T>(pub T);

impl<T> Bincoded<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> From<T> for Bincoded<T> {
    fn from(value: T) -> Self {
        Bincoded(value)
    }
}

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_little_endian()
        .reject_trailing_bytes()
}

impl<T: Serialize> Marshal for Bincoded<T> {
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        options()
            .serialize(&self.0)
            .map(Bytes::from)
            .map_err(|e| MarshalError::Bincode(e.to_string()))
    }
}

impl<T: DeserializeOwned> Unmarshal for Bincoded<T> {
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        options()
            .deserialize(bytes)
            .map(Bincoded)
            .map_err(|e| MarshalError::Bincode(e.to_string()))
    }
}
