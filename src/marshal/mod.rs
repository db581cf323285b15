//! Marshal Module
//!
//! Conversion between typed values and the raw bytes the store keeps.
//!
//! ## Encoding
//! Every shape has a pinned, portable layout. Nothing depends on the host's
//! in-memory representation.
//!
//! | Shape                       | Bytes                                          |
//! |-----------------------------|------------------------------------------------|
//! | integer / float             | fixed width, little-endian                     |
//! | `bool`                      | 1 byte, `0` or `1`                             |
//! | `char`                      | 4 bytes, little-endian scalar value            |
//! | `[T; N]`                    | `N` elements back to back                      |
//! | `String` / `str`            | raw UTF-8, no length prefix                    |
//! | `Vec<T>` / `[T]`            | elements back to back                          |
//! | `HashMap` / `BTreeMap`      | `key ‖ value` pairs back to back, any order    |
//! | [`Bincoded<T>`]             | bincode, fixed-int little-endian               |
//!
//! Unmarshaling fails with a [`MarshalError`] when the byte length does not
//! fit the requested shape.

mod bincoded;
mod collections;
mod fixed;

use bytes::Bytes;
use thiserror::Error;

pub use bincoded::Bincoded;
pub use fixed::FixedWidth;

/// Shape mismatch between stored bytes and the requested type
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarshalError {
    #[error("expected exactly {expected} bytes, got {actual}")]
    WidthMismatch { expected: usize, actual: usize },

    #[error("{actual} bytes is not a multiple of the {element}-byte element size")]
    NotMultiple { element: usize, actual: usize },

    #[error("bytes are not valid UTF-8")]
    InvalidUtf8,

    #[error("bytes do not encode a valid {type_name}")]
    InvalidValue { type_name: &'static str },

    #[error("bincode: {0}")]
    Bincode(String),
}

/// Types that can be turned into stored bytes
pub trait Marshal {
    fn marshal(&self) -> Result<Bytes, MarshalError>;
}

/// Types that can be rebuilt from stored bytes
pub trait Unmarshal: Sized {
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError>;
}
