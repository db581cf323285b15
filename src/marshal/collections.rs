//! Strings, sequences, and mappings of fixed-width elements.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use bytes::{Bytes, BytesMut};

use super::{FixedWidth, Marshal, MarshalError, Unmarshal};

// =============================================================================
// Strings
// =============================================================================

impl Marshal for str {
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        Ok(Bytes::copy_from_slice(self.as_bytes()))
    }
}

impl Marshal for String {
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        self.as_str().marshal()
    }
}

impl Unmarshal for String {
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        String::from_utf8(bytes.to_vec()).map_err(|_| MarshalError::InvalidUtf8)
    }
}

// =============================================================================
// Sequences
// =============================================================================

impl<T: FixedWidth> Marshal for [T] {
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        let mut buf = BytesMut::with_capacity(self.len() * T::WIDTH);
        for item in self {
            item.write_to(&mut buf);
        }
        Ok(buf.freeze())
    }
}

impl<T: FixedWidth> Marshal for Vec<T> {
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        self.as_slice().marshal()
    }
}

impl<T: FixedWidth> Unmarshal for Vec<T> {
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        let count = element_count(bytes.len(), T::WIDTH)?;

        let mut buf = bytes;
        let mut items = Vec::with_capacity(count);
        for _ in 0..count {
            items.push(T::read_from(&mut buf)?);
        }
        Ok(items)
    }
}

// =============================================================================
// Mappings
// =============================================================================

impl<K, V, S> Marshal for HashMap<K, V, S>
where
    K: FixedWidth,
    V: FixedWidth,
{
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        Ok(marshal_pairs(self.len(), self.iter()))
    }
}

impl<K, V, S> Unmarshal for HashMap<K, V, S>
where
    K: FixedWidth + Eq + Hash,
    V: FixedWidth,
    S: BuildHasher + Default,
{
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        let mut map = HashMap::with_hasher(S::default());
        for_each_pair::<K, V, _>(bytes, |key, value| {
            map.insert(key, value);
        })?;
        Ok(map)
    }
}

impl<K, V> Marshal for BTreeMap<K, V>
where
    K: FixedWidth,
    V: FixedWidth,
{
    fn marshal(&self) -> Result<Bytes, MarshalError> {
        Ok(marshal_pairs(self.len(), self.iter()))
    }
}

impl<K, V> Unmarshal for BTreeMap<K, V>
where
    K: FixedWidth + Ord,
    V: FixedWidth,
{
    fn unmarshal(bytes: &[u8]) -> Result<Self, MarshalError> {
        let mut map = BTreeMap::new();
        for_each_pair::<K, V, _>(bytes, |key, value| {
            map.insert(key, value);
        })?;
        Ok(map)
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Number of `width`-byte elements in `len` bytes, or a shape error
fn element_count(len: usize, width: usize) -> Result<usize, MarshalError> {
    if width == 0 {
        return if len == 0 {
            Ok(0)
        } else {
            Err(MarshalError::NotMultiple {
                element: 0,
                actual: len,
            })
        };
    }
    if len % width != 0 {
        return Err(MarshalError::NotMultiple {
            element: width,
            actual: len,
        });
    }
    Ok(len / width)
}

fn marshal_pairs<'a, K, V, I>(len: usize, pairs: I) -> Bytes
where
    K: FixedWidth + 'a,
    V: FixedWidth + 'a,
    I: Iterator<Item = (&'a K, &'a V)>,
{
    let mut buf = BytesMut::with_capacity(len * (K::WIDTH + V::WIDTH));
    for (key, value) in pairs {
        key.write_to(&mut buf);
        value.write_to(&mut buf);
    }
    buf.freeze()
}

fn for_each_pair<K, V, F>(bytes: &[u8], mut insert: F) -> Result<(), MarshalError>
where
    K: FixedWidth,
    V: FixedWidth,
    F: FnMut(K, V),
{
    let count = element_count(bytes.len(), K::WIDTH + V::WIDTH)?;

    let mut buf = bytes;
    for _ in 0..count {
        let key = K::read_from(&mut buf)?;
        let value = V::read_from(&mut buf)?;
        insert(key, value);
    }
    Ok(())
}
