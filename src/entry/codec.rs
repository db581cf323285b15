//! Entry codec
//!
//! Encoding and decoding of a single `(locator, data)` record.

use std::io::{self, Read, Seek, SeekFrom};

use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{ArchiveError, Result};

use super::{ENTRY_PREFIX_SIZE, MAX_DATA_LEN, MAX_LOCATOR_LEN};

// =============================================================================
// Entry Header
// =============================================================================

/// The two length prefixes that open every entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryHeader {
    pub locator_len: u16,
    pub data_len: u32,
}

impl EntryHeader {
    /// Build a header for payloads of the given lengths, rejecting anything
    /// the prefixes cannot describe.
    pub fn for_parts(locator_len: usize, data_len: usize) -> Result<Self> {
        if locator_len > MAX_LOCATOR_LEN {
            return Err(ArchiveError::LocatorTooLong { len: locator_len });
        }
        if data_len > MAX_DATA_LEN {
            return Err(ArchiveError::DataTooLarge { len: data_len });
        }
        Ok(Self {
            locator_len: locator_len as u16,
            data_len: data_len as u32,
        })
    }

    /// Total encoded size of the entry this header opens
    pub fn span(&self) -> u64 {
        ENTRY_PREFIX_SIZE + self.locator_len as u64 + self.data_len as u64
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_PREFIX_SIZE as usize] {
        let mut out = [0u8; ENTRY_PREFIX_SIZE as usize];
        out[0..2].copy_from_slice(&self.locator_len.to_le_bytes());
        out[2..6].copy_from_slice(&self.data_len.to_le_bytes());
        out
    }

    pub fn from_bytes(bytes: [u8; ENTRY_PREFIX_SIZE as usize]) -> Self {
        Self {
            locator_len: u16::from_le_bytes([bytes[0], bytes[1]]),
            data_len: u32::from_le_bytes([bytes[2], bytes[3], bytes[4], bytes[5]]),
        }
    }

    /// Read the length prefixes of the entry starting at `offset`.
    ///
    /// Returns:
    /// - `Ok(Some(header))` — both prefixes read
    /// - `Ok(None)` — `offset` is at end-of-file, no entry starts here
    /// - `Err(Corruption)` — only part of the prefixes is present
    pub fn read_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Option<Self>> {
        reader.seek(SeekFrom::Start(offset))?;

        let mut buf = [0u8; ENTRY_PREFIX_SIZE as usize];
        let filled = fill(reader, &mut buf)?;

        match filled {
            0 => Ok(None),
            n if n < buf.len() => Err(ArchiveError::corruption(
                offset,
                format!("length prefix cut short after {} bytes", n),
            )),
            _ => Ok(Some(Self::from_bytes(buf))),
        }
    }
}

// =============================================================================
// Entry
// =============================================================================

/// A single locator-data pair as stored in the file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub locator: Vec<u8>,
    pub data: Vec<u8>,
}

impl Entry {
    pub fn new(locator: impl Into<Vec<u8>>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            locator: locator.into(),
            data: data.into(),
        }
    }

    /// Header describing this entry, or a capacity error
    pub fn header(&self) -> Result<EntryHeader> {
        EntryHeader::for_parts(self.locator.len(), self.data.len())
    }

    /// Size of this entry on disk
    pub fn encoded_len(&self) -> u64 {
        ENTRY_PREFIX_SIZE + self.locator.len() as u64 + self.data.len() as u64
    }

    pub fn encode(&self) -> Result<Bytes> {
        Self::encode_parts(&self.locator, &self.data)
    }

    /// Encode a record without building an owned `Entry` first.
    ///
    /// Format: loc_len (2) + data_len (4) + locator + data
    pub fn encode_parts(locator: &[u8], data: &[u8]) -> Result<Bytes> {
        let header = EntryHeader::for_parts(locator.len(), data.len())?;

        let mut buf = BytesMut::with_capacity(header.span() as usize);
        buf.put_u16_le(header.locator_len);
        buf.put_u32_le(header.data_len);
        buf.put_slice(locator);
        buf.put_slice(data);

        Ok(buf.freeze())
    }

    /// Decode the entry starting at `offset` of a seekable stream.
    ///
    /// `Ok(None)` when `offset` is exactly at end-of-file. A record whose
    /// prefixes or payloads are cut short is reported as corruption.
    pub fn decode_at<R: Read + Seek>(reader: &mut R, offset: u64) -> Result<Option<Self>> {
        let end = reader.seek(SeekFrom::End(0))?;

        let header = match EntryHeader::read_at(reader, offset)? {
            Some(header) => header,
            None => return Ok(None),
        };

        // Check before allocating: a damaged prefix may claim gigabytes
        if offset + header.span() > end {
            return Err(ArchiveError::corruption(
                offset,
                format!(
                    "entry of {} bytes runs past end of file at {}",
                    header.span(),
                    end
                ),
            ));
        }

        let locator = read_payload(reader, header.locator_len as usize, offset)?;
        let data = read_payload(reader, header.data_len as usize, offset)?;

        Ok(Some(Self { locator, data }))
    }

    /// Decode one entry from the front of an in-memory buffer.
    ///
    /// Returns the entry and the number of bytes it occupied, or `None` for
    /// an empty buffer.
    pub fn decode(bytes: &[u8]) -> Result<Option<(Self, usize)>> {
        if bytes.is_empty() {
            return Ok(None);
        }

        let mut buf = bytes;
        if buf.remaining() < ENTRY_PREFIX_SIZE as usize {
            return Err(ArchiveError::corruption(0, "length prefix cut short"));
        }

        let locator_len = buf.get_u16_le() as usize;
        let data_len = buf.get_u32_le() as usize;

        if buf.remaining() < locator_len + data_len {
            return Err(ArchiveError::corruption(
                0,
                format!(
                    "expected {} payload bytes, got {}",
                    locator_len + data_len,
                    buf.remaining()
                ),
            ));
        }

        let locator = buf[..locator_len].to_vec();
        buf.advance(locator_len);
        let data = buf[..data_len].to_vec();

        let consumed = ENTRY_PREFIX_SIZE as usize + locator_len + data_len;
        Ok(Some((Self { locator, data }, consumed)))
    }
}

// =============================================================================
// Private Helpers
// =============================================================================

/// Read until `buf` is full or the stream ends. Returns bytes read.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

pub(crate) fn read_payload<R: Read>(reader: &mut R, len: usize, offset: u64) -> Result<Vec<u8>> {
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => {
            ArchiveError::corruption(offset, "payload runs past end of file")
        }
        _ => ArchiveError::Io(e),
    })?;
    Ok(payload)
}
