//! Codec Tests
//!
//! Tests for entry encoding and decoding.

use std::io::Cursor;

use archivekv::entry::{Entry, EntryHeader, ENTRY_PREFIX_SIZE, MAX_LOCATOR_LEN};
use archivekv::ArchiveError;

// =============================================================================
// Encoding Tests
// =============================================================================

#[test]
fn test_encode_layout() {
    let encoded = Entry::encode_parts(b"ab", b"xyz").unwrap();

    assert_eq!(
        encoded.as_ref(),
        &[
            2, 0, // locator_len u16 LE
            3, 0, 0, 0, // data_len u32 LE
            b'a', b'b', // locator
            b'x', b'y', b'z', // data
        ]
    );
}

#[test]
fn test_encode_empty_locator_and_data() {
    let encoded = Entry::encode_parts(b"", b"").unwrap();

    assert_eq!(encoded.len() as u64, ENTRY_PREFIX_SIZE);
    assert!(encoded.iter().all(|&b| b == 0));
}

#[test]
fn test_encoded_len_matches_encoding() {
    let entry = Entry::new(b"locator".to_vec(), vec![7u8; 300]);

    assert_eq!(entry.encoded_len(), entry.encode().unwrap().len() as u64);
    assert_eq!(entry.header().unwrap().span(), entry.encoded_len());
}

#[test]
fn test_encode_max_locator_accepted() {
    let locator = vec![b'k'; MAX_LOCATOR_LEN];
    let encoded = Entry::encode_parts(&locator, b"v").unwrap();

    assert_eq!(&encoded[0..2], &u16::MAX.to_le_bytes());
}

#[test]
fn test_encode_locator_too_long_rejected() {
    let locator = vec![b'k'; MAX_LOCATOR_LEN + 1];
    let result = Entry::encode_parts(&locator, b"v");

    match result {
        Err(ArchiveError::LocatorTooLong { len }) => assert_eq!(len, MAX_LOCATOR_LEN + 1),
        other => panic!("Expected LocatorTooLong, got {:?}", other),
    }
}

#[test]
fn test_header_bytes_round_trip() {
    let header = EntryHeader::for_parts(513, 70_000).unwrap();
    let bytes = header.to_bytes();

    assert_eq!(EntryHeader::from_bytes(bytes), header);
    assert_eq!(header.span(), ENTRY_PREFIX_SIZE + 513 + 70_000);
}

// =============================================================================
// Stream Decoding Tests
// =============================================================================

fn stream_with(entries: &[(&[u8], &[u8])]) -> (Cursor<Vec<u8>>, Vec<u64>) {
    let mut bytes = vec![0u8; 4];
    let mut offsets = Vec::new();
    for (locator, data) in entries {
        offsets.push(bytes.len() as u64);
        bytes.extend_from_slice(&Entry::encode_parts(locator, data).unwrap());
    }
    (Cursor::new(bytes), offsets)
}

#[test]
fn test_decode_at_offsets() {
    let (mut stream, offsets) = stream_with(&[(b"first", b"1"), (b"second", b"22")]);

    let first = Entry::decode_at(&mut stream, offsets[0]).unwrap().unwrap();
    let second = Entry::decode_at(&mut stream, offsets[1]).unwrap().unwrap();

    assert_eq!(first, Entry::new(b"first".to_vec(), b"1".to_vec()));
    assert_eq!(second, Entry::new(b"second".to_vec(), b"22".to_vec()));
}

#[test]
fn test_decode_at_end_of_stream_is_none() {
    let (mut stream, _) = stream_with(&[(b"only", b"entry")]);
    let end = stream.get_ref().len() as u64;

    assert!(Entry::decode_at(&mut stream, end).unwrap().is_none());
}

#[test]
fn test_decode_at_partial_prefix_is_corruption() {
    let (stream, _) = stream_with(&[(b"a", b"b")]);
    let mut bytes = stream.into_inner();
    bytes.extend_from_slice(&[1, 0, 0]); // half a prefix
    let offset = bytes.len() as u64 - 3;
    let mut stream = Cursor::new(bytes);

    let result = Entry::decode_at(&mut stream, offset);
    assert!(matches!(result, Err(ArchiveError::Corruption { offset: o, .. }) if o == offset));
}

#[test]
fn test_decode_at_payload_past_end_is_corruption() {
    let (stream, offsets) = stream_with(&[(b"key", b"value")]);
    let mut bytes = stream.into_inner();
    bytes.truncate(bytes.len() - 2);
    let mut stream = Cursor::new(bytes);

    let result = Entry::decode_at(&mut stream, offsets[0]);
    assert!(matches!(result, Err(ArchiveError::Corruption { .. })));
}

#[test]
fn test_header_read_at_end_is_none() {
    let (mut stream, _) = stream_with(&[]);

    assert!(EntryHeader::read_at(&mut stream, 4).unwrap().is_none());
}

// =============================================================================
// Buffer Decoding Tests
// =============================================================================

#[test]
fn test_decode_buffer_reports_consumed() {
    let mut buffer = Entry::encode_parts(b"k1", b"v1").unwrap().to_vec();
    buffer.extend_from_slice(&Entry::encode_parts(b"k2", b"value2").unwrap());

    let (first, used) = Entry::decode(&buffer).unwrap().unwrap();
    assert_eq!(first.locator, b"k1");
    assert_eq!(used, 10);

    let (second, used2) = Entry::decode(&buffer[used..]).unwrap().unwrap();
    assert_eq!(second.data, b"value2");
    assert_eq!(used + used2, buffer.len());
}

#[test]
fn test_decode_empty_buffer_is_none() {
    assert!(Entry::decode(&[]).unwrap().is_none());
}

#[test]
fn test_decode_truncated_buffer_is_corruption() {
    let buffer = Entry::encode_parts(b"key", b"value").unwrap();

    assert!(Entry::decode(&buffer[..4]).is_err());
    assert!(Entry::decode(&buffer[..buffer.len() - 1]).is_err());
}
