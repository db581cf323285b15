//! Tests for the Store write path
//!
//! These tests verify:
//! - put/get round trips
//! - Same-size overwrites stay in place
//! - Different-size overwrites relocate to the end of the file
//! - Delete truncates a tail entry and compacts a middle entry
//! - Header count tracks every mutation
//! - Capacity violations are rejected before any write
//!
//! Compaction-sensitive tests run against both compaction modes.

use archivekv::entry::{Entry, HEADER_SIZE, MAX_LOCATOR_LEN};
use archivekv::{ArchiveError, CompactionMode, Store, StoreConfig, SyncStrategy};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn setup_temp_store(mode: CompactionMode) -> (TempDir, Store) {
    let temp_dir = TempDir::new().unwrap();
    let config = StoreConfig::builder()
        .path(temp_dir.path().join("mutate.arc"))
        .compaction(mode)
        .build();
    let store = Store::open(config).unwrap();
    (temp_dir, store)
}

fn encoded_size(locator: &[u8], data: &[u8]) -> u64 {
    Entry::new(locator.to_vec(), data.to_vec()).encoded_len()
}

const MODES: [CompactionMode; 2] = [CompactionMode::InPlace, CompactionMode::Staged];

// =============================================================================
// Put Tests
// =============================================================================

#[test]
fn test_put_get_round_trip() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    let data: Vec<u8> = (0..=255u8).cycle().take(10_000).collect();
    store.put_raw(b"blob", &data).unwrap();

    assert_eq!(store.get_raw(b"blob").unwrap(), Some(data));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_put_max_locator_round_trip() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    let locator = vec![b'L'; MAX_LOCATOR_LEN];
    store.put_raw(&locator, b"edge").unwrap();

    assert_eq!(store.get_raw(&locator).unwrap(), Some(b"edge".to_vec()));
}

#[test]
fn test_put_grows_file_by_encoded_size() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    let before = store.file_size().unwrap();
    store.put_raw(b"key", b"value").unwrap();

    assert_eq!(store.file_size().unwrap(), before + encoded_size(b"key", b"value"));
}

#[test]
fn test_same_size_overwrite_is_positional() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    store.put_raw(b"a", &1u32.to_le_bytes()).unwrap();
    store.put_raw(b"b", b"neighbor").unwrap();
    let offset = store.locate_entry(b"a").unwrap();
    let size = store.file_size().unwrap();

    store.put_raw(b"a", &2u32.to_le_bytes()).unwrap();

    assert_eq!(store.locate_entry(b"a").unwrap(), offset);
    assert_eq!(store.file_size().unwrap(), size);
    assert_eq!(store.len(), 2);
    assert_eq!(store.get_raw(b"a").unwrap(), Some(2u32.to_le_bytes().to_vec()));
    assert_eq!(store.get_raw(b"b").unwrap(), Some(b"neighbor".to_vec()));
}

#[test]
fn test_different_size_overwrite_relocates() {
    for mode in MODES {
        let (_temp, mut store) = setup_temp_store(mode);

        store.put_raw(b"a", b"x").unwrap();
        store.put_raw(b"b", b"other").unwrap();
        let prior_end = store.file_size().unwrap();
        let old_offset = store.locate_entry(b"a").unwrap().unwrap();

        store.put_raw(b"a", b"longer-value").unwrap();

        let new_offset = store.locate_entry(b"a").unwrap().unwrap();
        assert_ne!(new_offset, old_offset);
        // "b" moved back by a's old size; a landed after it
        assert!(new_offset >= prior_end - encoded_size(b"a", b"x"));
        assert_eq!(store.locate_idx(1).unwrap(), Some(new_offset));

        assert_eq!(store.get_raw(b"a").unwrap(), Some(b"longer-value".to_vec()));
        assert_eq!(store.get_raw(b"b").unwrap(), Some(b"other".to_vec()));
        assert_eq!(store.len(), 2);
        assert!(store.verify().unwrap().is_consistent());
    }
}

#[test]
fn test_relocating_last_entry() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    store.put_raw(b"only", b"x").unwrap();
    let prior_end = store.file_size().unwrap();
    store.put_raw(b"only", b"xyz").unwrap();

    // Tail entry is truncated away then re-appended at its old offset
    assert_eq!(store.locate_entry(b"only").unwrap(), Some(HEADER_SIZE));
    assert_eq!(store.file_size().unwrap(), prior_end + 2);
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Delete Tests
// =============================================================================

#[test]
fn test_delete_removes_and_decrements() {
    for mode in MODES {
        let (_temp, mut store) = setup_temp_store(mode);

        store.put_raw(b"a", b"data").unwrap();
        let count = store.len();

        store.delete(b"a").unwrap();

        assert!(store.get_raw(b"a").unwrap().is_none());
        assert_eq!(store.len(), count - 1);
        assert_eq!(store.file_size().unwrap(), HEADER_SIZE);
    }
}

#[test]
fn test_compaction_preserves_siblings() {
    for mode in MODES {
        let (_temp, mut store) = setup_temp_store(mode);

        store.put_raw(b"a", b"first-value").unwrap();
        store.put_raw(b"b", b"second").unwrap();
        store.put_raw(b"c", b"third-value!").unwrap();
        let size = store.file_size().unwrap();

        store.delete(b"b").unwrap();

        assert_eq!(store.get_raw(b"a").unwrap(), Some(b"first-value".to_vec()));
        assert_eq!(store.get_raw(b"c").unwrap(), Some(b"third-value!".to_vec()));
        assert!(store.get_raw(b"b").unwrap().is_none());
        assert_eq!(
            store.file_size().unwrap(),
            size - encoded_size(b"b", b"second")
        );
        assert_eq!(store.len(), 2);
        assert!(store.verify().unwrap().is_consistent());
    }
}

#[test]
fn test_delete_first_of_many_shifts_all() {
    for mode in MODES {
        let (_temp, mut store) = setup_temp_store(mode);

        for i in 0..20u32 {
            let locator = format!("key{}", i);
            store.put_raw(locator.as_bytes(), &i.to_le_bytes()).unwrap();
        }

        store.delete(b"key0").unwrap();

        assert_eq!(store.len(), 19);
        for i in 1..20u32 {
            let locator = format!("key{}", i);
            assert_eq!(
                store.get_raw(locator.as_bytes()).unwrap(),
                Some(i.to_le_bytes().to_vec())
            );
        }
        assert_eq!(store.locate_entry(b"key1").unwrap(), Some(HEADER_SIZE));
    }
}

#[test]
fn test_tail_delete_truncates() {
    for mode in MODES {
        let (_temp, mut store) = setup_temp_store(mode);

        store.put_raw(b"a", b"d1").unwrap();
        store.put_raw(b"b", b"d2").unwrap();
        let b_offset = store.locate_entry(b"b").unwrap().unwrap();

        store.delete(b"b").unwrap();

        assert_eq!(store.file_size().unwrap(), b_offset);
        assert_eq!(store.get_raw(b"a").unwrap(), Some(b"d1".to_vec()));
    }
}

#[test]
fn test_delete_missing_locator_fails() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    store.put_raw(b"present", b"1").unwrap();
    let result = store.delete(b"absent");

    assert!(matches!(result, Err(ArchiveError::LocatorNotFound)));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_delete_then_reinsert() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);

    store.put_raw(b"k", b"v1").unwrap();
    store.delete(b"k").unwrap();
    store.put_raw(b"k", b"v2").unwrap();

    assert_eq!(store.get_raw(b"k").unwrap(), Some(b"v2".to_vec()));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_staged_compaction_leaves_no_staging_file() {
    let (temp, mut store) = setup_temp_store(CompactionMode::Staged);

    store.put_raw(b"a", b"1").unwrap();
    store.put_raw(b"b", b"2").unwrap();
    store.delete(b"a").unwrap();

    assert!(!temp.path().join("mutate.arc.compact").exists());
    assert_eq!(store.get_raw(b"b").unwrap(), Some(b"2".to_vec()));
}

#[test]
fn test_staged_and_in_place_compaction_agree_on_disk() {
    let mut files = Vec::new();

    for mode in MODES {
        let (temp, mut store) = setup_temp_store(mode);
        for i in 0..8u32 {
            let locator = format!("entry-{}", i);
            let data = vec![i as u8; 100 + i as usize * 37];
            store.put_raw(locator.as_bytes(), &data).unwrap();
        }

        store.delete(b"entry-3").unwrap();
        store.put_raw(b"entry-5", b"short").unwrap();
        store.close().unwrap();

        files.push(std::fs::read(temp.path().join("mutate.arc")).unwrap());
    }

    assert_eq!(files[0], files[1]);
    assert_eq!(u32::from_le_bytes(files[0][0..4].try_into().unwrap()), 7);
}

// =============================================================================
// Capacity Tests
// =============================================================================

#[test]
fn test_locator_too_long_rejected_before_write() {
    let (_temp, mut store) = setup_temp_store(CompactionMode::InPlace);
    store.put_raw(b"keep", b"me").unwrap();
    let size = store.file_size().unwrap();

    let locator = vec![b'x'; MAX_LOCATOR_LEN + 1];
    let result = store.put_raw(&locator, b"data");

    assert!(matches!(result, Err(ArchiveError::LocatorTooLong { .. })));
    assert_eq!(store.file_size().unwrap(), size);
    assert_eq!(store.len(), 1);
}

// =============================================================================
// Header Tracking Tests
// =============================================================================

#[test]
fn test_header_on_disk_tracks_mutations() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("count.arc");
    let config = StoreConfig::builder()
        .path(&path)
        .sync_strategy(SyncStrategy::EveryMutation)
        .build();
    let mut store = Store::open(config).unwrap();

    fn on_disk(path: &std::path::Path) -> u32 {
        let bytes = std::fs::read(path).unwrap();
        u32::from_le_bytes(bytes[0..4].try_into().unwrap())
    }

    store.put_raw(b"a", b"1").unwrap();
    store.put_raw(b"b", b"2").unwrap();
    assert_eq!(on_disk(&path), 2);

    store.put_raw(b"a", b"111").unwrap();
    assert_eq!(on_disk(&path), 2);

    store.delete(b"b").unwrap();
    assert_eq!(on_disk(&path), 1);
}
