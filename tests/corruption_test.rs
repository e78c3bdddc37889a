//! Tests for detecting and handling damaged archive files

use dumpfs::{ArchiveFs, DumpFsError, TableEntry, HEADER_SIZE};
use std::fs::OpenOptions;
use std::io::{Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::TempDir;

/// Helper: Archive with one directory and one file in the root
fn create_test_archive(dir: &TempDir) -> ArchiveFs {
    let fs = ArchiveFs::open(dir.path().join("mydump")).unwrap();
    fs.initialize().unwrap();
    fs.create_directory("docs").unwrap();
    fs.write_bytes("test.txt", b"Hello, World!").unwrap();
    fs
}

/// Helper: Overwrite bytes at a specific offset
fn corrupt_bytes_at(path: &Path, offset: u64, bytes: &[u8]) {
    let mut file = OpenOptions::new().write(true).open(path).unwrap();
    file.seek(SeekFrom::Start(offset)).unwrap();
    file.write_all(bytes).unwrap();
}

/// Helper: Truncate file at specific offset
fn truncate_at(path: &Path, new_length: u64) {
    let file = OpenOptions::new().write(true).open(path).unwrap();
    file.set_len(new_length).unwrap();
}

#[test]
fn test_corrupted_magic_number() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    corrupt_bytes_at(fs.store().path(), 0, b"XXXX");

    match fs.list_directory() {
        Err(DumpFsError::InvalidFormat(msg)) => assert!(msg.contains("magic")),
        other => panic!("Expected InvalidFormat, got: {:?}", other),
    }
}

#[test]
fn test_unknown_layout_byte() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    corrupt_bytes_at(fs.store().path(), 4, &[9]);

    assert!(matches!(fs.header(), Err(DumpFsError::InvalidFormat(_))));
}

#[test]
fn test_entry_count_overlapping_data_region() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    // entry_count lives at offset 12
    corrupt_bytes_at(fs.store().path(), 12, &1000u32.to_le_bytes());

    assert!(matches!(fs.entries(), Err(DumpFsError::InvalidFormat(_))));
}

#[test]
fn test_truncated_header() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    truncate_at(fs.store().path(), HEADER_SIZE as u64 / 2);

    assert!(matches!(fs.working_directory(), Err(DumpFsError::Io(_))));
}

#[test]
fn test_truncated_table() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    // Header plus the root entry only
    truncate_at(fs.store().path(), HEADER_SIZE as u64 + 128);

    assert!(matches!(fs.list_directory(), Err(DumpFsError::InvalidFormat(_))));
}

#[test]
fn test_truncated_payload() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    let file_entry: TableEntry = fs
        .entries()
        .unwrap()
        .into_iter()
        .find(|e| e.is_file())
        .unwrap();

    // Keep the meta record but cut the payload short
    truncate_at(fs.store().path(), file_entry.data_offset as u64 + 124 + 4);

    assert!(matches!(fs.read_bytes("test.txt"), Err(DumpFsError::InvalidFormat(_))));
    // The table is still intact
    assert_eq!(fs.list_directory().unwrap().files, vec!["test.txt"]);
}

#[test]
fn test_non_utf8_name_in_table() {
    let dir = TempDir::new().unwrap();
    let fs = create_test_archive(&dir);
    // First byte of the second entry's name
    corrupt_bytes_at(fs.store().path(), HEADER_SIZE as u64 + 128, &[0xFF, 0xFE]);

    assert!(matches!(fs.entries(), Err(DumpFsError::InvalidFormat(_))));
}

#[test]
fn test_garbage_file_is_not_an_archive() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("garbage");
    std::fs::write(&path, vec![0xAB; 2048]).unwrap();

    let fs = ArchiveFs::open(&path).unwrap();
    assert!(!fs.ensure_initialized().unwrap());
    assert!(matches!(fs.working_directory(), Err(DumpFsError::InvalidFormat(_))));

    // initialize reclaims the file
    fs.initialize().unwrap();
    assert_eq!(fs.working_directory().unwrap(), "/");
}
