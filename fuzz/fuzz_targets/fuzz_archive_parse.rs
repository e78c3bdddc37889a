#![no_main]

use dumpfs::{ArchiveFs, MemorySink};
use libfuzzer_sys::fuzz_target;
use std::io::Write;
use tempfile::NamedTempFile;

fuzz_target!(|data: &[u8]| {
    // Skip inputs shorter than the header
    if data.len() < 100 {
        return;
    }

    let mut temp_file = match NamedTempFile::new() {
        Ok(f) => f,
        Err(_) => return,
    };
    if temp_file.write_all(data).is_err() || temp_file.flush().is_err() {
        return;
    }

    let fs = match ArchiveFs::open(temp_file.path()) {
        Ok(fs) => fs,
        Err(_) => return,
    };

    // Header and table parsing should never panic
    let entries = match fs.entries() {
        Ok(entries) => entries,
        Err(_) => return, // Expected for invalid data
    };
    let _ = fs.working_directory();
    let _ = fs.list_directory();

    // Neither should following the stored offsets
    let mut sink = MemorySink::new();
    for entry in entries.iter().filter(|e| e.is_file()) {
        let _ = fs.read_file(&entry.name, &mut sink);
    }
});
