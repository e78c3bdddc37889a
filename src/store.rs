//! Positioned reads and writes against the archive file
//!
//! Every method opens the archive afresh and closes it on return. Nothing is
//! cached between calls, so each read observes what is on disk right now.

use crate::archive::{ArchiveHeader, FileMetaRecord, Layout, TableEntry, HEADER_SIZE};
use crate::error::{DumpFsError, Result};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Header store and entry table over one archive file
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Location of the archive file
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Truncate or create the archive and write `header` at offset 0
    pub fn create(&self, header: &ArchiveHeader) -> Result<()> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        let mut writer = BufWriter::new(file);
        header.write_to(&mut writer)?;
        writer.flush()?;

        debug!(archive = %self.path.display(), layout = header.layout.as_str(), "created archive");
        Ok(())
    }

    pub fn read_header(&self) -> Result<ArchiveHeader> {
        let file = File::open(&self.path)?;
        let header = ArchiveHeader::read_from(BufReader::new(file))?;

        debug!(
            entry_count = header.entry_count,
            data_end_offset = header.data_end_offset,
            cwd = %header.current_directory,
            "read header"
        );
        Ok(header)
    }

    /// Overwrite the header record, leaving the rest of the file untouched
    pub fn write_header(&self, header: &ArchiveHeader) -> Result<()> {
        let mut file = self.open_rw()?;
        file.seek(SeekFrom::Start(0))?;

        let mut buf = Vec::with_capacity(HEADER_SIZE);
        header.write_to(&mut buf)?;
        file.write_all(&buf)?;
        file.flush()?;

        debug!(
            entry_count = header.entry_count,
            data_end_offset = header.data_end_offset,
            cwd = %header.current_directory,
            "wrote header"
        );
        Ok(())
    }

    /// Read all `entry_count` entries in table order
    pub fn read_table(&self, header: &ArchiveHeader) -> Result<Vec<TableEntry>> {
        let file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();
        let table_end = header.next_entry_position();
        if table_end > file_len {
            return Err(DumpFsError::InvalidFormat(format!(
                "Entry table ends at {} but archive is only {} bytes",
                table_end, file_len
            )));
        }

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(header.table_offset as u64))?;

        let mut entries = Vec::with_capacity(header.entry_count as usize);
        for _ in 0..header.entry_count {
            entries.push(TableEntry::read_from(&mut reader, header.layout)?);
        }

        debug!(count = entries.len(), "read entry table");
        Ok(entries)
    }

    /// Write `entry` into the slot after the last entry `header` knows about
    ///
    /// The caller bumps `entry_count` and writes the header afterwards.
    pub fn append_entry(&self, header: &ArchiveHeader, entry: &TableEntry) -> Result<()> {
        let capacity = header.table_capacity();
        if header.entry_count >= capacity {
            return Err(DumpFsError::TableFull { capacity });
        }

        let position = header.next_entry_position();
        let mut buf = Vec::with_capacity(header.layout.entry_size());
        entry.write_to(&mut buf, header.layout)?;

        let mut file = self.open_rw()?;
        file.seek(SeekFrom::Start(position))?;
        file.write_all(&buf)?;
        file.flush()?;

        debug!(position, name = %entry.name, path = %entry.path, "appended table entry");
        Ok(())
    }

    /// Write a meta record followed by its payload at `offset`
    ///
    /// Returns the number of bytes written.
    pub fn write_data(
        &self,
        offset: u32,
        meta: &FileMetaRecord,
        payload: &[u8],
        layout: Layout,
    ) -> Result<u64> {
        let mut file = self.open_rw()?;
        file.seek(SeekFrom::Start(offset as u64))?;

        let mut writer = BufWriter::new(file);
        let meta_len = meta.write_to(&mut writer, layout)?;
        writer.write_all(payload)?;
        writer.flush()?;

        let written = meta_len as u64 + payload.len() as u64;
        debug!(offset, written, name = %meta.name, "wrote file data");
        Ok(written)
    }

    /// Read the meta record at `offset` and the payload that follows it
    pub fn read_data(&self, offset: u32, layout: Layout) -> Result<(FileMetaRecord, Vec<u8>)> {
        let file = File::open(&self.path)?;
        let file_len = file.metadata()?.len();

        let mut reader = BufReader::new(file);
        reader.seek(SeekFrom::Start(offset as u64))?;
        let meta = FileMetaRecord::read_from(&mut reader, layout)?;

        let payload_end = offset as u64 + layout.meta_size() as u64 + meta.byte_length as u64;
        if payload_end > file_len {
            return Err(DumpFsError::InvalidFormat(format!(
                "Payload of '{}' ends at {} but archive is only {} bytes",
                meta.name, payload_end, file_len
            )));
        }

        let mut payload = vec![0u8; meta.byte_length as usize];
        reader.read_exact(&mut payload)?;

        debug!(offset, len = payload.len(), name = %meta.name, "read file data");
        Ok((meta, payload))
    }

    fn open_rw(&self) -> Result<File> {
        Ok(OpenOptions::new().read(true).write(true).open(&self.path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn new_store(dir: &TempDir, layout: Layout) -> (ArchiveStore, ArchiveHeader) {
        let store = ArchiveStore::new(dir.path().join("archive"));
        let header = ArchiveHeader::new(layout, 1000);
        store.create(&header).unwrap();
        (store, header)
    }

    #[test]
    fn test_header_write_then_read() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (store, mut header) = new_store(&dir, Layout::Hierarchical);

        header.current_directory = "/docs".to_string();
        store.write_header(&header)?;

        assert_eq!(store.read_header()?, header);
        Ok(())
    }

    #[test]
    fn test_missing_archive_is_io_error() {
        let store = ArchiveStore::new("/nonexistent/dir/archive");
        assert!(matches!(store.read_header(), Err(DumpFsError::Io(_))));
    }

    #[test]
    fn test_append_uses_header_count() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (store, mut header) = new_store(&dir, Layout::Hierarchical);

        store.append_entry(&header, &TableEntry::root())?;
        header.entry_count += 1;
        store.append_entry(&header, &TableEntry::directory("docs", "/docs"))?;
        header.entry_count += 1;
        store.write_header(&header)?;

        let table = store.read_table(&store.read_header()?)?;
        assert_eq!(table.len(), 2);
        assert_eq!(table[0], TableEntry::root());
        assert_eq!(table[1].path, "/docs");
        Ok(())
    }

    #[test]
    fn test_append_past_data_region_fails() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (store, mut header) = new_store(&dir, Layout::Hierarchical);
        header.entry_count = header.table_capacity();

        let result = store.append_entry(&header, &TableEntry::directory("x", "/x"));
        assert!(matches!(result, Err(DumpFsError::TableFull { capacity: 7 })));
        Ok(())
    }

    #[test]
    fn test_data_roundtrip() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (store, header) = new_store(&dir, Layout::Hierarchical);

        let meta = FileMetaRecord::new(5, "notes.txt", "/");
        let written = store.write_data(header.data_end_offset, &meta, b"hello", header.layout)?;
        assert_eq!(written, 124 + 5);

        let (read_meta, payload) = store.read_data(header.data_end_offset, header.layout)?;
        assert_eq!(read_meta, meta);
        assert_eq!(payload, b"hello");
        Ok(())
    }

    #[test]
    fn test_payload_past_end_of_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let (store, header) = new_store(&dir, Layout::Flat);

        let meta = FileMetaRecord::new(500, "short.bin", "/");
        store.write_data(header.data_end_offset, &meta, b"only a few bytes", header.layout)?;

        let result = store.read_data(header.data_end_offset, header.layout);
        assert!(matches!(result, Err(DumpFsError::InvalidFormat(_))));
        Ok(())
    }
}
