//! Archive operations
//!
//! Each operation reads the header once, works against the entry table and
//! data region, and writes the header back if anything changed. A failure
//! part way through leaves earlier writes on disk; nothing is rolled back.

use crate::archive::{
    check_name, check_path, ArchiveHeader, FileMetaRecord, TableEntry, MAX_CWD_LENGTH,
};
use crate::config::ArchiveConfig;
use crate::error::{DumpFsError, Result};
use crate::extract::ExtractSink;
use crate::listing::Listing;
use crate::path::{is_direct_child, leaf_name, normalize, source_leaf_name};
use crate::store::ArchiveStore;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// A directory tree stored in one host file
pub struct ArchiveFs {
    store: ArchiveStore,
    config: ArchiveConfig,
}

impl ArchiveFs {
    /// Bind to the archive named by `config`; touches nothing on disk
    pub fn new(config: ArchiveConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store: ArchiveStore::new(&config.archive),
            config,
        })
    }

    /// Bind to the archive at `path` with default settings
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::new(ArchiveConfig::for_archive(path))
    }

    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// Initialize the archive if its file does not exist yet
    ///
    /// Returns true if an archive was created.
    pub fn ensure_initialized(&self) -> Result<bool> {
        if self.store.exists() {
            return Ok(false);
        }
        self.initialize()?;
        Ok(true)
    }

    /// Reset the archive to an empty root-only tree
    pub fn initialize(&self) -> Result<()> {
        let mut header = ArchiveHeader::new(self.config.layout, self.config.data_offset);
        self.store.create(&header)?;

        self.store.append_entry(&header, &TableEntry::root())?;
        header.entry_count = 1;
        self.store.write_header(&header)?;

        info!(
            archive = %self.store.path().display(),
            layout = header.layout.as_str(),
            capacity = header.table_capacity(),
            "initialized archive"
        );
        Ok(())
    }

    /// Current header as stored on disk
    pub fn header(&self) -> Result<ArchiveHeader> {
        self.store.read_header()
    }

    /// Every table entry in insertion order
    pub fn entries(&self) -> Result<Vec<TableEntry>> {
        let header = self.store.read_header()?;
        self.store.read_table(&header)
    }

    /// Create a directory, returning its resolved path
    pub fn create_directory(&self, name: &str) -> Result<String> {
        let mut header = self.store.read_header()?;
        if !header.layout.supports_directories() {
            return Err(DumpFsError::Unsupported(header.layout.as_str()));
        }

        let full_path = normalize(name, &header.current_directory);
        let table = self.store.read_table(&header)?;
        if find_directory(&table, &full_path).is_some() {
            return Err(DumpFsError::AlreadyExists(full_path));
        }

        let leaf = leaf_name(&full_path);
        if leaf.is_empty() {
            return Err(DumpFsError::InvalidPath(full_path));
        }
        check_name(leaf)?;
        // Every directory must stay reachable through the header's cwd field
        check_path(&full_path, MAX_CWD_LENGTH)?;

        let entry = TableEntry::directory(leaf, full_path.as_str());
        self.store.append_entry(&header, &entry)?;
        header.entry_count += 1;
        self.store.write_header(&header)?;

        info!(path = %full_path, "created directory");
        Ok(full_path)
    }

    /// Make `path` the current directory, returning its resolved form
    pub fn change_directory(&self, path: &str) -> Result<String> {
        let mut header = self.store.read_header()?;
        if !header.layout.supports_directories() {
            return Err(DumpFsError::Unsupported(header.layout.as_str()));
        }

        let target = normalize(path, &header.current_directory);
        let table = self.store.read_table(&header)?;
        if find_directory(&table, &target).is_none() {
            return Err(DumpFsError::NotFound(target));
        }
        check_path(&target, MAX_CWD_LENGTH)?;

        header.current_directory = target.clone();
        self.store.write_header(&header)?;

        info!(cwd = %target, "changed directory");
        Ok(target)
    }

    /// Store a host file in the current directory under its leaf name
    pub fn write_file<P: AsRef<Path>>(&self, source: P) -> Result<TableEntry> {
        let source = source.as_ref();
        let source_str = source.to_string_lossy();
        let name = source_leaf_name(&source_str);
        check_name(name)?;

        let data = std::fs::read(source)?;
        self.write_bytes(name, &data)
    }

    /// Store `data` in the current directory as `name`
    pub fn write_bytes(&self, name: &str, data: &[u8]) -> Result<TableEntry> {
        if name.is_empty() {
            return Err(DumpFsError::InvalidPath(name.to_string()));
        }
        check_name(name)?;

        let mut header = self.store.read_header()?;
        let layout = header.layout;
        let offset = header.data_end_offset;

        let byte_length =
            u32::try_from(data.len()).map_err(|_| DumpFsError::ArchiveFull(u32::MAX as u64))?;
        let data_end = offset as u64 + layout.meta_size() as u64 + data.len() as u64;
        if data_end > u32::MAX as u64 {
            return Err(DumpFsError::ArchiveFull(u32::MAX as u64));
        }

        let directory = header.current_directory.clone();
        let entry = TableEntry::file(name, directory.as_str(), offset);
        self.store.append_entry(&header, &entry)?;

        let meta = FileMetaRecord::new(byte_length, name, directory.as_str());
        self.store.write_data(offset, &meta, data, layout)?;

        header.entry_count += 1;
        header.data_end_offset = data_end as u32;
        self.store.write_header(&header)?;

        info!(directory = %directory, name, len = data.len(), offset, "wrote file");
        Ok(entry)
    }

    /// Read `name` from the current directory into `sink`
    ///
    /// Returns wherever the sink put it.
    pub fn read_file<S: ExtractSink + ?Sized>(&self, name: &str, sink: &mut S) -> Result<PathBuf> {
        let (meta, payload) = self.load(name)?;
        sink.extract(&meta.name, &payload)
    }

    /// Contents of `name` in the current directory
    pub fn read_bytes(&self, name: &str) -> Result<Vec<u8>> {
        let (_, payload) = self.load(name)?;
        Ok(payload)
    }

    /// Subdirectories and files of the current directory
    pub fn list_directory(&self) -> Result<Listing> {
        let header = self.store.read_header()?;
        let table = self.store.read_table(&header)?;
        let cwd = header.current_directory;

        let directories = table
            .iter()
            .filter(|e| e.is_directory() && is_direct_child(&e.path, &cwd))
            .map(|e| e.name.clone())
            .collect();

        let files = table
            .iter()
            .filter(|e| e.is_file() && e.path == cwd)
            .map(|e| e.name.clone())
            .collect();

        Ok(Listing {
            directory: cwd,
            directories,
            files,
        })
    }

    /// Current directory as recorded in the header
    pub fn working_directory(&self) -> Result<String> {
        Ok(self.store.read_header()?.current_directory)
    }

    fn load(&self, name: &str) -> Result<(FileMetaRecord, Vec<u8>)> {
        let header = self.store.read_header()?;
        let table = self.store.read_table(&header)?;
        let cwd = &header.current_directory;

        // First match wins; later copies of the same name are never read
        let entry = table
            .iter()
            .find(|e| e.is_file() && e.name == name && &e.path == cwd)
            .ok_or_else(|| DumpFsError::NotFound(normalize(name, cwd)))?;
        debug!(name, offset = entry.data_offset, "found file entry");

        self.store.read_data(entry.data_offset, header.layout)
    }
}

fn find_directory<'a>(table: &'a [TableEntry], path: &str) -> Option<&'a TableEntry> {
    table.iter().find(|e| e.is_directory() && e.path == path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archive::Layout;
    use crate::extract::MemorySink;
    use tempfile::TempDir;

    fn new_fs(dir: &TempDir) -> ArchiveFs {
        let fs = ArchiveFs::open(dir.path().join("mydump")).unwrap();
        fs.initialize().unwrap();
        fs
    }

    #[test]
    fn test_initialize_writes_root() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);

        let header = fs.header()?;
        assert_eq!(header.table_offset, 100);
        assert_eq!(header.entry_count, 1);
        assert_eq!(header.data_end_offset, 1000);
        assert_eq!(header.current_directory, "/");
        assert_eq!(fs.entries()?, vec![TableEntry::root()]);
        Ok(())
    }

    #[test]
    fn test_ensure_initialized_only_once() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = ArchiveFs::open(dir.path().join("mydump"))?;

        assert!(fs.ensure_initialized()?);
        fs.write_bytes("keep.txt", b"kept")?;
        assert!(!fs.ensure_initialized()?);
        assert_eq!(fs.read_bytes("keep.txt")?, b"kept");
        Ok(())
    }

    #[test]
    fn test_mkdir_without_parent() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);

        assert_eq!(fs.create_directory("/a/b")?, "/a/b");
        assert_eq!(fs.header()?.entry_count, 2);
        assert_eq!(fs.change_directory("/a/b")?, "/a/b");

        // The missing parent can still be created afterwards
        assert_eq!(fs.create_directory("/a")?, "/a");
        Ok(())
    }

    #[test]
    fn test_mkdir_path_bounded_by_cwd_field() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);

        // Three 20-byte segments then one of 17: 77 bytes, leaves within bounds
        let segment = format!("/{}", "d".repeat(19));
        let too_long = format!("{}/{}", segment.repeat(3), "e".repeat(16));
        assert_eq!(too_long.len(), MAX_CWD_LENGTH + 1);
        assert!(matches!(
            fs.create_directory(&too_long),
            Err(DumpFsError::PathTooLong { len: 77, max: 76, .. })
        ));
        assert_eq!(fs.header()?.entry_count, 1);
        Ok(())
    }

    #[test]
    fn test_mkdir_rejects_bad_names() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);

        assert!(matches!(fs.create_directory("/"), Err(DumpFsError::AlreadyExists(_))));
        assert!(matches!(fs.create_directory("docs/"), Err(DumpFsError::InvalidPath(_))));
        assert!(matches!(
            fs.create_directory(&"d".repeat(21)),
            Err(DumpFsError::NameTooLong { .. })
        ));
        assert_eq!(fs.header()?.entry_count, 1);
        Ok(())
    }

    #[test]
    fn test_cd_absolute_and_back_to_root() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);

        fs.create_directory("docs")?;
        fs.create_directory("docs/old")?;
        assert_eq!(fs.change_directory("/docs/old")?, "/docs/old");
        assert_eq!(fs.change_directory("/")?, "/");
        assert!(matches!(fs.change_directory("nope"), Err(DumpFsError::NotFound(_))));
        assert_eq!(fs.working_directory()?, "/");
        Ok(())
    }

    #[test]
    fn test_rewrite_reads_first_and_lists_every_copy() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);

        fs.write_bytes("a.txt", b"first")?;
        fs.write_bytes("b.txt", b"other")?;
        fs.write_bytes("a.txt", b"second")?;

        assert_eq!(fs.read_bytes("a.txt")?, b"first");
        assert_eq!(fs.list_directory()?.files, vec!["a.txt", "b.txt", "a.txt"]);
        assert_eq!(fs.header()?.entry_count, 4);
        Ok(())
    }

    #[test]
    fn test_read_file_uses_stored_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let fs = new_fs(&dir);
        fs.write_bytes("data.bin", &[1, 2, 3])?;

        let mut sink = MemorySink::new();
        let location = fs.read_file("data.bin", &mut sink)?;
        assert_eq!(location, PathBuf::from("data.bin"));
        assert_eq!(sink.get("data.bin"), Some(&[1u8, 2, 3][..]));
        Ok(())
    }

    #[test]
    fn test_flat_layout_rejects_directories() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let config =
            ArchiveConfig::for_archive(dir.path().join("flat")).with_layout(Layout::Flat);
        let fs = ArchiveFs::new(config)?;
        fs.initialize()?;

        assert!(matches!(fs.create_directory("docs"), Err(DumpFsError::Unsupported("flat"))));
        assert!(matches!(fs.change_directory("/"), Err(DumpFsError::Unsupported(_))));

        fs.write_bytes("one.txt", b"1")?;
        assert_eq!(fs.read_bytes("one.txt")?, b"1");
        Ok(())
    }
}
