//! dumpfs: a directory tree stored inside a single host file
//!
//! The archive is one flat file with three regions:
//! - a 100-byte header at offset 0 (entry count, data end offset, current directory)
//! - an append-only entry table shared by files and directories
//! - a data region of meta record + payload blocks, appended in write order
//!
//! Nothing is ever deleted or moved. Every operation reopens the file and
//! re-reads the header, so no state is cached between calls.
//!
//! # Example
//!
//! ```no_run
//! use dumpfs::{ArchiveFs, DirectorySink};
//!
//! let fs = ArchiveFs::open("mydump")?;
//! fs.initialize()?;
//! fs.create_directory("docs")?;
//! fs.change_directory("docs")?;
//! fs.write_bytes("notes.txt", b"hello")?;
//!
//! let mut sink = DirectorySink::new(".", "tmp_");
//! let extracted = fs.read_file("notes.txt", &mut sink)?;
//! println!("extracted to {}", extracted.display());
//! println!("{}", fs.list_directory()?);
//! # Ok::<(), dumpfs::DumpFsError>(())
//! ```

pub mod archive;
pub mod config;
pub mod error;
pub mod extract;
pub mod fs;
pub mod listing;
pub mod path;
pub mod store;

pub use archive::{
    ArchiveHeader, EntryKind, FileMetaRecord, Layout, TableEntry, HEADER_SIZE, MAX_CWD_LENGTH,
    MAX_NAME_LENGTH, MAX_PATH_LENGTH, TABLE_OFFSET,
};
pub use config::ArchiveConfig;
pub use error::{DumpFsError, Result};
pub use extract::{DirectorySink, ExtractSink, MemorySink};
pub use fs::ArchiveFs;
pub use listing::Listing;
pub use store::ArchiveStore;
