mod entry;
mod format;
mod meta_record;

pub use entry::{EntryKind, TableEntry};
pub use format::{
    check_name, check_path, ArchiveHeader, Layout, DEFAULT_DATA_OFFSET, HEADER_SIZE,
    MAGIC_NUMBER, MAX_CWD_LENGTH, MAX_NAME_LENGTH, MAX_PATH_LENGTH, ROOT_PATH, TABLE_OFFSET,
};
pub use meta_record::FileMetaRecord;
