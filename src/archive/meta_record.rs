use crate::archive::format::{
    read_text, read_u32, write_text, Layout, MAX_NAME_LENGTH, MAX_PATH_LENGTH, ROOT_PATH,
};
use crate::error::Result;
use std::io::{Read, Write};

/// File Meta Record
///
/// Precedes each file's payload in the data region so a stored blob describes
/// itself without consulting the entry table.
///
/// Structure (hierarchical, 124 bytes):
/// - Byte Length: uint32 (4 bytes)
/// - Name: NUL-padded UTF-8 (20 bytes)
/// - Path: NUL-padded UTF-8 (100 bytes)
///
/// The flat layout omits the path (24 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetaRecord {
    pub byte_length: u32,
    pub name: String,
    pub path: String,
}

impl FileMetaRecord {
    pub fn new(byte_length: u32, name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            byte_length,
            name: name.into(),
            path: path.into(),
        }
    }

    /// Write meta record, returning the number of bytes written
    pub fn write_to<W: Write>(&self, mut writer: W, layout: Layout) -> Result<usize> {
        writer.write_all(&self.byte_length.to_le_bytes())?;
        write_text(&mut writer, &self.name, MAX_NAME_LENGTH)?;
        if layout == Layout::Hierarchical {
            write_text(&mut writer, &self.path, MAX_PATH_LENGTH)?;
        }
        Ok(layout.meta_size())
    }

    /// Read meta record
    pub fn read_from<R: Read>(mut reader: R, layout: Layout) -> Result<Self> {
        let byte_length = read_u32(&mut reader)?;
        let name = read_text(&mut reader, MAX_NAME_LENGTH)?;
        let path = match layout {
            Layout::Hierarchical => read_text(&mut reader, MAX_PATH_LENGTH)?,
            Layout::Flat => ROOT_PATH.to_string(),
        };

        Ok(Self {
            byte_length,
            name,
            path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_record_roundtrip() {
        let meta = FileMetaRecord::new(5, "notes.txt", "/docs");

        let mut buf = Vec::new();
        let written = meta.write_to(&mut buf, Layout::Hierarchical).unwrap();
        assert_eq!(written, buf.len());
        assert_eq!(written, Layout::Hierarchical.meta_size());

        let parsed = FileMetaRecord::read_from(&buf[..], Layout::Hierarchical).unwrap();
        assert_eq!(parsed, meta);
    }

    #[test]
    fn test_flat_meta_record() {
        let meta = FileMetaRecord::new(42, "a.bin", ROOT_PATH);

        let mut buf = Vec::new();
        let written = meta.write_to(&mut buf, Layout::Flat).unwrap();
        assert_eq!(written, 24);

        let parsed = FileMetaRecord::read_from(&buf[..], Layout::Flat).unwrap();
        assert_eq!(parsed.byte_length, 42);
        assert_eq!(parsed.name, "a.bin");
    }

    #[test]
    fn test_truncated_meta_record() {
        let result = FileMetaRecord::read_from(&[1u8, 0, 0][..], Layout::Flat);
        assert!(result.is_err());
    }
}
