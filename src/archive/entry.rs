use crate::archive::format::{
    read_text, read_u32, write_text, Layout, MAX_NAME_LENGTH, MAX_PATH_LENGTH, ROOT_PATH,
};
use crate::error::{DumpFsError, Result};
use std::io::{Read, Write};

/// Kind of a table entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EntryKind {
    File = 0,
    Directory = 1,
}

impl EntryKind {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::File),
            1 => Ok(Self::Directory),
            _ => Err(DumpFsError::InvalidFormat(format!(
                "Unknown entry kind: {}",
                value
            ))),
        }
    }
}

/// One row of the entry table
///
/// For files `path` is the containing directory; for directories it is the
/// directory's own full path. The flat layout stores neither `path` nor `kind`:
/// every flat entry is a file in the root, except the root entry itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableEntry {
    pub name: String,
    pub path: String,
    pub data_offset: u32,
    pub kind: EntryKind,
}

impl TableEntry {
    /// The root directory entry, always at index 0
    pub fn root() -> Self {
        Self::directory(ROOT_PATH, ROOT_PATH)
    }

    pub fn directory(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            data_offset: 0,
            kind: EntryKind::Directory,
        }
    }

    pub fn file(name: impl Into<String>, path: impl Into<String>, data_offset: u32) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            data_offset,
            kind: EntryKind::File,
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Write entry in the given layout
    pub fn write_to<W: Write>(&self, mut writer: W, layout: Layout) -> Result<()> {
        write_text(&mut writer, &self.name, MAX_NAME_LENGTH)?;
        match layout {
            Layout::Hierarchical => {
                write_text(&mut writer, &self.path, MAX_PATH_LENGTH)?;
                writer.write_all(&self.data_offset.to_le_bytes())?;
                writer.write_all(&[self.kind as u8])?;
                writer.write_all(&[0u8; 3])?;
            }
            Layout::Flat => {
                writer.write_all(&self.data_offset.to_le_bytes())?;
            }
        }
        Ok(())
    }

    /// Read entry in the given layout
    pub fn read_from<R: Read>(mut reader: R, layout: Layout) -> Result<Self> {
        let name = read_text(&mut reader, MAX_NAME_LENGTH)?;
        match layout {
            Layout::Hierarchical => {
                let path = read_text(&mut reader, MAX_PATH_LENGTH)?;
                let data_offset = read_u32(&mut reader)?;

                let mut kind = [0u8; 1];
                reader.read_exact(&mut kind)?;
                let kind = EntryKind::from_u8(kind[0])?;

                let mut reserved = [0u8; 3];
                reader.read_exact(&mut reserved)?;

                Ok(Self {
                    name,
                    path,
                    data_offset,
                    kind,
                })
            }
            Layout::Flat => {
                let data_offset = read_u32(&mut reader)?;
                // Directories never carry payload, so a zero offset marks the root
                if data_offset == 0 {
                    Ok(Self::directory(name, ROOT_PATH))
                } else {
                    Ok(Self::file(name, ROOT_PATH, data_offset))
                }
            }
        }
    }
}
