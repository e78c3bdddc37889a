use crate::error::{DumpFsError, Result};
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// Magic number identifying an initialized archive
pub const MAGIC_NUMBER: [u8; 4] = *b"DMFS";

/// Header size in bytes; the entry table starts right after it
pub const HEADER_SIZE: usize = 100;

/// Offset of the entry table, fixed for the archive lifetime
pub const TABLE_OFFSET: u32 = HEADER_SIZE as u32;

/// Default start of the payload region
pub const DEFAULT_DATA_OFFSET: u32 = 1000;

/// Maximum leaf name length in bytes (UTF-8)
pub const MAX_NAME_LENGTH: usize = 20;

/// Maximum stored path length in bytes (UTF-8)
pub const MAX_PATH_LENGTH: usize = 100;

/// Fixed header fields before the current directory buffer
const HEADER_FIXED_SIZE: usize = 24;

/// Maximum current directory length; whatever the fixed header fields leave over
pub const MAX_CWD_LENGTH: usize = HEADER_SIZE - HEADER_FIXED_SIZE;

/// Path of the root directory
pub const ROOT_PATH: &str = "/";

/// On-disk layout variants
///
/// The hierarchical layout stores a containing path with every entry and
/// supports directories. The flat layout drops the path fields and keeps all
/// files in the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Layout {
    #[default]
    Hierarchical = 0,
    Flat = 1,
}

impl Layout {
    pub fn from_u8(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::Hierarchical),
            1 => Ok(Self::Flat),
            _ => Err(DumpFsError::InvalidFormat(format!(
                "Unknown layout: {}",
                value
            ))),
        }
    }

    pub fn supports_directories(self) -> bool {
        self == Self::Hierarchical
    }

    /// Size of one table entry in this layout
    pub fn entry_size(self) -> usize {
        match self {
            // name + path + data offset + kind + 3 reserved
            Self::Hierarchical => MAX_NAME_LENGTH + MAX_PATH_LENGTH + 4 + 1 + 3,
            // name + data offset
            Self::Flat => MAX_NAME_LENGTH + 4,
        }
    }

    /// Size of the meta record preceding each payload
    pub fn meta_size(self) -> usize {
        match self {
            Self::Hierarchical => 4 + MAX_NAME_LENGTH + MAX_PATH_LENGTH,
            Self::Flat => 4 + MAX_NAME_LENGTH,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hierarchical => "hierarchical",
            Self::Flat => "flat",
        }
    }
}

/// Archive header at offset 0
///
/// Structure (100 bytes fixed):
/// - Magic: "DMFS" (4 bytes)
/// - Layout: uint8 (1 byte)
/// - Reserved: 3 bytes
/// - Table Offset: uint32 (4 bytes)
/// - Entry Count: uint32 (4 bytes)
/// - Data Offset: uint32 (4 bytes)
/// - Data End Offset: uint32 (4 bytes)
/// - Current Directory: NUL-padded UTF-8 (76 bytes)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    pub layout: Layout,
    pub table_offset: u32,
    pub entry_count: u32,
    pub data_offset: u32,
    pub data_end_offset: u32,
    pub current_directory: String,
}

impl ArchiveHeader {
    /// Header of a freshly initialized archive with an empty table
    pub fn new(layout: Layout, data_offset: u32) -> Self {
        Self {
            layout,
            table_offset: TABLE_OFFSET,
            entry_count: 0,
            data_offset,
            data_end_offset: data_offset,
            current_directory: ROOT_PATH.to_string(),
        }
    }

    /// Byte position where the next table entry goes
    pub fn next_entry_position(&self) -> u64 {
        self.table_offset as u64 + self.entry_count as u64 * self.layout.entry_size() as u64
    }

    /// Number of entries that fit between the table start and the data region
    pub fn table_capacity(&self) -> u32 {
        let room = self.data_offset.saturating_sub(self.table_offset) as usize;
        (room / self.layout.entry_size()) as u32
    }

    /// Check the table and data regions do not overlap
    pub fn validate(&self) -> Result<()> {
        if (self.table_offset as usize) < HEADER_SIZE {
            return Err(DumpFsError::InvalidFormat(format!(
                "Table offset {} overlaps the header",
                self.table_offset
            )));
        }
        if self.next_entry_position() > self.data_offset as u64 {
            return Err(DumpFsError::InvalidFormat(format!(
                "Entry table ({} entries) overlaps the data region at {}",
                self.entry_count, self.data_offset
            )));
        }
        if self.data_end_offset < self.data_offset {
            return Err(DumpFsError::InvalidFormat(format!(
                "Data end offset {} precedes data offset {}",
                self.data_end_offset, self.data_offset
            )));
        }
        Ok(())
    }

    /// Write header to a writer
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&MAGIC_NUMBER)?;
        writer.write_all(&[self.layout as u8])?;
        writer.write_all(&[0u8; 3])?;
        writer.write_all(&self.table_offset.to_le_bytes())?;
        writer.write_all(&self.entry_count.to_le_bytes())?;
        writer.write_all(&self.data_offset.to_le_bytes())?;
        writer.write_all(&self.data_end_offset.to_le_bytes())?;
        write_text(&mut writer, &self.current_directory, MAX_CWD_LENGTH)?;
        Ok(())
    }

    /// Read header from a reader
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC_NUMBER {
            return Err(DumpFsError::InvalidFormat(
                "Invalid magic number in archive header".to_string(),
            ));
        }

        let mut layout = [0u8; 1];
        reader.read_exact(&mut layout)?;
        let layout = Layout::from_u8(layout[0])?;

        let mut reserved = [0u8; 3];
        reader.read_exact(&mut reserved)?;

        let header = Self {
            layout,
            table_offset: read_u32(&mut reader)?,
            entry_count: read_u32(&mut reader)?,
            data_offset: read_u32(&mut reader)?,
            data_end_offset: read_u32(&mut reader)?,
            current_directory: read_text(&mut reader, MAX_CWD_LENGTH)?,
        };
        header.validate()?;

        Ok(header)
    }
}

/// Reject a leaf name that does not fit its field
pub fn check_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(DumpFsError::NameTooLong {
            name: name.to_string(),
            len: name.len(),
            max: MAX_NAME_LENGTH,
        });
    }
    Ok(())
}

/// Reject a path that does not fit a field of `max` bytes
pub fn check_path(path: &str, max: usize) -> Result<()> {
    if path.len() > max {
        return Err(DumpFsError::PathTooLong {
            path: path.to_string(),
            len: path.len(),
            max,
        });
    }
    Ok(())
}

/// Write a NUL-padded text field of exactly `width` bytes
pub(crate) fn write_text<W: Write>(mut writer: W, value: &str, width: usize) -> Result<()> {
    let bytes = value.as_bytes();
    if bytes.len() > width {
        return Err(DumpFsError::InvalidFormat(format!(
            "Field value '{}' exceeds {} bytes",
            value, width
        )));
    }
    writer.write_all(bytes)?;
    writer.write_all(&vec![0u8; width - bytes.len()])?;
    Ok(())
}

/// Read a NUL-padded text field of exactly `width` bytes
pub(crate) fn read_text<R: Read>(mut reader: R, width: usize) -> Result<String> {
    let mut buf = vec![0u8; width];
    reader.read_exact(&mut buf)?;
    let end = buf.iter().position(|&b| b == 0).unwrap_or(width);
    buf.truncate(end);
    String::from_utf8(buf)
        .map_err(|e| DumpFsError::InvalidFormat(format!("Invalid UTF-8 in text field: {}", e)))
}

pub(crate) fn read_u32<R: Read>(mut reader: R) -> Result<u32> {
    let mut buf = [0u8; 4];
    reader.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
