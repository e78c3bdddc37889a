//! Archive configuration loaded from TOML
//!
//! ```toml
//! archive = "mydump"
//! layout = "hierarchical"
//! data_offset = 1000
//! extract_dir = "."
//! extract_prefix = "tmp_"
//! ```
//!
//! Every key is optional.

use crate::archive::{Layout, DEFAULT_DATA_OFFSET, TABLE_OFFSET};
use crate::error::{DumpFsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "dumpfs.toml";

/// Archive file used when none is configured
pub const DEFAULT_ARCHIVE: &str = "mydump";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArchiveConfig {
    /// Host file holding the archive
    pub archive: PathBuf,

    /// Layout used when the archive is initialized
    pub layout: Layout,

    /// Start of the data region; bounds the entry table's capacity
    pub data_offset: u32,

    /// Directory extracted files are written to
    pub extract_dir: PathBuf,

    /// Prefix prepended to extracted file names
    pub extract_prefix: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            archive: PathBuf::from(DEFAULT_ARCHIVE),
            layout: Layout::default(),
            data_offset: DEFAULT_DATA_OFFSET,
            extract_dir: PathBuf::from("."),
            extract_prefix: "tmp_".to_string(),
        }
    }
}

impl ArchiveConfig {
    /// Default configuration for the archive at `path`
    pub fn for_archive<P: AsRef<Path>>(path: P) -> Self {
        Self {
            archive: path.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_data_offset(mut self, data_offset: u32) -> Self {
        self.data_offset = data_offset;
        self
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            DumpFsError::Config(format!("Cannot read {}: {}", path.as_ref().display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` if given, else `dumpfs.toml` if present, else defaults
    pub fn discover(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None if Path::new(DEFAULT_CONFIG_FILE).is_file() => Self::load(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.archive.as_os_str().is_empty() {
            return Err(DumpFsError::Config("archive path is empty".to_string()));
        }

        // Room for at least the root entry
        let min = TABLE_OFFSET as usize + self.layout.entry_size();
        if (self.data_offset as usize) < min {
            return Err(DumpFsError::Config(format!(
                "data_offset {} leaves no room for the entry table (min {})",
                self.data_offset, min
            )));
        }
        Ok(())
    }
}
