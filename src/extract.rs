//! Destinations for file contents read out of an archive

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives the payload and stored name of a file read from the archive
pub trait ExtractSink {
    /// Store `data` under a name derived from `name`, returning where it went
    fn extract(&mut self, name: &str, data: &[u8]) -> Result<PathBuf>;
}

/// Writes extracted files into a host directory as `<prefix><name>`
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    prefix: String,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(dir: P, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            prefix: prefix.into(),
        }
    }

    /// Host path a file called `name` would be extracted to
    pub fn target_path(&self, name: &str) -> PathBuf {
        // Stored names are not validated on read; keep them inside `dir`
        let safe_name = name.replace(['/', '\\'], "_");
        self.dir.join(format!("{}{}", self.prefix, safe_name))
    }
}

impl ExtractSink for DirectorySink {
    fn extract(&mut self, name: &str, data: &[u8]) -> Result<PathBuf> {
        let target = self.target_path(name);
        std::fs::write(&target, data)?;

        debug!(target = %target.display(), len = data.len(), "extracted file");
        Ok(target)
    }
}

/// Keeps extracted files in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    files: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracted files in extraction order
    pub fn files(&self) -> &[(String, Vec<u8>)] {
        &self.files
    }

    /// Contents of the most recent extraction of `name`
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.files
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.as_slice())
    }
}

impl ExtractSink for MemorySink {
    fn extract(&mut self, name: &str, data: &[u8]) -> Result<PathBuf> {
        self.files.push((name.to_string(), data.to_vec()));
        Ok(PathBuf::from(name))
    }
}
