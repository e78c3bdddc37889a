use serde::Serialize;
use std::fmt;

/// Contents of one archive directory
///
/// Directories come before files; each group keeps table (insertion) order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub directory: String,
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

impl Listing {
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Contents of {}:", self.directory)?;
        for name in &self.directories {
            writeln!(f, "[DIR] {}", name)?;
        }
        for name in &self.files {
            writeln!(f, "[FILE] {}", name)?;
        }
        Ok(())
    }
}
