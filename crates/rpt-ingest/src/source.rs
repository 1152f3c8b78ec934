//! Input sources: a file path or an in-memory buffer.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, Cursor, Read};
use std::path::{Path, PathBuf};

use crate::error::{IngestError, Result};

/// Where a loader reads its bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Path(PathBuf),
    Buffer(Vec<u8>),
}

impl Source {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Buffer(bytes.into())
    }

    /// UTF-8 text held in memory.
    pub fn from_text(text: &str) -> Self {
        Self::Buffer(text.as_bytes().to_vec())
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Path(path) => Some(path),
            Self::Buffer(_) => None,
        }
    }

    /// Opens the source for reading.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Read`] when the file cannot be opened.
    pub fn open(&self) -> Result<Box<dyn Read + '_>> {
        match self {
            Self::Path(path) => {
                let file = File::open(path).map_err(|source| IngestError::Read {
                    origin: path.display().to_string(),
                    source,
                })?;
                Ok(Box::new(BufReader::new(file)))
            }
            Self::Buffer(bytes) => Ok(Box::new(Cursor::new(bytes.as_slice()))),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => write!(f, "{}", path.display()),
            Self::Buffer(bytes) => write!(f, "<buffer: {} bytes>", bytes.len()),
        }
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_reads_back_text() {
        let source = Source::from_text("This is a test");
        let mut text = String::new();
        source.open().unwrap().read_to_string(&mut text).unwrap();
        assert_eq!(text, "This is a test");
        assert_eq!(source.to_string(), "<buffer: 14 bytes>");
    }

    #[test]
    fn missing_file_is_read_error() {
        let source = Source::from_path("/definitely/not/here.csv");
        assert!(matches!(source.open(), Err(IngestError::Read { .. })));
    }
}
