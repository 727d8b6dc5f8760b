//! Source-text collaborator.
//!
//! The analysis core never touches the file system directly. Whoever embeds
//! it supplies a [`SourceReader`]; production code uses [`FsSourceReader`],
//! tests and direct-code analysis use [`MemorySourceReader`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

/// Supplies the text of a source file.
pub trait SourceReader: Send + Sync {
    fn read_source(&self, path: &Path) -> io::Result<String>;
}

/// Reads files from disk, replacing invalid UTF-8.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSourceReader;

impl SourceReader for FsSourceReader {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Serves sources from memory, keyed by path.
#[derive(Debug, Clone, Default)]
pub struct MemorySourceReader {
    files: HashMap<PathBuf, String>,
}

impl MemorySourceReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert<P: AsRef<Path>>(&mut self, path: P, source: impl Into<String>) {
        self.files.insert(path.as_ref().to_path_buf(), source.into());
    }

    pub fn with_file<P: AsRef<Path>>(mut self, path: P, source: impl Into<String>) -> Self {
        self.insert(path, source);
        self
    }
}

impl SourceReader for MemorySourceReader {
    fn read_source(&self, path: &Path) -> io::Result<String> {
        self.files.get(path).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no in-memory source for {}", path.display()),
            )
        })
    }
}
