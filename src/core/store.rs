//! Reading and writing aidata files.
//!
//! Every operation opens the file fresh, transforms the in-memory document and
//! writes the whole text back only when it succeeds. Nothing is cached between
//! invocations.

use crate::core::document::Document;
use crate::core::error::AidataError;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// How a finished document is flushed to disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Truncate and rewrite the target in place.
    #[default]
    Direct,
    /// Write a sibling temp file, then rename it over the target.
    Atomic,
}

/// A document bound to the path it was read from.
#[derive(Debug, Clone)]
pub struct AidataFile {
    pub path: PathBuf,
    pub document: Document,
}

impl AidataFile {
    pub fn open(path: &Path) -> Result<Self, AidataError> {
        let text = fs::read_to_string(path).map_err(|e| AidataError::io_at(path, e))?;
        debug!(path = %path.display(), bytes = text.len(), "read document");
        Ok(AidataFile {
            path: path.to_path_buf(),
            document: Document::parse(&text),
        })
    }

    pub fn save(&self, mode: WriteMode) -> Result<(), AidataError> {
        write_text(&self.path, &self.document.to_text(), mode)
    }
}

pub fn write_text(path: &Path, text: &str, mode: WriteMode) -> Result<(), AidataError> {
    match mode {
        WriteMode::Direct => fs::write(path, text).map_err(|e| AidataError::io_at(path, e))?,
        WriteMode::Atomic => {
            let dir = match path.parent() {
                Some(p) if !p.as_os_str().is_empty() => p,
                _ => Path::new("."),
            };
            let mut staged =
                tempfile::NamedTempFile::new_in(dir).map_err(|e| AidataError::io_at(dir, e))?;
            staged
                .write_all(text.as_bytes())
                .and_then(|_| staged.as_file().sync_all())
                .map_err(|e| AidataError::io_at(staged.path(), e))?;
            staged
                .persist(path)
                .map_err(|e| AidataError::io_at(path, e.error))?;
        }
    }
    debug!(path = %path.display(), bytes = text.len(), ?mode, "wrote document");
    Ok(())
}
