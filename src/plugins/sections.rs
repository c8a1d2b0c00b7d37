//! Section listing.

use crate::core::error::AidataError;
use crate::core::store::AidataFile;
use std::path::Path;

/// Top-level section names in document order, duplicates included.
pub fn list_sections(path: &Path) -> Result<Vec<String>, AidataError> {
    let file = AidataFile::open(path)?;
    Ok(file
        .document
        .section_names()
        .into_iter()
        .map(str::to_string)
        .collect())
}
