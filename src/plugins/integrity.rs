//! Integrity hash generation and verification.
//!
//! The hash is SHA-256 over the document text with every
//! `- **Integrity Hash**: SHA256-` line removed, so the line never hashes
//! itself and the value only depends on the rest of the document.

use crate::core::document::{Document, FILE_METADATA};
use crate::core::error::AidataError;
use crate::core::store::{AidataFile, WriteMode};
use regex::Regex;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

pub const HASH_LINE_PREFIX: &str = "- **Integrity Hash**: SHA256-";

static HASH_HEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9a-f]{64}$").unwrap());

pub fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text);
    format!("{:x}", hasher.finalize())
}

pub fn is_hash_line(line: &str) -> bool {
    line.starts_with(HASH_LINE_PREFIX)
}

pub fn hash_line(hex: &str) -> String {
    format!("{}{}", HASH_LINE_PREFIX, hex)
}

/// Digest of the document with all hash lines left out.
pub fn compute_digest(doc: &Document) -> String {
    let remaining: Vec<&str> = doc
        .lines()
        .iter()
        .map(String::as_str)
        .filter(|l| !is_hash_line(l))
        .collect();
    hash_text(&remaining.join("\n"))
}

/// Where the refreshed hash line ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HashRefresh {
    pub hash: String,
    /// Line index of the new hash line.
    pub line: usize,
    /// True when an existing hash line was replaced, false when one was added.
    pub replaced: bool,
}

/// Recompute the hash and put exactly one hash line back into `doc`.
///
/// An existing line keeps its position (the last one, when there were
/// several). Otherwise the line becomes the final line of the FILE METADATA
/// body, right before the next top-level marker or at end-of-file.
pub fn refresh_hash(doc: &mut Document) -> Result<HashRefresh, AidataError> {
    let fresh_target = doc.locate_section(FILE_METADATA).map(|s| s.body.end);
    let has_hash = doc.lines().iter().any(|l| is_hash_line(l));
    if !has_hash && fresh_target.is_none() {
        return Err(AidataError::NotFound(format!(
            "'{}' section to hold the integrity hash",
            FILE_METADATA
        )));
    }

    let dropped = doc.retain_lines(|l| !is_hash_line(l));
    let hash = hash_text(&doc.to_text());

    let (line, replaced) = match dropped.last() {
        // Earlier removals shift the last line's position up by one each.
        Some(&last) => (last - (dropped.len() - 1), true),
        None => {
            let at = doc
                .locate_section(FILE_METADATA)
                .map(|s| s.body.end)
                .unwrap_or(doc.line_count());
            (at, false)
        }
    };
    doc.insert_lines(line, [hash_line(&hash)]);

    if dropped.len() > 1 {
        debug!(removed = dropped.len(), "collapsed duplicate integrity hash lines");
    }
    Ok(HashRefresh {
        hash,
        line,
        replaced,
    })
}

/// Result of checking an existing hash line without touching the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IntegrityStatus {
    Missing,
    Valid { hash: String },
    Mismatch { expected: String, found: String },
    Malformed { line: String },
}

impl IntegrityStatus {
    pub fn is_valid(&self) -> bool {
        matches!(self, IntegrityStatus::Valid { .. })
    }

    pub fn describe(&self) -> String {
        match self {
            IntegrityStatus::Missing => "No integrity hash line found".to_string(),
            IntegrityStatus::Valid { hash } => format!("Integrity hash verified: SHA256-{}", hash),
            IntegrityStatus::Mismatch { expected, found } => format!(
                "Integrity hash mismatch: file records SHA256-{}, content hashes to SHA256-{}",
                found, expected
            ),
            IntegrityStatus::Malformed { line } => {
                format!("Malformed integrity hash line: {}", line.trim_end())
            }
        }
    }
}

/// Compare the last hash line in `doc` against the recomputed digest.
pub fn inspect(doc: &Document) -> IntegrityStatus {
    let Some(line) = doc.lines().iter().rev().find(|l| is_hash_line(l)) else {
        return IntegrityStatus::Missing;
    };
    let recorded = line[HASH_LINE_PREFIX.len()..].trim_end();
    if !HASH_HEX.is_match(recorded) {
        return IntegrityStatus::Malformed { line: line.clone() };
    }
    let expected = compute_digest(doc);
    if expected == recorded {
        IntegrityStatus::Valid { hash: expected }
    } else {
        IntegrityStatus::Mismatch {
            expected,
            found: recorded.to_string(),
        }
    }
}

/// `generate-hash`: refresh the hash line and rewrite the file.
pub fn generate_hash(path: &Path, mode: WriteMode) -> Result<HashRefresh, AidataError> {
    let mut file = AidataFile::open(path)?;
    let refresh = refresh_hash(&mut file.document)?;
    file.save(mode)?;
    info!(
        path = %path.display(),
        hash = %refresh.hash,
        replaced = refresh.replaced,
        "integrity hash updated"
    );
    Ok(refresh)
}

/// `verify-hash`: read-only check of the recorded hash.
pub fn verify_hash(path: &Path) -> Result<IntegrityStatus, AidataError> {
    let file = AidataFile::open(path)?;
    Ok(inspect(&file.document))
}
