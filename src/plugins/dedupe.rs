//! Duplicate learning-entry removal for the AUTOMATED LEARNINGS section.
//!
//! The section normally closes the document. Within its body each
//! `### Learning Entry - <timestamp>` line opens an entry that runs to the next
//! such line, or to the end of the section. Two entries are the same when
//! their timestamps match and the first five lines of their trimmed bodies
//! match; later lines are not compared.

use crate::core::document::{AUTOMATED_LEARNINGS, Document};
use crate::core::error::AidataError;
use crate::core::store::{AidataFile, WriteMode};
use crate::plugins::integrity::hash_text;
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Body lines that take part in an entry's identity.
pub const IDENTITY_LINES: usize = 5;

static ENTRY_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^### Learning Entry - ([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})\s*$")
        .unwrap()
});

/// Timestamp of a `### Learning Entry - ...` header line.
pub fn entry_timestamp(line: &str) -> Option<&str> {
    ENTRY_HEADER
        .captures(line)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningEntry {
    pub timestamp: String,
    /// Header line plus body lines.
    pub lines: Range<usize>,
}

impl LearningEntry {
    pub fn header(&self) -> usize {
        self.lines.start
    }

    pub fn body(&self) -> Range<usize> {
        self.lines.start + 1..self.lines.end
    }
}

/// The learnings tail split into preamble and entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningsScan {
    /// Body lines of the section, up to the next marker or end-of-file.
    pub tail: Range<usize>,
    /// Lines before the first entry header.
    pub preamble: Range<usize>,
    pub entries: Vec<LearningEntry>,
}

pub fn scan_learnings(doc: &Document) -> Result<LearningsScan, AidataError> {
    let section = doc.locate_section(AUTOMATED_LEARNINGS).ok_or_else(|| {
        AidataError::NotFound(format!("No {} section found.", AUTOMATED_LEARNINGS))
    })?;
    // The last entry ends at the next top-level marker, never past it.
    let tail = section.body.clone();
    if tail.end != doc.line_count() {
        warn!(
            next_section = tail.end,
            "{} is not the last section; sections after it are left untouched",
            AUTOMATED_LEARNINGS
        );
    }

    let lines = doc.lines();
    let mut entries: Vec<LearningEntry> = Vec::new();
    for idx in tail.clone() {
        if let Some(ts) = entry_timestamp(&lines[idx]) {
            if let Some(prev) = entries.last_mut() {
                prev.lines.end = idx;
            }
            entries.push(LearningEntry {
                timestamp: ts.to_string(),
                lines: idx..tail.end,
            });
        }
    }
    let preamble_end = entries.first().map(|e| e.header()).unwrap_or(tail.end);

    Ok(LearningsScan {
        preamble: tail.start..preamble_end,
        tail,
        entries,
    })
}

/// SHA-256 of `timestamp|<first five trimmed body lines>`.
pub fn identity_key(timestamp: &str, body: &str) -> String {
    let summary = body
        .trim()
        .split('\n')
        .take(IDENTITY_LINES)
        .collect::<Vec<_>>()
        .join("\n");
    hash_text(&format!("{}|{}", timestamp, summary))
}

/// Entries that repeat an earlier entry's identity, in document order.
pub fn find_duplicates<'a>(doc: &Document, scan: &'a LearningsScan) -> Vec<&'a LearningEntry> {
    let mut seen: FxHashSet<String> = FxHashSet::default();
    let mut duplicates = Vec::new();
    for entry in &scan.entries {
        let body = doc.lines()[entry.body()].join("\n");
        if !seen.insert(identity_key(&entry.timestamp, &body)) {
            duplicates.push(entry);
        }
    }
    duplicates
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DedupeOutcome {
    /// Duplicates (possibly zero) were removed.
    Applied { removed: usize, kept: usize },
    /// The confirmation was declined; nothing changed.
    Declined { duplicates: usize },
}

impl DedupeOutcome {
    pub fn message(&self) -> String {
        match self {
            DedupeOutcome::Applied { removed, .. } => format!(
                "Successfully deduplicated. Removed {} duplicate entries.",
                removed
            ),
            DedupeOutcome::Declined { .. } => "Operation cancelled by user.".to_string(),
        }
    }
}

/// Remove duplicate learning entries from `doc`.
///
/// `confirm` is asked once, with the duplicate count, only when there is
/// something to remove. Declining leaves `doc` untouched.
pub fn dedupe<F>(doc: &mut Document, mut confirm: F) -> Result<DedupeOutcome, AidataError>
where
    F: FnMut(usize) -> bool,
{
    let scan = scan_learnings(doc)?;
    let duplicates = find_duplicates(doc, &scan);
    let removed = duplicates.len();
    let kept = scan.entries.len() - removed;
    debug!(entries = scan.entries.len(), duplicates = removed, "scanned learnings");

    if removed == 0 {
        return Ok(DedupeOutcome::Applied { removed, kept });
    }
    if !confirm(removed) {
        return Ok(DedupeOutcome::Declined {
            duplicates: removed,
        });
    }

    let dropped: FxHashSet<usize> = duplicates.iter().map(|e| e.header()).collect();
    let mut rebuilt: Vec<String> = doc.lines()[scan.preamble.clone()].to_vec();
    for entry in scan.entries.iter().filter(|e| !dropped.contains(&e.header())) {
        rebuilt.extend_from_slice(&doc.lines()[entry.lines.clone()]);
    }
    doc.replace_lines(scan.tail, rebuilt);

    Ok(DedupeOutcome::Applied { removed, kept })
}

/// Interactive confirmation on stdin/stdout.
pub fn prompt_confirm(duplicates: usize) -> bool {
    let stdin = io::stdin();
    confirm_with(&mut stdin.lock(), &mut io::stdout(), duplicates)
}

/// Ask on `output`, read one line from `input`; only `y`/`Y` proceeds.
pub fn confirm_with<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    duplicates: usize,
) -> bool {
    let _ = write!(output, "Found {} duplicate entries. Remove them? (y/N): ", duplicates);
    let _ = output.flush();
    let mut answer = String::new();
    match input.read_line(&mut answer) {
        Ok(_) => answer.trim_end_matches(['\r', '\n']).eq_ignore_ascii_case("y"),
        Err(_) => false,
    }
}

/// `deduplicate`: the file-level operation. Writes only when entries were
/// removed.
pub fn deduplicate_file<F>(
    path: &Path,
    mode: WriteMode,
    confirm: F,
) -> Result<DedupeOutcome, AidataError>
where
    F: FnMut(usize) -> bool,
{
    let mut file = AidataFile::open(path)?;
    let outcome = dedupe(&mut file.document, confirm)?;
    match outcome {
        DedupeOutcome::Applied { removed, .. } if removed > 0 => {
            file.save(mode)?;
            info!(path = %path.display(), removed, "removed duplicate learning entries");
        }
        DedupeOutcome::Applied { .. } => debug!("no duplicate learning entries"),
        DedupeOutcome::Declined { duplicates } => {
            info!(duplicates, "deduplication declined; file left unchanged")
        }
    }
    Ok(outcome)
}
