//! Checkpoint lines under EVOLUTION TRACKING → `### Checkpoint History`.

use crate::core::document::{Document, EVOLUTION_TRACKING, marker_name};
use crate::core::error::AidataError;
use crate::core::store::{AidataFile, WriteMode};
use crate::core::time;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

pub const CHECKPOINT_HISTORY: &str = "### Checkpoint History";

static CHECKPOINT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^- \*\*[0-9]{4}-[0-9]{2}-[0-9]{2}T[0-9]{2}:[0-9]{2}:[0-9]{2}Z\*\*: ").unwrap()
});

pub fn checkpoint_line(timestamp: &str, description: &str) -> String {
    format!("- **{}**: {}", timestamp, description)
}

pub fn is_checkpoint_line(line: &str) -> bool {
    CHECKPOINT_LINE.is_match(line)
}

fn is_evolution_marker(line: &str) -> bool {
    marker_name(line) == Some(EVOLUTION_TRACKING)
}

fn is_history_marker(line: &str) -> bool {
    line.trim_start().starts_with(CHECKPOINT_HISTORY)
}

/// Checkpoint lines inside EVOLUTION TRACKING sections, in order.
pub fn checkpoints(doc: &Document) -> Vec<&str> {
    doc.sections()
        .iter()
        .filter(|s| s.name == EVOLUTION_TRACKING)
        .flat_map(|s| doc.lines()[s.body.clone()].iter())
        .map(String::as_str)
        .filter(|l| is_checkpoint_line(l))
        .collect()
}

/// Collapse a description onto one line so it cannot break the line format.
pub fn normalize_description(description: &str) -> Result<String, AidataError> {
    let joined = description
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if joined.is_empty() {
        return Err(AidataError::UsageError(
            "--description is required for add-checkpoint".to_string(),
        ));
    }
    Ok(joined)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Outside,
    InEvolutionTracking,
    InCheckpointHistory,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckpointInsert {
    pub entry: String,
    /// Line index of the new checkpoint line.
    pub line: usize,
    /// True when a `### Checkpoint History` subsection had to be created.
    pub created_history: bool,
}

/// Insert one checkpoint line.
///
/// Once a Checkpoint History subsection has been seen, the line goes right
/// before the next top-level marker, i.e. at the end of the whole EVOLUTION
/// TRACKING section even if other subsections follow the history. Without a
/// history subsection one is created at the end of EVOLUTION TRACKING.
/// The EVOLUTION TRACKING state ends at the next top-level marker, so a
/// `### Checkpoint History` heading under any later section is ignored.
pub fn insert_checkpoint(
    doc: &mut Document,
    timestamp: &str,
    description: &str,
) -> Result<CheckpointInsert, AidataError> {
    let description = normalize_description(description)?;
    let entry = checkpoint_line(timestamp, &description);

    let mut state = ScanState::Outside;
    let mut evolution_marker: Option<usize> = None;
    let mut boundary: Option<usize> = None;
    for (idx, line) in doc.lines().iter().enumerate() {
        match state {
            ScanState::Outside => {
                if is_evolution_marker(line) {
                    if evolution_marker.is_none() {
                        evolution_marker = Some(idx);
                    }
                    state = ScanState::InEvolutionTracking;
                }
            }
            ScanState::InEvolutionTracking => {
                if is_history_marker(line) {
                    state = ScanState::InCheckpointHistory;
                } else if marker_name(line).is_some() && !is_evolution_marker(line) {
                    state = ScanState::Outside;
                }
            }
            ScanState::InCheckpointHistory => {
                if marker_name(line).is_some() && !is_evolution_marker(line) {
                    boundary = Some(idx);
                    break;
                }
            }
        }
    }

    let inserted = match (state, boundary) {
        (ScanState::InCheckpointHistory, Some(at)) => {
            doc.insert_lines(at, [entry.clone(), String::new()]);
            CheckpointInsert {
                entry,
                line: at,
                created_history: false,
            }
        }
        (ScanState::InCheckpointHistory, None) => {
            // EVOLUTION TRACKING runs to end-of-file.
            let at = end_of_text(doc);
            doc.insert_lines(at, [entry.clone()]);
            CheckpointInsert {
                entry,
                line: at,
                created_history: false,
            }
        }
        _ => {
            let marker = evolution_marker.ok_or_else(|| {
                AidataError::NotFound(format!("'{}' section", EVOLUTION_TRACKING))
            })?;
            create_history(doc, marker, entry)
        }
    };
    debug!(line = inserted.line, created = inserted.created_history, "checkpoint inserted");
    Ok(inserted)
}

/// Insertion index that keeps a trailing newline at the end of the file.
fn end_of_text(doc: &Document) -> usize {
    let n = doc.line_count();
    match doc.lines().last() {
        Some(last) if last.is_empty() && n > 1 => n - 1,
        _ => n,
    }
}

fn create_history(doc: &mut Document, marker: usize, entry: String) -> CheckpointInsert {
    let next_marker = doc
        .lines()
        .iter()
        .enumerate()
        .skip(marker + 1)
        .find(|(_, l)| marker_name(l).is_some() && !is_evolution_marker(l))
        .map(|(j, _)| j);
    let at = match next_marker {
        Some(j) => j,
        None => end_of_text(doc),
    };

    let mut block: Vec<String> = Vec::new();
    if at > 0 && !doc.lines()[at - 1].trim().is_empty() {
        block.push(String::new());
    }
    block.push(CHECKPOINT_HISTORY.to_string());
    let line = at + block.len();
    block.push(entry.clone());
    if next_marker.is_some() {
        block.push(String::new());
    }
    doc.insert_lines(at, block);

    CheckpointInsert {
        entry,
        line,
        created_history: true,
    }
}

/// `add-checkpoint`: stamp with the current UTC time and rewrite the file.
pub fn add_checkpoint(
    path: &Path,
    description: &str,
    mode: WriteMode,
) -> Result<CheckpointInsert, AidataError> {
    let mut file = AidataFile::open(path)?;
    let inserted = insert_checkpoint(
        &mut file.document,
        &time::now_checkpoint_timestamp(),
        description,
    )?;
    file.save(mode)?;
    info!(path = %path.display(), entry = %inserted.entry, "checkpoint added");
    Ok(inserted)
}
