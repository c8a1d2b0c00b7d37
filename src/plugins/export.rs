//! JSON projection of a document: title, metadata and raw section bodies.

use crate::core::document::{Document, FILE_METADATA};
use crate::core::error::AidataError;
use crate::core::store::AidataFile;
use regex::Regex;
use serde_json::{Map, Value as JsonValue};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::info;

static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^- \*\*([^:]+)\*\*: (.*)").unwrap());

/// `- **Key**: Value` pairs of a metadata body. Any other line shape,
/// including nested bullets, is skipped.
pub fn parse_metadata(body: &str) -> Vec<(String, String)> {
    body.split('\n')
        .map(|l| l.trim_end_matches('\r'))
        .filter_map(|line| {
            let caps = METADATA_LINE.captures(line)?;
            Some((caps[1].to_string(), caps[2].to_string()))
        })
        .collect()
}

/// Build the `{file_name, file_title?, metadata, sections}` object.
///
/// Repeated keys and section names keep their first position and take the
/// last value.
pub fn project(doc: &Document, file_name: &str) -> JsonValue {
    let mut root = Map::new();
    root.insert("file_name".into(), JsonValue::String(file_name.to_string()));
    if let Some(title) = doc.title() {
        root.insert("file_title".into(), JsonValue::String(title.to_string()));
    }

    let mut metadata = Map::new();
    if let Some(body) = doc.body_of(FILE_METADATA) {
        for (key, value) in parse_metadata(&body) {
            metadata.insert(key, JsonValue::String(value));
        }
    }
    root.insert("metadata".into(), JsonValue::Object(metadata));

    let mut sections = Map::new();
    for section in doc.sections() {
        let body = doc.section_body(section);
        sections.insert(
            section.name.clone(),
            JsonValue::String(body.trim().to_string()),
        );
    }
    root.insert("sections".into(), JsonValue::Object(sections));

    JsonValue::Object(root)
}

/// Sibling path with the same stem and a `.json` extension.
pub fn json_output_path(path: &Path) -> PathBuf {
    path.with_extension("json")
}

/// `to-json`: write the projection next to the source, overwriting.
pub fn export_json(path: &Path) -> Result<PathBuf, AidataError> {
    let file = AidataFile::open(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let rendered = serde_json::to_string_pretty(&project(&file.document, &file_name))?;

    let out = json_output_path(path);
    fs::write(&out, rendered).map_err(|e| AidataError::io_at(&out, e))?;
    info!(source = %path.display(), output = %out.display(), "exported JSON");
    Ok(out)
}
