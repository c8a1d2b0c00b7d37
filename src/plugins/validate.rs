//! Structural validation of aidata documents.
//!
//! Checks run in a fixed order and the first failing check decides the
//! result:
//!
//! 1. all mandatory section markers are present (every missing one is listed)
//! 2. the file opens with `# AI LEARNING FILE:`
//! 3. a `## CREATED` marker exists
//! 4. a `YYYY-MM-DD HH:MM:SS` stamp on the line after `## CREATED` is a real
//!    date and time (a line of any other shape is not checked)
//! 5. the FILE METADATA body names each required field (strict mode only)
//! 6. an existing integrity-hash line matches the content
//!
//! Validation never writes.

use crate::core::config::ValidationConfig;
use crate::core::document::{
    CREATED, Document, FILE_METADATA, HEADER_PREFIX, MANDATORY_SECTIONS,
};
use crate::core::store::AidataFile;
use crate::core::{error::AidataError, time};
use crate::plugins::integrity::{self, IntegrityStatus};
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

static CREATED_STAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2})").unwrap()
});

pub const PASS_MESSAGE: &str = "Syntax validation passed.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Check required metadata fields. Off by default: the historical
    /// extractor never located the metadata body, so the check never ran.
    pub strict_metadata: bool,
    pub verify_integrity: bool,
    pub required_metadata_fields: Vec<String>,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions::from(&ValidationConfig::default())
    }
}

impl From<&ValidationConfig> for ValidationOptions {
    fn from(cfg: &ValidationConfig) -> Self {
        ValidationOptions {
            strict_metadata: cfg.strict_metadata,
            verify_integrity: cfg.verify_integrity,
            required_metadata_fields: cfg.required_metadata_fields.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub message: String,
    pub missing_sections: Vec<String>,
    pub missing_fields: Vec<String>,
}

impl ValidationReport {
    fn pass() -> Self {
        ValidationReport {
            ok: true,
            message: PASS_MESSAGE.to_string(),
            missing_sections: Vec::new(),
            missing_fields: Vec::new(),
        }
    }

    fn fail(message: impl Into<String>) -> Self {
        ValidationReport {
            ok: false,
            message: message.into(),
            missing_sections: Vec::new(),
            missing_fields: Vec::new(),
        }
    }
}

pub fn missing_sections(doc: &Document) -> Vec<String> {
    MANDATORY_SECTIONS
        .iter()
        .filter(|name| !doc.has_section(name))
        .map(|name| name.to_string())
        .collect()
}

/// First `## CREATED` marker followed by a stamp-shaped line, and that stamp.
fn created_stamp(doc: &Document) -> Option<&str> {
    let lines = doc.lines();
    doc.sections()
        .iter()
        .filter(|s| s.name == CREATED)
        .filter_map(|s| lines.get(s.marker + 1))
        .find_map(|next| CREATED_STAMP.captures(next).and_then(|c| c.get(1)))
        .map(|m| m.as_str())
}

pub fn missing_metadata_fields(body: &str, required: &[String]) -> Vec<String> {
    required
        .iter()
        .filter(|field| !body.contains(&format!("- **{}**:", field)))
        .cloned()
        .collect()
}

pub fn validate(doc: &Document, opts: &ValidationOptions) -> ValidationReport {
    let missing = missing_sections(doc);
    if !missing.is_empty() {
        let mut report =
            ValidationReport::fail(format!("Missing mandatory sections: {}", missing.join(", ")));
        report.missing_sections = missing;
        return report;
    }

    if doc.header().is_none() {
        return ValidationReport::fail(format!("File must start with '{}'", HEADER_PREFIX));
    }

    if !doc.has_section(CREATED) {
        return ValidationReport::fail(format!("Missing '{}' section", CREATED));
    }

    if let Some(stamp) = created_stamp(doc) {
        if time::parse_entry_timestamp(stamp).is_err() {
            return ValidationReport::fail(format!(
                "Invalid timestamp format in {} section: {}",
                CREATED, stamp
            ));
        }
    }

    if opts.strict_metadata {
        let body = doc.body_of(FILE_METADATA).unwrap_or_default();
        let missing = missing_metadata_fields(&body, &opts.required_metadata_fields);
        if !missing.is_empty() {
            let mut report = ValidationReport::fail(format!(
                "Missing required metadata fields: {}",
                missing.join(", ")
            ));
            report.missing_fields = missing;
            return report;
        }
    } else {
        debug!("metadata field check skipped");
    }

    if opts.verify_integrity {
        let status = integrity::inspect(doc);
        match status {
            IntegrityStatus::Missing | IntegrityStatus::Valid { .. } => {}
            IntegrityStatus::Mismatch { .. } | IntegrityStatus::Malformed { .. } => {
                return ValidationReport::fail(status.describe());
            }
        }
    }

    ValidationReport::pass()
}

/// `validate`: read-only check of a file on disk.
pub fn validate_file(
    path: &Path,
    opts: &ValidationOptions,
) -> Result<ValidationReport, AidataError> {
    let file = AidataFile::open(path)?;
    let report = validate(&file.document, opts);
    debug!(path = %path.display(), ok = report.ok, "validated");
    Ok(report)
}
