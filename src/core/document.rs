//! Line-indexed model of an aidata document.
//!
//! The document is held as the exact list of lines produced by splitting the
//! source text on `\n`, so flushing it back with `to_text` reproduces the input
//! byte for byte. A single scan over those lines builds the section index:
//! every line starting with `## ` opens a top-level section that runs until the
//! next such line or end-of-file. Section bodies are never parsed here; the
//! metadata, learning-entry and checkpoint scanners in `plugins` work on the
//! line ranges this module hands out.

use crate::core::error::AidataError;
use std::ops::Range;

pub const HEADER_PREFIX: &str = "# AI LEARNING FILE:";
pub const SECTION_PREFIX: &str = "## ";

pub const FILE_METADATA: &str = "FILE METADATA";
pub const EVOLUTION_TRACKING: &str = "EVOLUTION TRACKING";
pub const AUTOMATED_LEARNINGS: &str = "AUTOMATED LEARNINGS";
pub const CREATED: &str = "CREATED";

/// Section names every valid document carries as top-level markers.
pub const MANDATORY_SECTIONS: [&str; 7] = [
    FILE_METADATA,
    "DOMAIN CONTEXT",
    "KNOWLEDGE REPRESENTATION",
    "VALIDATION FRAMEWORK",
    "APPLICATION CONTEXT",
    EVOLUTION_TRACKING,
    AUTOMATED_LEARNINGS,
];

/// One top-level `## NAME` section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub name: String,
    /// Index of the marker line.
    pub marker: usize,
    /// Body line range (marker excluded), ending at the next marker or EOF.
    pub body: Range<usize>,
    /// Byte range of marker plus body in the flushed text.
    pub span: Range<usize>,
}

/// Returns the section name when `line` is a top-level marker.
pub fn marker_name(line: &str) -> Option<&str> {
    line.strip_prefix(SECTION_PREFIX).map(str::trim_end)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    sections: Vec<Section>,
}

impl Document {
    pub fn parse(text: &str) -> Self {
        let lines = text.split('\n').map(str::to_string).collect();
        let mut doc = Document {
            lines,
            sections: Vec::new(),
        };
        doc.reindex();
        doc
    }

    fn reindex(&mut self) {
        let mut sections: Vec<Section> = Vec::new();
        let mut offset = 0usize;
        for (idx, line) in self.lines.iter().enumerate() {
            if let Some(name) = marker_name(line) {
                if let Some(prev) = sections.last_mut() {
                    prev.body.end = idx;
                    prev.span.end = offset;
                }
                sections.push(Section {
                    name: name.to_string(),
                    marker: idx,
                    body: idx + 1..self.lines.len(),
                    span: offset..0,
                });
            }
            offset += line.len() + 1;
        }
        // The final line carries no trailing separator.
        let total = offset.saturating_sub(1);
        if let Some(last) = sections.last_mut() {
            last.span.end = total;
        }
        self.sections = sections;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The leading `# AI LEARNING FILE:` line, if the document opens with one.
    pub fn header(&self) -> Option<&str> {
        self.lines
            .first()
            .map(String::as_str)
            .filter(|l| l.starts_with(HEADER_PREFIX))
    }

    /// Text after `# AI LEARNING FILE: ` on the header line.
    pub fn title(&self) -> Option<&str> {
        self.header()
            .and_then(|h| h.strip_prefix(HEADER_PREFIX))
            .and_then(|rest| rest.strip_prefix(' '))
            .map(str::trim_end)
            .filter(|t| !t.is_empty())
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.sections.iter().any(|s| s.name == name)
    }

    /// Name-keyed lookup; a repeated name resolves to its last occurrence.
    pub fn locate_section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().rev().find(|s| s.name == name)
    }

    /// Verbatim body text of a section (lines joined with `\n`).
    pub fn section_body(&self, section: &Section) -> String {
        self.lines[section.body.clone()].join("\n")
    }

    pub fn body_of(&self, name: &str) -> Option<String> {
        self.locate_section(name).map(|s| self.section_body(s))
    }

    /// Inserts `new_lines` so that the first of them lands at `at`.
    pub fn insert_lines<I, S>(&mut self, at: usize, new_lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let at = at.min(self.lines.len());
        let tail = self.lines.split_off(at);
        self.lines.extend(new_lines.into_iter().map(Into::into));
        self.lines.extend(tail);
        self.reindex();
    }

    /// Drops every line for which `keep` is false; returns the original
    /// indices of the dropped lines in ascending order.
    pub fn retain_lines<F>(&mut self, mut keep: F) -> Vec<usize>
    where
        F: FnMut(&str) -> bool,
    {
        let mut dropped = Vec::new();
        let mut idx = 0usize;
        self.lines.retain(|line| {
            let kept = keep(line);
            if !kept {
                dropped.push(idx);
            }
            idx += 1;
            kept
        });
        if !dropped.is_empty() {
            self.reindex();
        }
        dropped
    }

    /// Swaps the lines in `range` for `new_lines`.
    pub fn replace_lines<I, S>(&mut self, range: Range<usize>, new_lines: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let end = range.end.min(self.lines.len());
        let start = range.start.min(end);
        let _ = self
            .lines
            .splice(start..end, new_lines.into_iter().map(Into::into));
        self.reindex();
    }

    pub fn replace_section_body(&mut self, name: &str, new_body: &str) -> Result<(), AidataError> {
        let body = self
            .locate_section(name)
            .map(|s| s.body.clone())
            .ok_or_else(|| AidataError::NotFound(format!("'{}' section", name)))?;
        self.replace_lines(body, new_body.split('\n'));
        Ok(())
    }

    /// Flushes the lines back to a single string.
    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}
