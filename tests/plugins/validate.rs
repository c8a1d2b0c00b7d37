use aidata::core::document::{Document, MANDATORY_SECTIONS};
use aidata::plugins::integrity;
use aidata::plugins::validate::{ValidationOptions, validate, validate_file};
use std::fs;
use tempfile::tempdir;

const SAMPLE: &str = include_str!("../fixtures/sample.aidata");

fn minimal_doc() -> String {
    let mut text = String::from("# AI LEARNING FILE: Minimal\n\n## CREATED\n2024-01-01 00:00:00\n");
    for name in MANDATORY_SECTIONS {
        text.push_str(&format!("\n## {}\nBody of {}.\n", name, name.to_lowercase()));
    }
    text
}

fn without_markers(text: &str, names: &[&str]) -> String {
    text.split('\n')
        .filter(|line| {
            !names
                .iter()
                .any(|n| line.strip_prefix("## ").map(str::trim_end) == Some(*n))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[test]
fn test_sample_passes_lenient_and_strict() {
    let doc = Document::parse(SAMPLE);
    assert!(validate(&doc, &ValidationOptions::default()).ok);

    let strict = ValidationOptions {
        strict_metadata: true,
        ..ValidationOptions::default()
    };
    let report = validate(&doc, &strict);
    assert!(report.ok, "{}", report.message);
}

#[test]
fn test_every_missing_subset_is_reported_exactly() {
    let base = minimal_doc();
    for mask in 1u32..(1 << MANDATORY_SECTIONS.len()) {
        let removed: Vec<&str> = MANDATORY_SECTIONS
            .iter()
            .enumerate()
            .filter(|(i, _)| mask & (1 << i) != 0)
            .map(|(_, n)| *n)
            .collect();
        let report = validate(
            &Document::parse(&without_markers(&base, &removed)),
            &ValidationOptions::default(),
        );
        assert!(!report.ok, "mask {:b} should fail", mask);
        assert_eq!(report.missing_sections, removed, "mask {:b}", mask);
    }
}

#[test]
fn test_missing_validation_framework_reports_only_that_section() {
    let text = without_markers(&minimal_doc(), &["VALIDATION FRAMEWORK"]);
    let report = validate(&Document::parse(&text), &ValidationOptions::default());
    assert!(!report.ok);
    assert_eq!(report.missing_sections, vec!["VALIDATION FRAMEWORK"]);
}

#[test]
fn test_minimal_document_passes_after_hash_generation() {
    let mut doc = Document::parse(&minimal_doc());
    assert!(validate(&doc, &ValidationOptions::default()).ok);
    integrity::refresh_hash(&mut doc).unwrap();
    let report = validate(&doc, &ValidationOptions::default());
    assert!(report.ok, "{}", report.message);
}

#[test]
fn test_validate_file_never_writes() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("broken.aidata");
    let text = without_markers(SAMPLE, &["DOMAIN CONTEXT"]);
    fs::write(&path, &text).unwrap();

    let report = validate_file(&path, &ValidationOptions::default()).unwrap();
    assert!(!report.ok);
    assert_eq!(report.missing_sections, vec!["DOMAIN CONTEXT"]);
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_validate_file_missing_path_is_io_error() {
    let tmp = tempdir().unwrap();
    let err = validate_file(&tmp.path().join("nope.aidata"), &ValidationOptions::default())
        .unwrap_err();
    assert!(format!("{}", err).starts_with("I/O error"));
}
