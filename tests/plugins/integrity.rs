use aidata::core::document::Document;
use aidata::core::store::WriteMode;
use aidata::plugins::integrity::{
    HASH_LINE_PREFIX, IntegrityStatus, generate_hash, hash_text, verify_hash,
};
use aidata::plugins::validate::{ValidationOptions, validate_file};
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

const SAMPLE: &str = include_str!("../fixtures/sample.aidata");

fn sample_file(text: &str) -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("runtime.aidata");
    fs::write(&path, text).unwrap();
    (tmp, path)
}

#[test]
fn test_first_run_inserts_line_at_end_of_metadata() {
    let (_tmp, path) = sample_file(SAMPLE);
    let refresh = generate_hash(&path, WriteMode::Direct).unwrap();
    assert!(!refresh.replaced);
    assert_eq!(refresh.hash, hash_text(SAMPLE));

    let written = fs::read_to_string(&path).unwrap();
    let doc = Document::parse(&written);
    let meta = doc.locate_section("FILE METADATA").unwrap();
    let last_body_line = &doc.lines()[meta.body.end - 1];
    assert_eq!(last_body_line, &format!("{}{}", HASH_LINE_PREFIX, refresh.hash));
    assert_eq!(doc.lines()[meta.body.end], "## DOMAIN CONTEXT");

    assert!(validate_file(&path, &ValidationOptions::default()).unwrap().ok);
}

#[test]
fn test_generate_is_idempotent() {
    let (_tmp, path) = sample_file(SAMPLE);
    let first = generate_hash(&path, WriteMode::Direct).unwrap();
    let after_first = fs::read_to_string(&path).unwrap();
    let second = generate_hash(&path, WriteMode::Atomic).unwrap();
    let after_second = fs::read_to_string(&path).unwrap();

    assert_eq!(first.hash, second.hash);
    assert_eq!(first.line, second.line);
    assert_eq!(after_first, after_second);
}

#[test]
fn test_hash_ignores_previous_hash_value() {
    let stale = SAMPLE.replace(
        "- **Classification**: Internal\n",
        "- **Classification**: Internal\n- **Integrity Hash**: SHA256-0000000000000000000000000000000000000000000000000000000000000000\n",
    );
    let (_a, clean_path) = sample_file(SAMPLE);
    let (_b, stale_path) = sample_file(&stale);

    let clean = generate_hash(&clean_path, WriteMode::Direct).unwrap();
    let from_stale = generate_hash(&stale_path, WriteMode::Direct).unwrap();
    assert_eq!(clean.hash, from_stale.hash);
    assert!(from_stale.replaced);

    let rewritten = fs::read_to_string(&stale_path).unwrap();
    assert!(rewritten.contains(&format!(
        "- **Classification**: Internal\n{}{}\n",
        HASH_LINE_PREFIX, from_stale.hash
    )));
}

#[test]
fn test_verify_tracks_edits() {
    let (_tmp, path) = sample_file(SAMPLE);
    assert_eq!(verify_hash(&path).unwrap(), IntegrityStatus::Missing);

    generate_hash(&path, WriteMode::Direct).unwrap();
    assert!(verify_hash(&path).unwrap().is_valid());

    let edited = fs::read_to_string(&path)
        .unwrap()
        .replace("Futures are lazy", "Futures are eager");
    fs::write(&path, edited).unwrap();
    assert!(matches!(
        verify_hash(&path).unwrap(),
        IntegrityStatus::Mismatch { .. }
    ));
    let report = validate_file(&path, &ValidationOptions::default()).unwrap();
    assert!(!report.ok);
}

#[test]
fn test_missing_metadata_section_leaves_file_untouched() {
    let text = "# AI LEARNING FILE: x\n## DOMAIN CONTEXT\nbody\n";
    let (_tmp, path) = sample_file(text);
    assert!(generate_hash(&path, WriteMode::Direct).is_err());
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}
