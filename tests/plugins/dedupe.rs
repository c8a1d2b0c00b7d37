use aidata::core::document::Document;
use aidata::core::error::AidataError;
use aidata::core::store::WriteMode;
use aidata::plugins::dedupe::{DedupeOutcome, deduplicate_file, scan_learnings};
use std::fs;
use std::path::PathBuf;
use tempfile::{TempDir, tempdir};

const SAMPLE: &str = include_str!("../fixtures/sample.aidata");

fn with_entries(entries: &[(&str, &str)]) -> String {
    let mut text = SAMPLE.to_string();
    for (ts, body) in entries {
        text.push_str(&format!("\n### Learning Entry - {}\n{}\n", ts, body));
    }
    text
}

fn write(text: &str) -> (TempDir, PathBuf) {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("learnings.aidata");
    fs::write(&path, text).unwrap();
    (tmp, path)
}

const FIVE: &str = "line one\nline two\nline three\nline four\nline five";

#[test]
fn test_same_stamp_and_first_five_lines_removes_one() {
    let text = with_entries(&[
        ("2024-01-01 10:00:00", &format!("{}\ntrailing A", FIVE)),
        ("2024-01-01 10:00:00", &format!("{}\ntrailing B differs", FIVE)),
    ]);
    let (_tmp, path) = write(&text);

    let outcome = deduplicate_file(&path, WriteMode::Direct, |_| true).unwrap();
    assert_eq!(outcome, DedupeOutcome::Applied { removed: 1, kept: 3 });

    let written = fs::read_to_string(&path).unwrap();
    assert!(written.contains("trailing A"));
    assert!(!written.contains("trailing B differs"));
    assert_eq!(written, with_entries(&[("2024-01-01 10:00:00", &format!("{}\ntrailing A", FIVE))]));
}

#[test]
fn test_difference_within_first_five_lines_keeps_both() {
    let text = with_entries(&[
        ("2024-01-01 10:00:00", FIVE),
        ("2024-01-01 10:00:00", &FIVE.replace("line four", "line 4")),
    ]);
    let (_tmp, path) = write(&text);
    let outcome = deduplicate_file(&path, WriteMode::Direct, |_| true).unwrap();
    assert_eq!(outcome, DedupeOutcome::Applied { removed: 0, kept: 4 });
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_second_run_is_a_no_op() {
    let text = with_entries(&[
        ("2024-01-01 10:00:00", FIVE),
        ("2024-01-03 08:00:00", "unique"),
        ("2024-01-01 10:00:00", FIVE),
        ("2024-01-03 08:00:00", "unique"),
    ]);
    let (_tmp, path) = write(&text);

    let first = deduplicate_file(&path, WriteMode::Direct, |_| true).unwrap();
    assert_eq!(first, DedupeOutcome::Applied { removed: 2, kept: 4 });
    let after_first = fs::read_to_string(&path).unwrap();

    let second = deduplicate_file(&path, WriteMode::Atomic, |_| true).unwrap();
    assert_eq!(second, DedupeOutcome::Applied { removed: 0, kept: 4 });
    assert_eq!(fs::read_to_string(&path).unwrap(), after_first);
}

#[test]
fn test_duplicate_of_fixture_entry_is_found_across_the_section() {
    let text = with_entries(&[(
        "2024-01-01 10:00:00",
        "Observation: blocking calls inside async tasks stall the executor.\nSource: incident review\nConfidence: high\nTags: tokio, blocking\nAction: move the call into spawn_blocking\nExtra: later note",
    )]);
    let doc = Document::parse(&text);
    assert_eq!(scan_learnings(&doc).unwrap().entries.len(), 3);

    let (_tmp, path) = write(&text);
    let outcome = deduplicate_file(&path, WriteMode::Direct, |_| true).unwrap();
    assert_eq!(outcome, DedupeOutcome::Applied { removed: 1, kept: 2 });
    assert_eq!(fs::read_to_string(&path).unwrap(), SAMPLE);
}

#[test]
fn test_declining_leaves_file_untouched() {
    let text = with_entries(&[("2024-01-01 10:00:00", FIVE), ("2024-01-01 10:00:00", FIVE)]);
    let (_tmp, path) = write(&text);

    let mut prompted_with = None;
    let outcome = deduplicate_file(&path, WriteMode::Direct, |n| {
        prompted_with = Some(n);
        false
    })
    .unwrap();
    assert_eq!(prompted_with, Some(1));
    assert_eq!(outcome, DedupeOutcome::Declined { duplicates: 1 });
    assert_eq!(outcome.message(), "Operation cancelled by user.");
    assert_eq!(fs::read_to_string(&path).unwrap(), text);
}

#[test]
fn test_missing_learnings_section() {
    let (_tmp, path) = write("# AI LEARNING FILE: x\n## FILE METADATA\n");
    let err = deduplicate_file(&path, WriteMode::Direct, |_| true).unwrap_err();
    assert!(matches!(err, AidataError::NotFound(_)));
}

#[test]
fn test_sections_after_learnings_survive_removal_of_last_entry() {
    let entry = format!("### Learning Entry - 2024-01-01 10:00:00\n{}\n", FIVE);
    let text = format!(
        "## AUTOMATED LEARNINGS\n\n{entry}\n{entry}\n## APPENDIX\nappendix text\n",
        entry = entry
    );
    let (_tmp, path) = write(&text);

    let outcome = deduplicate_file(&path, WriteMode::Direct, |_| true).unwrap();
    assert_eq!(outcome, DedupeOutcome::Applied { removed: 1, kept: 1 });
    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        format!("## AUTOMATED LEARNINGS\n\n{}\n## APPENDIX\nappendix text\n", entry)
    );

    let doc = Document::parse(&text);
    let scan = scan_learnings(&doc).unwrap();
    assert_eq!(scan.tail.end, doc.locate_section("APPENDIX").unwrap().marker);
}
