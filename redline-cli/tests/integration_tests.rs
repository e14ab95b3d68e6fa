//! Integration tests for the redline CLI
//!
//! Tests end-to-end command behavior using the CLI binary.
//! Uses tempfile for isolated test directories.

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Run redline with the given args in the specified directory
fn run_redline(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_redline"))
        .current_dir(dir)
        .args(args)
        .output()
        .expect("Failed to execute redline command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn json(output: &Output) -> serde_json::Value {
    serde_json::from_slice(&output.stdout).expect("stdout is not JSON")
}

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write test file");
    path
}

const NUMBERING: &str = r#"<w:numbering xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:abstractNum w:abstractNumId="0"><w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/><w:lvlText w:val="%1."/></w:lvl></w:abstractNum><w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num></w:numbering>"#;

/// Minimal package whose paragraphs are all items of one decimal list.
fn numbered_docx(items: &[&str]) -> Vec<u8> {
    let paragraphs: String = items
        .iter()
        .map(|text| {
            format!(
                r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="0"/><w:numId w:val="1"/></w:numPr></w:pPr><w:r><w:t>{}</w:t></w:r></w:p>"#,
                text
            )
        })
        .collect();
    let document = format!(
        r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{}</w:body></w:document>"#,
        paragraphs
    );

    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    writer.start_file("word/document.xml", options).unwrap();
    writer.write_all(document.as_bytes()).unwrap();
    writer.start_file("word/numbering.xml", options).unwrap();
    writer.write_all(NUMBERING.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}

// ============================================================================
// General
// ============================================================================

#[test]
fn test_no_command_prints_help() {
    let temp = TempDir::new().unwrap();
    let output = run_redline(temp.path(), &[]);

    assert!(output.status.success());
    assert!(stdout(&output).contains("Usage"));
}

#[test]
fn test_version() {
    let temp = TempDir::new().unwrap();
    let output = run_redline(temp.path(), &["--version"]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(env!("CARGO_PKG_VERSION")));
}

// ============================================================================
// compare
// ============================================================================

#[test]
fn test_compare_json() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "v1.txt", b"The fee is $100.");
    write_file(temp.path(), "v2.txt", b"The fee is $200.");

    let output = run_redline(temp.path(), &["compare", "v1.txt", "v2.txt", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let body = json(&output);
    assert_eq!(body["original"], "v1.txt");
    assert_eq!(body["stats"]["totalChanges"], 2);
    assert_eq!(body["sections"][0]["name"], "Document Start");
    assert!(body.get("categorizedChanges").is_none());
}

#[test]
fn test_compare_classify() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "v1.txt", b"The Supplier shall deliver within 10 days.");
    write_file(temp.path(), "v2.txt", b"The Supplier shall deliver within 14 days.");

    let output = run_redline(
        temp.path(),
        &["compare", "v1.txt", "v2.txt", "--classify", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let body = json(&output);
    let changes = body["categorizedChanges"].as_array().unwrap();
    let labelled: Vec<_> = changes.iter().filter(|c| c["kind"] != "equal").collect();
    assert!(!labelled.is_empty());
    for change in labelled {
        assert_eq!(change["category"], "substantive");
        assert_eq!(change["classifiedBy"], "heuristic");
    }
}

#[test]
fn test_compare_table_groups_by_section() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "v1.txt",
        b"1. TERM\n\nOne year.\n\n2. PAYMENT\n\nThe fee is $100.",
    );
    write_file(
        temp.path(),
        "v2.txt",
        b"1. TERM\n\nOne year.\n\n2. PAYMENT\n\nThe fee is $200.",
    );

    let output = run_redline(temp.path(), &["compare", "v1.txt", "v2.txt", "-c"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let text = stdout(&output);
    assert!(text.contains("REDLINE:"));
    assert!(text.contains("2. PAYMENT"));
    assert!(!text.contains("1. TERM"));
    assert!(text.contains("[substantive]"));
}

#[test]
fn test_compare_typographic_variants_are_equal() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "v1.txt", "\u{201C}Buyer\u{201D} \u{2014} Seller".as_bytes());
    write_file(temp.path(), "v2.txt", b"\"Buyer\" - Seller");

    let output = run_redline(temp.path(), &["compare", "v1.txt", "v2.txt"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("No differences."));
}

#[test]
fn test_compare_docx() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "v1.docx", &numbered_docx(&["TERM", "NOTICES"]));
    write_file(temp.path(), "v2.docx", &numbered_docx(&["TERM", "PAYMENT", "NOTICES"]));

    let output = run_redline(
        temp.path(),
        &["compare", "v1.docx", "v2.docx", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let body = json(&output);
    assert_eq!(body["normalizedOriginal"], "1. TERM\n\n2. NOTICES");
    assert!(body["stats"]["insertions"].as_u64().unwrap() > 0);
}

#[test]
fn test_compare_missing_file() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "v1.txt", b"text");

    let output = run_redline(temp.path(), &["compare", "v1.txt", "nope.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("nope.txt"));
}

#[test]
fn test_compare_respects_input_limit() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "redline.toml", b"[limits]\nmax_input_chars = 5\n");
    write_file(temp.path(), "v1.txt", b"longer than five");
    write_file(temp.path(), "v2.txt", b"short");

    let output = run_redline(temp.path(), &["compare", "v1.txt", "v2.txt"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("too large"));
}

#[test]
fn test_remote_without_endpoint_fails() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "v1.txt", b"a");
    write_file(temp.path(), "v2.txt", b"b");

    let output = run_redline(temp.path(), &["compare", "v1.txt", "v2.txt", "--remote"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("endpoint"));
}

// ============================================================================
// categorize
// ============================================================================

#[test]
fn test_categorize_ops_file() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "ops.json",
        br#"{"changes": [
            {"id": 0, "kind": "equal", "text": "The Buyer "},
            {"id": 1, "kind": "delete", "text": "may"},
            {"id": 2, "kind": "insert", "text": "shall"},
            {"id": 3, "kind": "insert", "text": "  "}
        ]}"#,
    );

    let output = run_redline(temp.path(), &["categorize", "ops.json", "--format", "json"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let body = json(&output);
    let changes = body["categorizedChanges"].as_array().unwrap();
    assert_eq!(changes.len(), 4);
    assert!(changes[0].get("category").is_none());
    assert_eq!(changes[2]["category"], "substantive");
    assert_eq!(changes[3]["category"], "formatting");
}

#[test]
fn test_categorize_rejects_bad_json() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "ops.json", br#"{"ops": []}"#);

    let output = run_redline(temp.path(), &["categorize", "ops.json"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("changes"));
}

// ============================================================================
// extract / normalize
// ============================================================================

#[test]
fn test_extract_docx_restores_numbering() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "contract.docx", &numbered_docx(&["TERM", "PAYMENT"]));

    let output = run_redline(temp.path(), &["extract", "contract.docx"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output).trim_end(), "1. TERM\n\n2. PAYMENT");
}

#[test]
fn test_extract_with_declared_type() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "contract.bin", &numbered_docx(&["TERM"]));

    let output = run_redline(
        temp.path(),
        &["extract", "contract.bin", "--type", "docx", "--format", "json"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let body = json(&output);
    assert_eq!(body["format"], "docx");
    assert_eq!(body["text"], "1. TERM");
    assert_eq!(body["characters"], 7);
}

#[test]
fn test_extract_unsupported_type() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "scan.pdf", b"%PDF-1.7");

    let output = run_redline(temp.path(), &["extract", "scan.pdf", "--type", "pdf"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Unsupported file type"));
}

#[test]
fn test_extract_corrupt_docx() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "broken.docx", b"not a zip archive");

    let output = run_redline(temp.path(), &["extract", "broken.docx"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("broken.docx"));
}

#[test]
fn test_normalize() {
    let temp = TempDir::new().unwrap();
    write_file(
        temp.path(),
        "quote.txt",
        "\u{201C}Goods\u{201D} \u{2026} \u{00BD}".as_bytes(),
    );

    let output = run_redline(temp.path(), &["normalize", "quote.txt"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output).trim_end(), "\"Goods\" ... 1/2");
}

#[test]
fn test_normalize_compact_json() {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "plain.txt", b"already plain");

    let output = run_redline(
        temp.path(),
        &["normalize", "plain.txt", "--format", "json", "--compact"],
    );
    assert!(output.status.success());

    let text = stdout(&output);
    assert_eq!(text.trim_end().lines().count(), 1);
    let body = json(&output);
    assert_eq!(body["changed"], false);
    assert_eq!(body["text"], "already plain");
}
