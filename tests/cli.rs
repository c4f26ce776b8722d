//! Integration tests for the `sxi` command line.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use std::sync::OnceLock;

static FIXTURE_FILE: OnceLock<PathBuf> = OnceLock::new();

/// JSON-lines record file shared by the query tests
fn fixture_file() -> PathBuf {
    FIXTURE_FILE
        .get_or_init(|| {
            let dir = std::env::temp_dir()
                .join("sxi_test_fixtures")
                .join(format!("test_{}", std::process::id()));
            fs::create_dir_all(&dir).expect("Failed to create fixture dir");
            let path = dir.join("records.jsonl");
            fs::write(
                &path,
                concat!(
                    r#"{"id": 1, "strings": ["ASDK", "EEF"]}"#,
                    "\n",
                    r#"{"id": 2, "strings": ["DKI"]}"#,
                    "\n\n",
                    r#"{"id": 3, "strings": ["Сам Рашн Текст"]}"#,
                    "\n",
                ),
            )
            .expect("Failed to write fixture file");
            path
        })
        .clone()
}

fn sxi(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_sxi"))
        .args(args)
        .output()
        .expect("Failed to run sxi")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_query_contains() {
    let file = fixture_file();
    let output = sxi(&["query", file.to_str().unwrap(), "--contains", "DK"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "1\n2\n");
}

#[test]
fn test_query_ends_with_unicode() {
    let file = fixture_file();
    let output = sxi(&["query", file.to_str().unwrap(), "--ends-with", "Текст"]);
    assert!(output.status.success());
    assert_eq!(stdout(&output), "3\n");
}

#[test]
fn test_query_sharded_rejects_ends_with() {
    let file = fixture_file();
    let output = sxi(&["query", file.to_str().unwrap(), "--ends-with", "DK", "--shards", "2"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unsupported query: EndsWith"), "stderr: {}", stderr);
}

#[test]
fn test_query_requires_pattern() {
    let file = fixture_file();
    let output = sxi(&["query", file.to_str().unwrap()]);
    assert!(!output.status.success());
}

#[test]
fn test_verify_small_pack() {
    let output = sxi(&["-q", "verify", "-n", "500", "--probes", "100", "--absent", "100", "--shards", "2"]);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("200 present and 100 absent probes verified"));
}

#[test]
fn test_stats_json() {
    let output = sxi(&["stats", "-n", "10", "--seed", "1"]);
    assert!(output.status.success());
    let stats: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(stats["record_count"], 10);
    assert_eq!(stats["suffix_count"], 500);
}
