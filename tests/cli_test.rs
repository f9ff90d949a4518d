//! Integration tests for the encoder CLI.
//!
//! These tests run the actual binary against the requests in `tests/data`
//! and inspect the written file and the CSV summary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Get path to test data file
fn test_data_path(filename: &str) -> String {
    format!("tests/data/{}", filename)
}

fn encoder_cmd() -> Command {
    let mut cmd = Command::cargo_bin("cnab240-encoder").unwrap();
    cmd.env("CNAB_GENERATED_AT", "2024-03-15T09:30:00");
    cmd
}

#[test]
fn test_supplier_file_written_to_output_path() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.rem");

    encoder_cmd()
        .arg(test_data_path("supplier.json"))
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("batch,service,payments,records,total"))
        .stdout(predicate::str::contains("1,supplier,1,3,1500.10"))
        .stdout(predicate::str::contains("file,,1,5,1500.10"));

    let content = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = content.split('\n').collect();
    assert_eq!(lines.len(), 5);
    assert!(lines.iter().all(|l| l.len() == 240));
    assert_eq!(&lines[0][143..157], "15032024093000");
    assert_eq!(&lines[0][72..102], "ACME COMERCIO LTDA            ");
    assert!(!content.ends_with('\n'));
}

#[test]
fn test_default_output_next_to_request() {
    let dir = TempDir::new().unwrap();
    let request = dir.path().join("folha.json");
    fs::copy(test_data_path("payroll.json"), &request).unwrap();

    encoder_cmd()
        .arg(&request)
        .assert()
        .success()
        .stdout(predicate::str::contains("1,payroll,1,5,3500.00"));

    let content = fs::read_to_string(dir.path().join("folha.rem")).unwrap();
    assert_eq!(content.lines().count(), 7);
}

#[test]
fn test_environment_sets_file_sequence() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("seq.rem");

    encoder_cmd()
        .env("CNAB_FILE_SEQUENCE", "345")
        .arg(test_data_path("supplier.json"))
        .arg(&output)
        .assert()
        .success();

    let content = fs::read_to_string(&output).unwrap();
    assert_eq!(&content[157..163], "000345");
}

#[test]
fn test_mixed_request_summary() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("mixed.rem");

    encoder_cmd()
        .arg(test_data_path("mixed.json"))
        .arg(&output)
        .assert()
        .success()
        .stdout(predicate::str::contains("2,boleto,1,4,260.00"))
        .stdout(predicate::str::contains("3,tax,2,6,1076.05"))
        .stdout(predicate::str::contains("4,pix,2,6,62.50"))
        .stdout(predicate::str::contains("file,,6,23,1498.55"));
}

#[test]
fn test_missing_argument() {
    let mut cmd = Command::cargo_bin("cnab240-encoder").unwrap();
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing input file argument"));
}

#[test]
fn test_nonexistent_file() {
    let mut cmd = Command::cargo_bin("cnab240-encoder").unwrap();
    cmd.arg("nonexistent_file.json")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn test_unsupported_service_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("bad.rem");

    encoder_cmd()
        .arg(test_data_path("unsupported_service.json"))
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Batch 1: Unsupported service type: 77"));

    assert!(!output.exists());
}

#[test]
fn test_missing_company_fails() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("none.rem");

    encoder_cmd()
        .arg(test_data_path("missing_company.json"))
        .arg(&output)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing required field in request: company"));

    assert!(!output.exists());
}
