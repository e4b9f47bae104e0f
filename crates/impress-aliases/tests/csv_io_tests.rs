//! CSV roster file tests

#![cfg(feature = "csv")]

use std::fs;

use impress_aliases::csv_io::{
    read_records_from_path, read_roster_from_path, write_resolution_to_path,
};
use impress_aliases::{AliasConfig, AliasError, AliasResolver};
use tempfile::TempDir;

const ROSTER: &str = "\
name,email,login,team
John Smith,john.smith@corp.com,jsmith,core
,john.smith@corp.com,jsmith-bot,core
Alice Brown,alice@corp.com,abrown,web
\"Brown, Alice\",,abrown,web
Bob Green,bob@corp.com,bgreen,ops
";

#[test]
fn test_resolve_roster_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("roster.csv");
    let output = dir.path().join("resolved.csv");
    fs::write(&input, ROSTER).unwrap();

    let roster = read_roster_from_path(&input).unwrap();
    assert_eq!(roster.len(), 5);

    let resolution = AliasResolver::new(AliasConfig::default())
        .resolve(roster.records())
        .unwrap();
    write_resolution_to_path(&output, &roster, &resolution).unwrap();

    let written = read_roster_from_path(&output).unwrap();
    let headers: Vec<&str> = written.headers().iter().collect();
    assert_eq!(headers, ["name", "email", "login", "team", "full_id", "cluster"]);

    let text = fs::read_to_string(&output).unwrap();
    let clusters: Vec<String> = text
        .lines()
        .skip(1)
        .map(|line| line.rsplit(',').next().unwrap().to_string())
        .collect();
    assert_eq!(clusters, ["0", "0", "1", "1", "2"]);
    // Extra columns and quoting survive
    assert!(text.contains("\"Brown, Alice\",,abrown,web,"));
}

#[test]
fn test_missing_login_column() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("roster.csv");
    fs::write(&input, "name,email\nJohn,j@x.com\n").unwrap();

    let err = read_records_from_path(&input).unwrap_err();
    assert!(matches!(err, AliasError::MissingColumn(ref c) if c == "login"));
}

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = read_roster_from_path(dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, AliasError::Io(_)));
}
