//! CSV roster reading and resolution output
//!
//! Input must have `name`, `email`, and `login` columns; `full_id` is
//! optional. Empty cells are treated as absent values. Extra columns are
//! carried through to the output unchanged.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{AliasError, Result};
use crate::record::UserRecord;
use crate::resolver::Resolution;

const REQUIRED_COLUMNS: [&str; 3] = ["name", "email", "login"];

/// A roster as read from CSV, with its original columns.
#[derive(Debug, Clone)]
pub struct Roster {
    headers: csv::StringRecord,
    rows: Vec<csv::StringRecord>,
    records: Vec<UserRecord>,
}

impl Roster {
    pub fn headers(&self) -> &csv::StringRecord {
        &self.headers
    }

    pub fn records(&self) -> &[UserRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Option<usize> {
    headers.iter().position(|h| h.trim() == name)
}

fn cell(row: &csv::StringRecord, index: Option<usize>) -> Option<String> {
    index
        .and_then(|i| row.get(i))
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Read a roster from any CSV source.
pub fn read_roster<R: Read>(reader: R) -> Result<Roster> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);
    let headers = reader.headers()?.clone();

    let mut required = [0usize; 3];
    for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = column_index(&headers, column)
            .ok_or_else(|| AliasError::MissingColumn(column.to_string()))?;
    }
    let [name_col, email_col, login_col] = required;
    let full_id_col = column_index(&headers, "full_id");

    let mut rows = Vec::new();
    let mut records = Vec::new();
    for result in reader.records() {
        let row = result?;
        records.push(UserRecord {
            name: cell(&row, Some(name_col)),
            email: cell(&row, Some(email_col)),
            login: cell(&row, Some(login_col)),
            full_id: cell(&row, full_id_col),
        });
        rows.push(row);
    }

    tracing::debug!(rows = records.len(), "read roster");
    Ok(Roster {
        headers,
        rows,
        records,
    })
}

/// Read only the user records from a CSV source.
pub fn read_records<R: Read>(reader: R) -> Result<Vec<UserRecord>> {
    Ok(read_roster(reader)?.records)
}

/// Read a roster from a CSV file.
pub fn read_roster_from_path(path: impl AsRef<Path>) -> Result<Roster> {
    let file = File::open(path)?;
    read_roster(BufReader::new(file))
}

/// Read only the user records from a CSV file.
pub fn read_records_from_path(path: impl AsRef<Path>) -> Result<Vec<UserRecord>> {
    Ok(read_roster_from_path(path)?.records)
}

/// Write the roster with `full_id` (if it was not an input column) and
/// `cluster` appended. Empty `full_id` cells are filled with the key used
/// for the join; missing cluster ids are written as empty cells.
pub fn write_resolution<W: Write>(writer: W, roster: &Roster, resolution: &Resolution) -> Result<()> {
    if roster.rows.len() != resolution.records().len() {
        return Err(AliasError::MatrixShape {
            expected: roster.rows.len(),
            got: resolution.records().len(),
        });
    }

    let full_id_col = column_index(&roster.headers, "full_id");
    let mut writer = csv::Writer::from_writer(writer);

    let mut headers = roster.headers.clone();
    if full_id_col.is_none() {
        headers.push_field("full_id");
    }
    headers.push_field("cluster");
    writer.write_record(&headers)?;

    for (row, resolved) in roster.rows.iter().zip(resolution.records()) {
        let mut out = match full_id_col {
            // Empty key cells are filled with the synthesized key used for the join
            Some(col) => row
                .iter()
                .enumerate()
                .map(|(i, value)| {
                    if i == col && value.is_empty() {
                        resolved.full_id.as_str()
                    } else {
                        value
                    }
                })
                .collect::<csv::StringRecord>(),
            None => {
                let mut out = row.clone();
                out.push_field(&resolved.full_id);
                out
            }
        };
        let cluster = resolved.cluster.map(|c| c.to_string()).unwrap_or_default();
        out.push_field(&cluster);
        writer.write_record(&out)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a resolution to a CSV file.
pub fn write_resolution_to_path(
    path: impl AsRef<Path>,
    roster: &Roster,
    resolution: &Resolution,
) -> Result<()> {
    let file = File::create(path)?;
    write_resolution(BufWriter::new(file), roster, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::AliasResolver;

    #[test]
    fn test_read_records() {
        let data = "name,email,login,team\nJohn Smith,js@x.com,jsmith,core\n,,octocat,web\n";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name.as_deref(), Some("John Smith"));
        assert_eq!(records[1].name, None);
        assert_eq!(records[1].email, None);
        assert_eq!(records[1].full_id(), "::octocat");
    }

    #[test]
    fn test_full_id_column() {
        let data = "full_id,name,email,login\nu1,Ann,,ann\n";
        let records = read_records(data.as_bytes()).unwrap();
        assert_eq!(records[0].full_id(), "u1");
    }

    #[test]
    fn test_empty_full_id_cell_filled() {
        let data = "full_id,name,email,login\n,Ann,,ann\nu2,Bob,,bob\n";
        let roster = read_roster(data.as_bytes()).unwrap();
        let resolution = AliasResolver::default().resolve(roster.records()).unwrap();

        let mut out = Vec::new();
        write_resolution(&mut out, &roster, &resolution).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "full_id,name,email,login,cluster");
        assert_eq!(lines[1], "Ann::ann,Ann,,ann,0");
        assert_eq!(lines[2], "u2,Bob,,bob,1");
    }

    #[test]
    fn test_missing_column() {
        let data = "name,email\nJohn,j@x.com\n";
        let err = read_records(data.as_bytes()).unwrap_err();
        assert!(matches!(err, AliasError::MissingColumn(ref c) if c == "login"));
    }

    #[test]
    fn test_write_resolution() {
        let data = "name,email,login\nJohn Smith,j.smith@x.com,jsmith\n,j.smith@x.com,js2\n";
        let roster = read_roster(data.as_bytes()).unwrap();
        let resolution = AliasResolver::default().resolve(roster.records()).unwrap();

        let mut out = Vec::new();
        write_resolution(&mut out, &roster, &resolution).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "name,email,login,full_id,cluster");
        assert!(lines[1].ends_with(",0"));
        assert!(lines[2].ends_with(",0"));
    }
}
