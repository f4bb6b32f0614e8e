//! Entity list input.
//!
//! Reads entity names from a CSV file, one per row. A column can be
//! picked by header name; without one the first column is used and a
//! leading header row is skipped if it looks like one.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

/// Read entity names from a CSV file.
///
/// Rows are trimmed and blank rows dropped. `column` selects a header
/// column by name (case-insensitive); when it is `None` the first
/// column is used.
pub fn read_entities(path: &Path, column: Option<&str>) -> Result<Vec<String>> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    read_entities_from(file, column)
}

fn read_entities_from<R: Read>(reader: R, column: Option<&str>) -> Result<Vec<String>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let first = match records.next() {
        Some(row) => row.context("Failed to read CSV row")?,
        None => return Ok(Vec::new()),
    };

    let mut entities = Vec::new();
    let index = match column {
        Some(name) => first
            .iter()
            .position(|cell| cell.trim().eq_ignore_ascii_case(name))
            .with_context(|| format!("Column '{name}' not found in CSV header"))?,
        None => {
            // First row is data unless it reads like a header
            if !looks_like_header(first.get(0).unwrap_or_default()) {
                push_trimmed(&mut entities, first.get(0));
            }
            0
        }
    };

    for row in records {
        let row = row.context("Failed to read CSV row")?;
        push_trimmed(&mut entities, row.get(index));
    }

    Ok(entities)
}

fn looks_like_header(cell: &str) -> bool {
    matches!(
        cell.trim().to_ascii_lowercase().as_str(),
        "entity" | "entities" | "name" | "company" | "organization"
    )
}

fn push_trimmed(entities: &mut Vec<String>, cell: Option<&str>) {
    if let Some(value) = cell {
        let value = value.trim();
        if !value.is_empty() {
            entities.push(value.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_plain_list_without_header() {
        let input = "Acme Corp\nGlobex\n\nInitech\n";
        let entities = read_entities_from(Cursor::new(input), None).unwrap();
        assert_eq!(entities, vec!["Acme Corp", "Globex", "Initech"]);
    }

    #[test]
    fn test_header_row_is_skipped() {
        let input = "entity\nAcme Corp\nGlobex\n";
        let entities = read_entities_from(Cursor::new(input), None).unwrap();
        assert_eq!(entities, vec!["Acme Corp", "Globex"]);
    }

    #[test]
    fn test_named_column() {
        let input = "id,company,city\n1,Acme Corp,Berlin\n2,Globex,Oslo\n";
        let entities = read_entities_from(Cursor::new(input), Some("company")).unwrap();
        assert_eq!(entities, vec!["Acme Corp", "Globex"]);
    }

    #[test]
    fn test_named_column_is_case_insensitive() {
        let input = "ID,Company\n1,Acme Corp\n";
        let entities = read_entities_from(Cursor::new(input), Some("COMPANY")).unwrap();
        assert_eq!(entities, vec!["Acme Corp"]);
    }

    #[test]
    fn test_missing_column_is_an_error() {
        let input = "id,name\n1,Acme\n";
        let err = read_entities_from(Cursor::new(input), Some("company")).unwrap_err();
        assert!(err.to_string().contains("company"));
    }

    #[test]
    fn test_quoted_names_keep_their_commas() {
        let input = "entity\n\"Acme, Inc.\"\n";
        let entities = read_entities_from(Cursor::new(input), None).unwrap();
        assert_eq!(entities, vec!["Acme, Inc."]);
    }

    #[test]
    fn test_empty_input() {
        let entities = read_entities_from(Cursor::new(""), None).unwrap();
        assert!(entities.is_empty());
    }
}
