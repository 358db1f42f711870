//! Reading of the CSV input table.

use std::path::Path;

use log::debug;

use crate::error::{Error, Result};

/// A header row plus the data rows aligned to it by position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl InputTable {
    /// Position of `column` in the header row.
    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == column)
    }
}

/// Reads a CSV file whose first record is the header row.
///
/// Header cells are trimmed. Data rows may be shorter or longer than the
/// header.
///
/// # Errors
/// * `Error::InputError` if the file cannot be read or parsed, or holds no
///   header or no data rows
pub fn read_table<P: AsRef<Path>>(csv_path: P) -> Result<InputTable> {
    let csv_path = csv_path.as_ref();
    let input_error = |e: csv::Error| Error::InputError(format!("{}: {}", csv_path.display(), e));

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_path(csv_path)
        .map_err(input_error)?;

    let headers: Vec<String> = reader.headers().map_err(input_error)?.iter().map(String::from).collect();
    if headers.is_empty() {
        return Err(Error::InputError(format!("'{}' is empty", csv_path.display())));
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(input_error)?;
        rows.push(record.iter().map(String::from).collect());
    }
    if rows.is_empty() {
        return Err(Error::InputError(format!("'{}' has no data rows", csv_path.display())));
    }

    debug!("Read {} row(s) from {}", rows.len(), csv_path.display());
    Ok(InputTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_csv(content: &str) -> (TempDir, std::path::PathBuf) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.csv");
        fs::write(&path, content).unwrap();
        (temp_dir, path)
    }

    #[test]
    fn test_read_table() {
        let (_dir, path) = write_csv("Name, City\nAnn,Paris\n\"Bo, Jr\",Rome\n");
        let table = read_table(&path).unwrap();

        assert_eq!(table.headers, vec!["Name", "City"]);
        assert_eq!(table.rows, vec![vec!["Ann", "Paris"], vec!["Bo, Jr", "Rome"]]);
        assert_eq!(table.column_index("City"), Some(1));
        assert_eq!(table.column_index("Zip"), None);
    }

    #[test]
    fn test_ragged_rows_are_kept() {
        let (_dir, path) = write_csv("A,B,C\n1\n1,2,3,4\n");
        let table = read_table(&path).unwrap();
        assert_eq!(table.rows[0], vec!["1"]);
        assert_eq!(table.rows[1].len(), 4);
    }

    #[test]
    fn test_empty_file_is_input_error() {
        let (_dir, path) = write_csv("");
        assert!(matches!(read_table(&path), Err(Error::InputError(_))));
    }

    #[test]
    fn test_header_only_is_input_error() {
        let (_dir, path) = write_csv("Name,City\n");
        assert!(matches!(read_table(&path), Err(Error::InputError(_))));
    }

    #[test]
    fn test_missing_file_is_input_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = read_table(temp_dir.path().join("nope.csv"));
        assert!(matches!(result, Err(Error::InputError(_))));
    }
}
