//! Output path computation.
//!
//! Every rendering lands at `<output root>/<path part>/<save name>`, where the
//! path part comes from one CSV column and the save name from the template's
//! own path.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::table::InputTable;

fn missing_column(column: &str, table: &str, headers: &[String]) -> Error {
    Error::MissingColumnError {
        column: column.to_string(),
        table: table.to_string(),
        headers: headers.join(","),
    }
}

/// Checks once, before rendering, that every row has a value for `column`.
///
/// # Returns
/// * `Result<usize>` - Index of the column in the header row
///
/// # Errors
/// * `Error::MissingColumnError` if the header lacks the column or a row is
///   too short to reach it
pub fn validate_path_part_column(table: &InputTable, column: &str, table_name: &str) -> Result<usize> {
    let index = table
        .column_index(column)
        .ok_or_else(|| missing_column(column, &format!("the csv file '{table_name}'"), &table.headers))?;

    if table.rows.iter().any(|row| row.len() <= index) {
        return Err(missing_column(
            column,
            &format!("every row of the csv file '{table_name}'"),
            &table.headers,
        ));
    }
    Ok(index)
}

/// Derives a row's output sub folder from the value in `column`.
///
/// Only letters and digits of the cell are kept. Rows whose values reduce to
/// the same string share a folder.
///
/// ```
/// use csvplate::paths::derive_path_part;
///
/// let headers = vec!["Name".to_string(), "Id".to_string()];
/// let row = vec!["Acme Co.".to_string(), "42".to_string()];
/// assert_eq!(derive_path_part(&headers, &row, "Name").unwrap(), "AcmeCo");
/// ```
pub fn derive_path_part(headers: &[String], row: &[String], column: &str) -> Result<String> {
    let cell = headers
        .iter()
        .position(|header| header == column)
        .and_then(|index| row.get(index))
        .ok_or_else(|| missing_column(column, &format!("row '{}'", row.join(",")), headers))?;

    Ok(cell.chars().filter(|c| c.is_alphanumeric()).collect())
}

/// Name a template's output is saved under, relative to the row's folder.
///
/// With a non-empty `base_path` that prefixes the template path, the rest of
/// the path is kept so sub folders survive. Otherwise the file name is used.
pub fn save_name(template_path: &str, base_path: &str) -> PathBuf {
    if !base_path.is_empty() {
        if let Some(rest) = template_path.strip_prefix(base_path) {
            let rest = rest.trim_start_matches(['/', '\\']);
            if !rest.is_empty() {
                return PathBuf::from(rest);
            }
        }
    }

    Path::new(template_path)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(template_path))
}

pub fn output_file<P: AsRef<Path>>(output_root: P, path_part: &str, save_name: &Path) -> PathBuf {
    output_root.as_ref().join(path_part).join(save_name)
}

/// The sidecar document of a template: same path, data document extension.
pub fn sidecar_path<P: AsRef<Path>>(template_path: P, extension: &str) -> PathBuf {
    template_path.as_ref().with_extension(extension)
}
