//! Per-row model building.
//!
//! A model is assembled from three layers in fixed precedence order: the
//! template's sidecar document, the global `data` tree of the configuration
//! and the current CSV row. The first layer to define a key wins.

use std::fmt;
use std::path::PathBuf;

use indexmap::IndexMap;
use log::warn;

use crate::value::GenericValue;

/// The variable namespace handed to a template for one row.
pub type FlatModel = IndexMap<String, GenericValue>;

/// A recoverable condition noticed while decoding, merging or writing.
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A key was defined more than once; the later definition was dropped.
    DuplicateKey { source: String, key: String },
    /// An output file already existed and is about to be replaced.
    Overwrite { path: PathBuf, column: String, path_part: String },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DuplicateKey { source, key } => {
                write!(f, "possibly a duplicate key: {source}, key '{key}'")
            }
            Diagnostic::Overwrite { path, column, path_part } => write!(
                f,
                "Overwriting file '{}', with row key as '{column}', value '{path_part}'",
                path.display()
            ),
        }
    }
}

/// Sink for diagnostics.
pub trait Reporter {
    fn report(&self, diagnostic: Diagnostic);
}

/// Reporter that writes every diagnostic to the log as a warning.
#[derive(Debug, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, diagnostic: Diagnostic) {
        warn!("{diagnostic}");
    }
}

/// One named source of key/value pairs.
#[derive(Debug, Clone)]
pub struct Layer<'a> {
    /// Names the layer in duplicate-key diagnostics.
    pub source: String,
    pub entries: Vec<(&'a str, GenericValue)>,
}

impl<'a> Layer<'a> {
    pub fn from_map<S: Into<String>>(source: S, map: &'a IndexMap<String, GenericValue>) -> Self {
        let entries = map.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
        Self { source: source.into(), entries }
    }

    /// Pairs header names with the row's cells. Cells stay plain strings.
    pub fn from_row<S: Into<String>>(source: S, headers: &'a [String], row: &[String]) -> Self {
        let entries = headers
            .iter()
            .zip(row)
            .map(|(header, cell)| (header.as_str(), GenericValue::from(cell.as_str())))
            .collect();
        Self { source: source.into(), entries }
    }
}

/// Merges layers in the given order; the first layer to define a key wins.
///
/// Collisions are reported and skipped, never merged below the top level.
pub fn merge_layers<'a, I>(layers: I, reporter: &dyn Reporter) -> FlatModel
where
    I: IntoIterator<Item = Layer<'a>>,
{
    let mut model = FlatModel::new();
    for layer in layers {
        for (key, value) in layer.entries {
            if model.contains_key(key) {
                reporter.report(Diagnostic::DuplicateKey {
                    source: layer.source.clone(),
                    key: key.to_string(),
                });
                continue;
            }
            model.insert(key.to_string(), value);
        }
    }
    model
}

/// Builds the model for one (template, row) pair.
pub fn build_model(
    sidecar_source: &str,
    sidecar: &IndexMap<String, GenericValue>,
    global: &IndexMap<String, GenericValue>,
    headers: &[String],
    row: &[String],
    reporter: &dyn Reporter,
) -> FlatModel {
    merge_layers(
        [
            Layer::from_map(format!("file '{sidecar_source}'"), sidecar),
            Layer::from_map("global data", global),
            Layer::from_row("csv row", headers, row),
        ],
        reporter,
    )
}
