//! Error handling for csvplate.
//! Defines the error type shared by every stage of a run and the process
//! exit code each kind of failure maps to.

use std::io;
use thiserror::Error;

/// Custom error types for csvplate operations.
///
/// The variants follow the order in which a run validates its inputs. Each one
/// maps to a distinct process exit code through [`Error::exit_code`].
#[derive(Error, Debug)]
pub enum Error {
    /// The configuration document is missing, unreadable or invalid.
    #[error("Configuration error: {0}.")]
    ConfigError(String),

    /// The input table is missing, unreadable or has no data rows.
    #[error("Input error: {0}.")]
    InputError(String),

    /// The column used to derive the output path part is not usable.
    #[error("Column '{column}' is not available in {table} (headers: {headers}).")]
    MissingColumnError { column: String, table: String, headers: String },

    /// The configuration names no templates at all.
    #[error("No templates configured under 'template.scriban_filenames'.")]
    NoTemplatesError,

    /// One or more template files do not exist.
    #[error("Template file(s) not found: {}.", .paths.join(", "))]
    TemplateNotFoundError { paths: Vec<String> },

    /// A template could not be compiled.
    #[error("Template error in '{template}': {source}.")]
    TemplateCompileError {
        template: String,
        #[source]
        source: minijinja::Error,
    },

    /// A compiled template failed while rendering one row.
    #[error("Render error in '{template}' for data row {row} (the first row after the header is 1): {source}.")]
    RenderError {
        template: String,
        /// 1-based position of the row among the data rows
        row: usize,
        #[source]
        source: minijinja::Error,
    },

    /// A template's sidecar document could not be loaded.
    #[error("Sidecar error: {0}.")]
    SidecarError(String),

    /// A generic value tree did not fit the requested typed shape.
    #[error("Decode error: {0}.")]
    DecodeError(#[from] serde_json::Error),

    /// The YAML text itself is malformed.
    #[error("YAML error: {0}.")]
    YamlError(#[from] yaml_rust2::ScanError),

    /// Represents errors that occur during file system operations
    #[error("IO error: {0}.")]
    IoError(#[from] io::Error),
}

impl Error {
    /// Process exit code reported for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::ConfigError(_) => 6,
            Error::InputError(_) => 5,
            Error::MissingColumnError { .. } => 4,
            Error::NoTemplatesError => 3,
            Error::TemplateNotFoundError { .. } => 2,
            Error::TemplateCompileError { .. } => 1,
            Error::RenderError { .. }
            | Error::SidecarError(_)
            | Error::DecodeError(_)
            | Error::YamlError(_)
            | Error::IoError(_) => 9,
        }
    }
}

/// Convenience type alias for Results with [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Default error handler that prints the error and exits the program.
///
/// # Behavior
/// Prints the error message to stderr and exits with the error's exit code
pub fn default_error_handler(err: Error) -> ! {
    eprintln!("{err}");
    std::process::exit(err.exit_code());
}
