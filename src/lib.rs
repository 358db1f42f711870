//! csvplate renders a set of templates once per row of a CSV table.
//! Each rendering sees one flat model merged from the template's sidecar
//! document, the configuration's global data and the current row.

/// Command-line interface module
pub mod cli;

/// Configuration loading and validation
pub mod config;

/// Common constants
pub mod constants;

/// YAML documents to generic value trees, and typed projection of those trees
pub mod decoder;

/// Error types and exit codes
pub mod error;

/// Logger setup
pub mod logger;

/// Model merging and the diagnostic sink
pub mod model;

/// Output path and sidecar path computation
pub mod paths;

/// Run orchestration
pub mod processor;

/// Template compilation and rendering
pub mod renderer;

/// CSV input table
pub mod table;

/// Generic value tree, scalar coercion and key sanitizing
pub mod value;
