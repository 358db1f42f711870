//! Command-line interface implementation for csvplate.
//! Provides argument parsing using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::constants::DEFAULT_CONFIG_FILE;

/// Command-line arguments structure for csvplate.
#[derive(Parser, Debug)]
#[command(author, version, about = "csvplate: render templates once per CSV row", long_about = None)]
pub struct Args {
    /// Path to the YAML configuration file [default: csvplate.yaml]
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The configuration file to load: the given one, else the default in the
    /// working directory.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
    }
}

/// Parses command line arguments and returns the Args structure.
///
/// # Exits
/// * With clap's default error handling for invalid arguments
pub fn get_args() -> Args {
    Args::parse()
}
