//! Common constants used throughout csvplate.

/// Configuration file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "csvplate.yaml";

/// Sidecar extension used when the configuration file has none
pub const DEFAULT_SIDECAR_EXTENSION: &str = "yaml";
