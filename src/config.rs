//! Configuration handling for csvplate.
//! The configuration is a YAML document decoded through the generic
//! [`Decoder`] and projected onto [`Config`].

use std::path::Path;

use log::debug;
use serde::{Deserialize, Deserializer, Serialize};

use crate::constants::DEFAULT_SIDECAR_EXTENSION;
use crate::decoder::{retarget, Decoder};
use crate::error::{Error, Result};
use crate::model::Reporter;
use crate::value::{GenericValue, Scalar};

/// Where the input rows come from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSection {
    /// CSV file whose first row holds the column names
    #[serde(deserialize_with = "scalar_text")]
    pub csv_filename: String,
}

/// Which templates are rendered for every row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSection {
    #[serde(deserialize_with = "scalar_texts")]
    pub scriban_filenames: Vec<String>,

    /// Prefix taken off each template path to keep its sub folders in the output
    #[serde(deserialize_with = "scalar_text")]
    pub base_path: String,
}

/// Where the rendered files go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    #[serde(deserialize_with = "scalar_text")]
    pub output_path: String,

    /// CSV column whose value names each row's sub folder
    #[serde(alias = "csv_column_for_ouput_path_part", deserialize_with = "scalar_text")]
    pub csv_column_for_output_path_part: String,
}

// Text fields take any scalar: decoded documents type `2024` as an integer.
fn scalar_text<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Scalar::deserialize(deserializer)?.to_string())
}

fn scalar_texts<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    Ok(Vec::<Scalar>::deserialize(deserializer)?.iter().map(Scalar::to_string).collect())
}

/// The whole configuration document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub input: InputSection,
    pub template: TemplateSection,
    pub output: OutputSection,

    /// Free form variables available to every template
    #[serde(alias = "Data")]
    pub data: GenericValue,
}

impl Config {
    /// Checks the fields every run needs.
    ///
    /// # Errors
    /// * `Error::ConfigError` naming the first missing or malformed field
    pub fn validate(&self) -> Result<()> {
        if self.input.csv_filename.trim().is_empty() {
            return Err(Error::ConfigError("'input.csv_filename' is required".to_string()));
        }
        if self.output.csv_column_for_output_path_part.trim().is_empty() {
            return Err(Error::ConfigError(
                "'output.csv_column_for_output_path_part' is required".to_string(),
            ));
        }
        if self.data.as_map().is_none() {
            return Err(Error::ConfigError("'data' must be a mapping".to_string()));
        }
        Ok(())
    }
}

/// Loads, decodes and validates the configuration at `config_path`.
///
/// # Errors
/// * `Error::ConfigError` if the file is missing, unreadable, malformed or
///   lacks a required field
pub fn load_config<P: AsRef<Path>>(config_path: P, reporter: &dyn Reporter) -> Result<Config> {
    let config_path = config_path.as_ref();
    if !config_path.is_file() {
        return Err(Error::ConfigError(format!(
            "Invalid configuration path: {}",
            config_path.display()
        )));
    }

    debug!("Loading configuration from {}", config_path.display());
    let content = std::fs::read_to_string(config_path)
        .map_err(|e| Error::ConfigError(format!("{}: {}", config_path.display(), e)))?;

    let decoder = Decoder::new(config_path.display().to_string(), reporter);
    let document = decoder
        .decode_str(&content)
        .map_err(|e| Error::ConfigError(format!("{}: {}", config_path.display(), e)))?;

    let mut config: Config = retarget(&document)
        .map_err(|e| Error::ConfigError(format!("Invalid schema: {e}")))?;

    // `data:` with no value
    if config.data == GenericValue::Scalar(Scalar::String(String::new())) {
        config.data = GenericValue::default();
    }
    config.validate()?;
    Ok(config)
}

/// Extension that marks a template's sidecar document.
///
/// Follows the configuration file's own extension.
pub fn sidecar_extension<P: AsRef<Path>>(config_path: P) -> String {
    config_path
        .as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or(DEFAULT_SIDECAR_EXTENSION)
        .to_string()
}

/// A filled-in example configuration, as YAML.
pub fn example_config() -> String {
    let mut data = indexmap::IndexMap::new();
    data.insert(
        "company".to_string(),
        GenericValue::Scalar(Scalar::String("Acme Co.".to_string())),
    );
    data.insert("year".to_string(), GenericValue::Scalar(Scalar::Integer(2024)));

    let example = Config {
        input: InputSection { csv_filename: "input.csv".to_string() },
        template: TemplateSection {
            scriban_filenames: vec!["templates/letter.txt".to_string()],
            base_path: "templates".to_string(),
        },
        output: OutputSection {
            output_path: "out".to_string(),
            csv_column_for_output_path_part: "Name".to_string(),
        },
        data: GenericValue::Map(data),
    };
    serde_yaml::to_string(&example).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sidecar_extension() {
        assert_eq!(sidecar_extension("csvplate.yml"), "yml");
        assert_eq!(sidecar_extension("dir/config.yaml"), "yaml");
        assert_eq!(sidecar_extension("config"), "yaml");
    }

    #[test]
    fn test_example_config_round_trips_through_decoder() {
        let reporter = crate::model::LogReporter;
        let document = Decoder::new("example", &reporter).decode_str(&example_config()).unwrap();
        let config: Config = retarget(&document).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.output.csv_column_for_output_path_part, "Name");
    }
}
