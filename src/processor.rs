//! Run orchestration: validate the input, compile every template, then
//! render each template once per CSV row and write the results.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use log::{debug, error};

use crate::config::Config;
use crate::constants::DEFAULT_SIDECAR_EXTENSION;
use crate::decoder::Decoder;
use crate::error::{Error, Result};
use crate::model::{build_model, Diagnostic, Reporter};
use crate::paths::{derive_path_part, output_file, save_name, sidecar_path, validate_path_part_column};
use crate::renderer::TemplateRenderer;
use crate::table::{read_table, InputTable};
use crate::value::GenericValue;

/// A compiled template, ready to render.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateUnit {
    /// Template path as configured; also the name it was compiled under
    pub name: String,
    pub sidecar: PathBuf,
}

/// What a successful run produced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub files_written: usize,
}

/// Drives one run over the configured templates and input rows.
pub struct Processor<'a> {
    config: &'a Config,
    renderer: Box<dyn TemplateRenderer>,
    reporter: &'a dyn Reporter,
    sidecar_extension: String,
}

impl<'a> Processor<'a> {
    pub fn new(
        config: &'a Config,
        renderer: Box<dyn TemplateRenderer>,
        reporter: &'a dyn Reporter,
    ) -> Self {
        Self {
            config,
            renderer,
            reporter,
            sidecar_extension: DEFAULT_SIDECAR_EXTENSION.to_string(),
        }
    }

    /// Sets the extension used to find each template's sidecar document.
    pub fn with_sidecar_extension<S: Into<String>>(mut self, extension: S) -> Self {
        self.sidecar_extension = extension.into();
        self
    }

    /// Reads the input table, then validates, compiles and renders.
    ///
    /// Nothing is written unless every earlier stage succeeds.
    pub fn run(&mut self) -> Result<RunSummary> {
        let table = read_table(&self.config.input.csv_filename)?;
        self.validate(&table)?;
        let units = self.compile()?;
        self.render_all(&table, &units)
    }

    /// Checks that every row can supply the path-part column.
    ///
    /// # Returns
    /// * `Result<usize>` - Index of the path-part column
    pub fn validate(&self, table: &InputTable) -> Result<usize> {
        if table.rows.is_empty() {
            return Err(Error::InputError(format!(
                "'{}' has no data rows",
                self.config.input.csv_filename
            )));
        }
        validate_path_part_column(
            table,
            &self.config.output.csv_column_for_output_path_part,
            &self.config.input.csv_filename,
        )
    }

    /// Compiles every configured template.
    ///
    /// # Errors
    /// * `Error::NoTemplatesError` if no template is configured
    /// * `Error::TemplateNotFoundError` listing every missing template file
    /// * `Error::TemplateCompileError` for the first template that fails
    pub fn compile(&mut self) -> Result<Vec<TemplateUnit>> {
        let filenames = &self.config.template.scriban_filenames;
        if filenames.is_empty() {
            return Err(Error::NoTemplatesError);
        }

        let missing: Vec<String> =
            filenames.iter().filter(|name| !Path::new(name).is_file()).cloned().collect();
        if !missing.is_empty() {
            for name in &missing {
                error!("File: '{name}' not found");
            }
            return Err(Error::TemplateNotFoundError { paths: missing });
        }

        let mut units = Vec::with_capacity(filenames.len());
        for name in filenames {
            debug!("Compiling template {name}");
            let source = fs::read_to_string(name)?;
            self.renderer.compile(name, source)?;
            units.push(TemplateUnit {
                name: name.clone(),
                sidecar: sidecar_path(name, &self.sidecar_extension),
            });
        }
        Ok(units)
    }

    /// Renders every template against every row, templates outermost.
    pub fn render_all(&self, table: &InputTable, units: &[TemplateUnit]) -> Result<RunSummary> {
        let empty = IndexMap::new();
        let global = self.config.data.as_map().unwrap_or(&empty);
        let column = &self.config.output.csv_column_for_output_path_part;
        let output_root = Path::new(&self.config.output.output_path);

        let mut summary = RunSummary::default();
        for unit in units {
            let sidecar = self.load_sidecar(&unit.sidecar)?;
            let sidecar_source = unit.sidecar.display().to_string();
            let target_name = save_name(&unit.name, &self.config.template.base_path);

            for (number, row) in (1..).zip(&table.rows) {
                let path_part = derive_path_part(&table.headers, row, column)?;
                let model = build_model(
                    &sidecar_source,
                    &sidecar,
                    global,
                    &table.headers,
                    row,
                    self.reporter,
                );
                let content = self.renderer.render(&unit.name, number, &model)?;

                let target = output_file(output_root, &path_part, &target_name);
                self.write_output(&target, &content, column, &path_part)?;
                summary.files_written += 1;
            }
        }
        Ok(summary)
    }

    /// Loads a template's sidecar document; a missing one is empty.
    ///
    /// # Errors
    /// * `Error::SidecarError` if the document cannot be read, is malformed,
    ///   or is not a mapping at its root
    pub fn load_sidecar(&self, path: &Path) -> Result<IndexMap<String, GenericValue>> {
        if !path.is_file() {
            debug!("No sidecar document at {}", path.display());
            return Ok(IndexMap::new());
        }

        let sidecar_error = |e: Error| Error::SidecarError(format!("{}: {}", path.display(), e));
        let content = fs::read_to_string(path).map_err(|e| sidecar_error(e.into()))?;
        let document = Decoder::new(path.display().to_string(), self.reporter)
            .decode_str(&content)
            .map_err(sidecar_error)?;

        match document {
            GenericValue::Map(map) => Ok(map),
            _ => Err(Error::SidecarError(format!(
                "{}: the document root must be a mapping",
                path.display()
            ))),
        }
    }

    // The content is fully rendered before the file is touched.
    fn write_output(&self, target: &Path, content: &str, column: &str, path_part: &str) -> Result<()> {
        if target.exists() {
            self.reporter.report(Diagnostic::Overwrite {
                path: target.to_path_buf(),
                column: column.to_string(),
                path_part: path_part.to_string(),
            });
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        debug!("Writing file: {}", target.display());
        fs::write(target, content)?;
        Ok(())
    }
}
