//! csvplate's main application entry point.
//! Loads the configuration, then hands over to the processor.

use csvplate::{
    cli::{get_args, Args},
    config::{example_config, load_config, sidecar_extension},
    error::{default_error_handler, Result},
    logger::init_logger,
    model::LogReporter,
    processor::Processor,
    renderer::MiniJinjaRenderer,
};

/// Main application entry point.
fn main() {
    let args = get_args();
    init_logger(args.verbose);

    if let Err(err) = run(args) {
        default_error_handler(err);
    }
}

/// Main application logic execution.
///
/// # Flow
/// 1. Loads and validates the configuration
/// 2. Prints it
/// 3. Reads the table, compiles the templates and renders every row
fn run(args: Args) -> Result<()> {
    let config_path = args.config_path();
    let reporter = LogReporter;

    let config = load_config(&config_path, &reporter).inspect_err(|_| {
        eprintln!("example:\n{}", example_config());
    })?;

    println!("csvplate\n\nLoaded configuration is...");
    println!("{}", serde_json::to_string_pretty(&config)?);
    println!("...now working, please wait...\n");

    let mut processor = Processor::new(&config, Box::new(MiniJinjaRenderer::new()), &reporter)
        .with_sidecar_extension(sidecar_extension(&config_path));
    let summary = processor.run()?;

    println!(
        "\nFinished! {} file(s) written to {}",
        summary.files_written, config.output.output_path
    );
    Ok(())
}
