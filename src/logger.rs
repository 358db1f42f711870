/// Initialises `env_logger` for csvplate's own messages.
///
/// Diagnostics are logged as warnings, so they stay visible without
/// `--verbose`. Other crates only get to log warnings and errors.
pub fn init_logger(verbose: bool) {
    let level = if verbose { log::LevelFilter::Debug } else { log::LevelFilter::Info };

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Warn)
        .filter_module("csvplate", level)
        .format_timestamp(None)
        .init();
}
