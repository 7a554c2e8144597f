//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber when `verbose` is set.
///
/// Without it no subscriber exists and every diagnostic is dropped. With it
/// `RUST_LOG` picks the filter, defaulting to `debug`.
pub fn init(verbose: bool) {
    if !verbose {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
