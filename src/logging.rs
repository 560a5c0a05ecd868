/// Tracing subscriber initialization
///
/// Diagnostics go to stderr; the GUI stays quiet on its own. Respects
/// RUST_LOG and defaults to "info".

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. Safe to call once from main; a second
/// call (e.g. from a test harness) is ignored.
pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
