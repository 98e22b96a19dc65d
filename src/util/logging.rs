// qdebug - util/logging.rs
//
// Stderr subscriber for `qtail`'s own diagnostics. The library emits
// `tracing` events only and never installs a subscriber.

use tracing_subscriber::EnvFilter;

/// Install the `qtail` subscriber. The filter comes from `RUST_LOG`, then
/// `--debug`, then `warn`.
pub fn init(debug_flag: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if debug_flag {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(super::constants::DEFAULT_LOG_LEVEL)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .init();

    tracing::debug!(
        app = super::constants::APP_NAME,
        version = super::constants::APP_VERSION,
        "Logging initialised"
    );
}
