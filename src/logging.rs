//! Tracing subscriber setup for binaries, demos and tests.
use tracing_subscriber::EnvFilter;

/// Install a fmt subscriber writing to stderr. `RUST_LOG` wins over
/// `default_level`. Returns false if a subscriber was already installed.
pub fn init(default_level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
