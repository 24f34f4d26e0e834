/// Diagnostic logging
///
/// Progress for the user goes to stdout with println!. This only wires up
/// `tracing` for the debug/warn events underneath; RUST_LOG adjusts it.

use tracing_subscriber::EnvFilter;

/// Default filter when RUST_LOG is unset
const DEFAULT_FILTER: &str = "warn";

/// Install the global subscriber, writing to stderr
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // Ignore the error if a subscriber is already set (tests, embedding)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
