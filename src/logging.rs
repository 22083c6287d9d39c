use tracing::subscriber::with_default;

use crate::config::Verbosity;

/// Builds the subscriber for one run of a tool.
///
/// Lines carry the time and the level, and go to stderr.
pub fn subscriber(verbosity: Verbosity) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(tracing::Level::from(verbosity))
        .with_writer(std::io::stderr)
        .finish()
}

/// Runs `f` with logging configured for `verbosity`.
///
/// The subscriber only applies to the current thread while `f` runs.
pub fn scoped<T>(verbosity: Verbosity, f: impl FnOnce() -> T) -> T {
    with_default(subscriber(verbosity), f)
}
