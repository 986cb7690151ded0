//! Centralized tracing initialization.
//!
//! All binaries in the workspace initialize logging through this helper so
//! the operator-facing output stays uniform. A thread-local subscriber is
//! used to avoid conflicts with the dataflow runtime's own tracing setup.

use tracing::subscriber::DefaultGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with a thread-local subscriber.
///
/// Respects the RUST_LOG environment variable (defaults to "info") and
/// emits compact output without target/file metadata. The returned guard
/// must be kept in scope for the duration of the program.
pub fn init_tracing() -> DefaultGuard {
    use tracing_subscriber::layer::SubscriberExt;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(fmt_layer);

    tracing::subscriber::set_default(subscriber)
}
