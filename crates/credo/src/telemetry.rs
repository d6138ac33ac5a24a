// Logger bootstrap for binaries and examples embedding the lifecycle.
//
// Library code only emits `tracing` events; installing a subscriber is the
// application's call, so this is opt-in.

use tracing_subscriber::EnvFilter;

/// Initialize a `tracing` subscriber with a sane default filter.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("credo=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
