use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install a fmt subscriber for tests.
///
/// Prefer RUST_LOG if set; otherwise `info`. Ex:
/// RUST_LOG=auth_testkit=debug cargo test
///
/// Safe to call from every test: only the first call installs anything.
pub fn init_test_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // try_init fails once a global subscriber exists; that's fine here.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}
