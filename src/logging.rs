//! Logging setup via tracing

use tracing_subscriber::{fmt, EnvFilter};

/// Initialize logging for the CLI. Level comes from `RUST_LOG`, defaulting
/// to `info`; set `RUST_LOG=industry_calculator=debug` to see intermediate
/// bonus and cost values.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_target(true).init();
}

/// Initialize logging inside tests. Safe to call from every test.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
