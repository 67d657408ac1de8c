use tracing_subscriber::EnvFilter;

// Run with RUST_LOG=segfit=trace to see heap events in failing tests.
pub fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
