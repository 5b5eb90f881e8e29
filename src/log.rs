use tracing::Level;

/// Installs the global subscriber. Logs go to stderr; stdout only carries the
/// final confirmation line.
pub fn setup_logging() {
    // A subscriber may already be installed when embedded in tests.
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
