use tracing::Level;
use tracing_subscriber::fmt;

/// Install the global subscriber. Logs go to stderr so stdout stays
/// reserved for the batch summary.
pub fn init_logging(level: Level) {
    fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
