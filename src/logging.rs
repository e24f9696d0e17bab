use tracing::Level;

const DEFAULT_LOG_LEVEL: Level = Level::INFO;

/// Resolves the log level from the `LOG_LEVEL` environment variable value.
/// Unset or unparseable values keep the default rather than erroring.
pub fn resolve_log_level(raw: Option<&str>) -> Level {
    raw.and_then(|v| v.trim().parse().ok())
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Configures the process-wide tracing subscriber with timestamped
/// output on stdout. Call once, before any request is served.
pub fn setup_logging() {
    let level = resolve_log_level(std::env::var("LOG_LEVEL").ok().as_deref());
    tracing_subscriber::fmt().with_max_level(level).init();
}
