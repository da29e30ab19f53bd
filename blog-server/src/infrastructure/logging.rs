use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global JSON subscriber. Later calls are no-ops.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,blog_server=debug"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // try_init also bridges `log` records, which is where actix's access log goes
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_level(true)
        .with_timer(fmt::time::UtcTime::rfc_3339())
        .json()
        .try_init();
}
