use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Initialize stderr logging.
///
/// `RUST_LOG` takes precedence over `log_level`. Stdout is left alone so
/// JSON output and the MCP stdio transport stay clean.
pub fn setup_logging(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let result = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_ansi(false)
        .with_span_events(FmtSpan::CLOSE)
        .with_env_filter(env_filter)
        .try_init();

    match result {
        Ok(()) => tracing::debug!(level = log_level, "Logging initialized"),
        Err(e) => eprintln!("Logging already initialized: {}", e),
    }
}
