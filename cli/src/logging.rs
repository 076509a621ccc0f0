use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Resolves the effective log level: `--verbose` wins, then `--log-level`,
/// then the configured level.
pub fn resolve_level(verbose: bool, cli_level: Option<&str>, config_level: Option<&str>) -> String {
    if verbose {
        return "debug".to_string();
    }
    cli_level
        .or(config_level)
        .map(|level| match level.to_lowercase().as_str() {
            l @ ("trace" | "debug" | "info" | "warn" | "error" | "off") => l.to_string(),
            _ => "warn".to_string(),
        })
        .unwrap_or_else(|| "warn".to_string())
}

/// Installs the tracing subscriber. `RUST_LOG` overrides `level`.
pub fn init(level: &str) {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .init();
}
