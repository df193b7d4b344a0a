use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Filter used when `RUST_LOG` is unset. `level` comes from the config file;
/// `verbose` raises the crate to debug unless a level was configured.
pub fn default_filter(verbose: bool, level: Option<&str>) -> String {
    match (level, verbose) {
        (Some(level), _) => format!("fxhash_verify={},warn", level),
        (None, true) => "fxhash_verify=debug,info".to_string(),
        (None, false) => "fxhash_verify=info".to_string(),
    }
}

fn env_filter(verbose: bool, level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose, level)))
}

pub fn init_cli_logger(verbose: bool, level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(verbose, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

pub fn init_json_logger(level: Option<&str>) {
    tracing_subscriber::registry()
        .with(env_filter(false, level))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .json() // one JSON object per line, for log collectors
                .with_current_span(false),
        )
        .init();
}
