// ABOUTME: Opt-in tracing subscriber initialization for SDK consumers
// ABOUTME: Reads the filter from RUST_LOG or SUDO_LOG_LEVEL, defaulting to info

use crate::constants::SUDO_LOG_LEVEL;

/// Initialize structured logging for the process.
///
/// Call once at startup. Embedders that install their own subscriber should
/// skip this and rely on `tracing` events flowing into it instead.
pub fn init() {
    let default_level =
        std::env::var(SUDO_LOG_LEVEL).unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .compact()
        .init();
}
