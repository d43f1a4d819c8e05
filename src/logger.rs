//! Tracing subscriber setup.

use std::env;
use std::sync::Once;

use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Reads the level from a `LOGLEVEL` value, defaulting to `INFO`.
#[must_use]
pub fn parse_level(value: Option<&str>) -> Level {
    match value.map(str::to_uppercase).as_deref() {
        Some("DEBUG") => Level::DEBUG,
        Some("ERROR") => Level::ERROR,
        Some("WARN") => Level::WARN,
        Some("TRACE") => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Installs the global subscriber once.
///
/// Environment variables:
/// - `LOGLEVEL`: DEBUG, INFO, WARN, ERROR or TRACE (default INFO)
/// - `RUST_LOG`: extra per-target directives
///
/// Later calls do nothing.
pub fn setup_logger() {
    INIT.call_once(|| {
        let level = parse_level(env::var("LOGLEVEL").ok().as_deref());
        let registry = tracing_subscriber::registry()
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_thread_ids(true),
            )
            .with(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()));
        if registry.try_init().is_err() {
            return;
        }
        tracing::debug!("Log level set to: {}", level);
    });
}
