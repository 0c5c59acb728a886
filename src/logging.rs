//! Logging setup for the binaries. Library code only emits `tracing` events.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when neither `RUST_LOG` nor `--log-level` says otherwise.
pub const DEFAULT_FILTER: &str = "info";

/// Installs a console subscriber.
///
/// `RUST_LOG` takes precedence. Otherwise `log_level` is used if given, and
/// [DEFAULT_FILTER] if not.
pub fn init_logging(log_level: Option<&str>) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_filter(log_level)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    // A subscriber may already be installed, e.g. when called twice from tests
    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .try_init();
}

fn fallback_filter(log_level: Option<&str>) -> &str {
    log_level
        .filter(|level| !level.is_empty())
        .unwrap_or(DEFAULT_FILTER)
}
