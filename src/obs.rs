//! Observability and logging.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter when `RUST_LOG` is not set.
pub fn default_filter(env: &str) -> &'static str {
    match env {
        "local" | "dev" => "people_service=debug,tower_http=debug",
        _ => "people_service=info,tower_http=info",
    }
}

/// Installs the global tracing subscriber.
///
/// `local` logs human-readable lines, `dev` compact lines and everything else
/// (notably `prod`) JSON.
pub fn init_tracing(env: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(env).into());
    let registry = tracing_subscriber::registry().with(filter);

    match env {
        "local" => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
        "dev" => registry.with(tracing_subscriber::fmt::layer().compact()).init(),
        _ => registry.with(tracing_subscriber::fmt::layer().json()).init(),
    }
}
