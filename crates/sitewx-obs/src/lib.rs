use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info,sitewx=debug";

/// Install the global subscriber: JSON lines on stdout, filtered by
/// `RUST_LOG` (falls back to [`DEFAULT_FILTER`]).
///
/// Calling it twice is harmless; the second install is ignored.
pub fn init(service_name: &str) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::new(env_filter))
        .with(tracing_subscriber::fmt::layer().json())
        .try_init()
        .is_ok();

    if installed {
        tracing::info!(service = %service_name, "Observability initialized");
    }
}
