//! Karelia news service: binary entrypoint.
//! Boots the Axum HTTP server with the cached aggregation pipeline behind it.

use shuttle_axum::ShuttleAxum;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use karelia_news::api::{create_router, AppState};
use karelia_news::metrics::Metrics;
use karelia_news::service_from_env;

/// Compact tracing logs. `RUST_LOG` wins over the default filter.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("karelia_news=info,warn"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    // Recorder first: the service publishes its TTL gauge on construction.
    let metrics = match Metrics::init() {
        Ok(m) => Some(m),
        Err(e) => {
            warn!(error = %e, "metrics disabled");
            None
        }
    };

    let service = service_from_env().map_err(shuttle_runtime::Error::Custom)?;

    let mut router = create_router(AppState::new(service));
    if let Some(m) = metrics {
        router = router.merge(m.router());
    }

    Ok(router.into())
}
