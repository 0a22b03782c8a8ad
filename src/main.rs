//! Georesolve - address resolution over the KLADR address API and Google Maps.
//!
//! Serves every [`GeoHelper`] operation over HTTP.
//!
//! # Configuration
//!
//! - `GEORESOLVE_PORT` - Listen port (default: 3000)
//! - `GEORESOLVE_KLADR_TOKEN` / `GEORESOLVE_GOOGLE_TOKEN` - Upstream tokens
//! - `GEORESOLVE_KLADR_URL` / `GEORESOLVE_GOOGLE_URL` - Upstream base URL overrides
//! - `GEORESOLVE_LOCALITY_PLACEMENT` - `district` (default) or `city`

use std::env;
use std::net::SocketAddr;

use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use georesolve::{GeoConfig, GeoHelper, api};

/// Default port if not specified via environment variable.
const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env().add_directive("georesolve=info".parse()?))
        .init();

    let port: u16 = env::var("GEORESOLVE_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let config = GeoConfig::from_env();

    // Log which upstreams are configured, never the tokens themselves
    info!(
        port,
        kladr_token = config.credentials.primary.is_some(),
        google_token = config.credentials.secondary.is_some(),
        locality_placement = %config.locality_placement,
        "Starting georesolve"
    );

    let helper = GeoHelper::from_config(&config);
    let app = api::router(helper);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;

    info!(%addr, "georesolve is listening");

    axum::serve(listener, app).await?;

    Ok(())
}
