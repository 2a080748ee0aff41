mod api;
mod middleware;

use std::sync::Arc;

use tienda_chat::Assistant;
use tienda_core::{AppConfig, Environment};
use tienda_geocode::GeocodeClient;
use tienda_store::CatalogStore;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, default_rate_limit_state, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = tienda_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let state = build_state(&config)?;
    let auth = AuthState::from_env(config.env == Environment::Development)?;
    let app = build_app(state, auth, default_rate_limit_state());

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, env = %config.env, "tienda-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

/// Open the store, apply the demo seed, and wire the optional clients.
fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let store = CatalogStore::open(&config.data_dir)?;
    if config.catalog_path.exists() {
        let seed = tienda_core::load_catalog_seed(&config.catalog_path)?;
        let outcome = store.seed_if_outdated(&seed)?;
        tracing::info!(
            version = %seed.version,
            products_written = outcome.products_written,
            sellers_added = outcome.sellers_added,
            "catalog seed checked"
        );
    } else {
        tracing::warn!(
            path = %config.catalog_path.display(),
            "catalog seed file not found; starting with stored data"
        );
    }

    let assistant = Assistant::from_config(&config.chat);
    let geocoder = GeocodeClient::from_config(config)
        .inspect_err(|e| tracing::warn!(error = %e, "geocoder disabled"))
        .ok();

    Ok(AppState {
        store: Arc::new(store),
        assistant: Arc::new(assistant),
        geocoder: geocoder.map(Arc::new),
        default_location: config.default_location,
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
