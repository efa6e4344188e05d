use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mergington::config::AppConfig;
use mergington::database::ActivityStore;
use mergington::web;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env();
    let store = ActivityStore::with_seed();

    let app = web::router(store, &config.static_dir);
    let listener = bind_with_fallback(&config).await?;

    let bound_addr = listener.local_addr()?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        static_dir = %config.static_dir.display(),
        "server listening on http://{}",
        bound_addr
    );

    axum::serve(listener, app).await
}

// Binds HOST:PORT, or HOST:PORT+1 if that fails.
async fn bind_with_fallback(config: &AppConfig) -> std::io::Result<TcpListener> {
    match TcpListener::bind((config.host.as_str(), config.port)).await {
        Ok(l) => Ok(l),
        Err(e) => {
            let Some(fallback) = config.port.checked_add(1) else {
                return Err(e);
            };
            warn!(
                "could not bind {}:{}: {}, trying {}:{}",
                config.host, config.port, e, config.host, fallback
            );
            TcpListener::bind((config.host.as_str(), fallback)).await
        }
    }
}
