use anyhow::Context;
use std::net::SocketAddr;
use std::sync::Arc;
use tourops_alerts::{AlertPoller, AlertScope};
use tourops_api::{app, state::{alert_rules, AppState, Backend}};
use tourops_core::{InMemoryKeyValueStore, KeyValueStore};
use tourops_store::{BackendMode, Config, InMemoryBackend, RedisKeyValueStore, RestBackend, Seed};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tourops_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load().context("Failed to load config")?;
    tracing::info!("Starting TourOps console service on port {}", config.server.port);

    let backend = match config.backend.mode {
        BackendMode::Http => {
            tracing::info!("Using REST backend at {}", config.backend.base_url);
            Backend::from_shared(Arc::new(
                RestBackend::new(&config.backend).context("Failed to build backend client")?,
            ))
        }
        BackendMode::Memory => {
            let seed = match &config.backend.seed_path {
                Some(path) => Seed::from_file(path)
                    .await
                    .with_context(|| format!("Failed to read seed {}", path.display()))?,
                None => Seed::default(),
            };
            Backend::from_shared(Arc::new(InMemoryBackend::new(seed)))
        }
    };

    let store: Arc<dyn KeyValueStore> = match &config.redis.url {
        Some(url) => Arc::new(RedisKeyValueStore::new(url).context("Invalid Redis url")?),
        None => {
            tracing::warn!("No Redis configured, seen alerts are kept in memory");
            Arc::new(InMemoryKeyValueStore::new())
        }
    };

    let state = AppState::new(backend, store, alert_rules(&config.alerts));

    let poller = AlertPoller::spawn(
        state.alerts.clone(),
        AlertScope::admin(),
        config.alerts.poll_interval(),
    );
    let state = state.with_admin_feed(poller.feed());

    let app = app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    poller.shutdown().await;
    tracing::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
