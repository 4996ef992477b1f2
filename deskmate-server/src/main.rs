use anyhow::Context;
use deskmate_client::{DeviceApi, DeviceClient};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod config;
pub mod db;
pub mod repository;
pub mod scheduler;
pub mod service;
pub mod store;

#[cfg(test)]
mod testing;

use config::{Config, StoreBackend};
use scheduler::TaskPoller;
use service::{DeskActuator, DeskSyncService, HeightService, OccupancyService, TaskExecutor};
use store::{DeskStore, InMemoryStore, PgStore, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "deskmate_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting DeskMate Server...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let device: Arc<dyn DeviceApi> = Arc::new(DeviceClient::new(config.device.clone()));
    tracing::info!("Device service: {}", config.device.base_url);

    let (tasks, desks) = open_store(&config).await?;

    // Wire services
    let actuator = DeskActuator::new(device.clone(), desks.clone());
    let executor = TaskExecutor::new(tasks.clone(), desks.clone(), actuator.clone());
    let poller = Arc::new(TaskPoller::new(tasks, executor, config.poll_interval));
    let sync = Arc::new(DeskSyncService::new(device, desks.clone()));

    if config.sync_on_startup {
        match sync.sync_all().await {
            Ok(count) => tracing::info!("Startup sync: {} desk(s)", count),
            Err(e) => tracing::error!("Startup sync failed: {}", e),
        }
    }

    let state = api::AppState {
        poller: poller.clone(),
        sync,
        height: Arc::new(HeightService::new(desks.clone(), actuator)),
        occupancy: Arc::new(OccupancyService::new(desks)),
    };

    let poller_handle = poller.start();

    // Build router with all API endpoints
    let app = api::create_router(state);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    poller_handle.stop().await;
    tracing::info!("DeskMate Server stopped");
    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<(Arc<dyn TaskStore>, Arc<dyn DeskStore>)> {
    match config.store_backend {
        StoreBackend::Postgres => {
            tracing::info!("Connecting to database...");

            let pool = db::create_pool(&config.database_url)
                .await
                .context("Failed to create database pool")?;

            tracing::info!("Database connection pool created");

            db::run_migrations(&pool)
                .await
                .context("Failed to run database migrations")?;

            let store = Arc::new(PgStore::new(pool));
            let tasks: Arc<dyn TaskStore> = store.clone();
            let desks: Arc<dyn DeskStore> = store;
            Ok((tasks, desks))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store, state will not survive a restart");
            let store = Arc::new(InMemoryStore::new());
            let tasks: Arc<dyn TaskStore> = store.clone();
            let desks: Arc<dyn DeskStore> = store;
            Ok((tasks, desks))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
