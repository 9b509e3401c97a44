//! Process bootstrap for `user-service start`.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use user_service_infra::{
    Configuration, InMemoryUserStore, PostgresUserStore, StorageKind, UserStore,
};

use crate::app::{build_app_with_routes, services::Routes};
use crate::cli::StartArgs;

/// Load configuration, open the store, and serve until Ctrl-C.
pub async fn start(args: StartArgs) -> anyhow::Result<()> {
    let config = Configuration::load(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config.display()))?
        .with_overrides(args.host, args.port);

    let store = open_store(&config).await?;
    serve(config, store).await
}

/// Open and migrate the configured `UserStore`.
pub async fn open_store(config: &Configuration) -> anyhow::Result<Arc<dyn UserStore>> {
    let store: Arc<dyn UserStore> = match config.api_context.storage {
        StorageKind::Postgres => {
            let store = PostgresUserStore::connect(&config.database_url())
                .await
                .context("connecting to the database")?;
            Arc::new(store)
        }
        StorageKind::Memory => {
            tracing::warn!("using in-memory storage; data is lost on restart");
            Arc::new(InMemoryUserStore::new())
        }
    };

    store.migrate().await.context("migrating the users table")?;
    Ok(store)
}

pub async fn serve(config: Configuration, store: Arc<dyn UserStore>) -> anyhow::Result<()> {
    let routes = Routes::current()?;
    let v1 = routes.v1.clone();
    let app = build_app_with_routes(store, routes);

    let address = config.api_context.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("binding {address}"))?;

    tracing::info!("Starting service at {}{}", listener.local_addr()?, v1);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    tracing::info!("service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
