use std::sync::Arc;

use suggestion_api::{
    api::{create_router, AppState},
    config::Config,
    db::{self, CacheWriterHandle, CatalogSeed, InMemoryStore, PgStore},
    services::RecommendationService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "suggestion_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let service = build_service(&config).await?;
    let (service, cache_handle) = attach_cache(service, &config).await?;

    let state = AppState::new(service, &config);
    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(handle) = cache_handle {
        handle.shutdown().await;
    }

    Ok(())
}

/// Picks the Postgres store when a database is configured, else memory
async fn build_service(config: &Config) -> anyhow::Result<RecommendationService> {
    if let Some(database_url) = &config.database_url {
        let pool = db::create_pool(database_url).await?;
        tracing::info!("Using PostgreSQL catalog");
        return Ok(AppState::service_for(Arc::new(PgStore::new(pool)), config));
    }

    let seed = match &config.catalog_seed_path {
        Some(path) => CatalogSeed::from_file(path)?,
        None => {
            tracing::warn!("No DATABASE_URL or CATALOG_SEED_PATH set, starting with an empty catalog");
            CatalogSeed::default()
        }
    };
    let store = InMemoryStore::new(seed);
    tracing::info!(movies = store.movie_count().await, "Using in-memory catalog");

    Ok(AppState::service_for(Arc::new(store), config))
}

async fn attach_cache(
    service: RecommendationService,
    config: &Config,
) -> anyhow::Result<(RecommendationService, Option<CacheWriterHandle>)> {
    let Some(redis_url) = &config.redis_url else {
        return Ok((service, None));
    };

    let client = db::create_redis_client(redis_url)?;
    let (cache, handle) = db::Cache::new(client).await;
    tracing::info!(ttl = config.suggestion_cache_ttl, "Suggestion cache enabled");

    Ok((
        service.with_cache(cache, config.suggestion_cache_ttl),
        Some(handle),
    ))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
