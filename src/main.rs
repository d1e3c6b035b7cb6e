use std::sync::Arc;

use reelmatch_api::{
    api::{create_router, AppState},
    config::{Config, RecommendationSettings},
    db::{self, Cache, CachedInteractionStore, InteractionStore, PgInteractionStore},
    services::RecommendationEngine,
};
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env()?;
    let settings = RecommendationSettings::from_env()?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections).await?;
    if config.run_migrations {
        db::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");
    }

    let redis_client = db::create_redis_client(&config.redis_url)?;
    let (cache, cache_writer) = Cache::new(redis_client);

    let store: Arc<dyn InteractionStore> = Arc::new(CachedInteractionStore::new(
        Arc::new(PgInteractionStore::new(pool)),
        cache,
        config.store_cache_ttl_secs,
    ));
    let engine = RecommendationEngine::new(store, settings);

    let app = create_router(AppState::new(engine)).layer(CorsLayer::permissive());

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
