use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use filmlog_api::{
    api::{create_router, AppState, EngineSettings},
    config::Config,
    db::{
        cache::{create_redis_client, RedisCache},
        postgres::run_migrations,
        create_pool, Cache, PgStore,
    },
    services::{
        providers::{
            CachedCatalog, CatalogGateway, DisabledGenerator, GeminiClient, TextGenerator,
            TmdbCatalog,
        },
        recommendations::UniformPicker,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "filmlog_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(true))
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url)
        .await
        .context("Failed to connect to Postgres")?;
    run_migrations(&pool).await.context("Failed to run migrations")?;

    let redis_client = create_redis_client(&config.redis_url)?;
    let (redis_cache, cache_writer) = RedisCache::new(redis_client);

    let retry = config.retry_policy();
    let tmdb: Arc<dyn CatalogGateway> = Arc::new(TmdbCatalog::new(
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        retry,
    ));
    let catalog: Arc<dyn CatalogGateway> = Arc::new(CachedCatalog::new(
        tmdb,
        Cache::new(redis_cache),
        config.catalog_cache_ttl_secs,
    ));

    let generator: Arc<dyn TextGenerator> = match &config.gemini_api_key {
        Some(key) => Arc::new(GeminiClient::new(
            key.clone(),
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            retry,
        )),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, generative suggestions disabled");
            Arc::new(DisabledGenerator)
        }
    };

    let state = AppState::new(
        Arc::new(PgStore::new(pool)),
        catalog,
        generator,
        EngineSettings {
            seed_count: config.seed_count,
            trending_formula: config.trending_formula(),
            picker: Arc::new(UniformPicker),
        },
    );
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cache_writer.shutdown().await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "SIGTERM handler unavailable, listening for Ctrl-C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
