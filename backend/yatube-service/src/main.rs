use actix_web::{web, HttpServer};
use anyhow::{anyhow, Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use yatube_service::cache::{MemoryPageCache, PageCache, RedisPageCache};
use yatube_service::config::{CacheBackend, StorageBackend};
use yatube_service::db::{self, MemoryStore, PgStore, Store};
use yatube_service::{build_app, AppState, Config};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());
    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn build_store(config: &Config) -> Result<Arc<dyn Store>> {
    match config.storage.backend {
        StorageBackend::Postgres => {
            let pool = db::create_pool(&config.storage)
                .await
                .context("Failed to connect to PostgreSQL")?;
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            info!("Connected to PostgreSQL, migrations applied");
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

async fn build_page_cache(config: &Config) -> Arc<dyn PageCache> {
    let ttl = Duration::from_secs(config.cache.index_ttl_secs);
    let memory = || -> Arc<dyn PageCache> {
        Arc::new(MemoryPageCache::new(ttl, config.cache.max_entries))
    };

    match config.cache.backend {
        CacheBackend::Redis => match RedisPageCache::connect(&config.cache.redis_url, ttl).await {
            Ok(cache) => {
                info!("Connected to Redis for page caching");
                Arc::new(cache)
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to Redis - falling back to in-memory page cache");
                memory()
            }
        },
        CacheBackend::Memory => memory(),
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().map_err(|e| anyhow!("Failed to load configuration: {}", e))?;
    init_tracing(config.app.json_logs);

    info!(
        env = %config.app.env,
        storage = ?config.storage.backend,
        cache = ?config.cache.backend,
        "Starting yatube-service"
    );

    tokio::fs::create_dir_all(&config.media.root)
        .await
        .with_context(|| format!("Failed to create media root {}", config.media.root.display()))?;

    let store = build_store(&config).await?;
    let page_cache = build_page_cache(&config).await;

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    let state = web::Data::new(AppState::new(config, store, page_cache));

    info!("HTTP server listening on {}", bind_address);
    HttpServer::new(move || build_app(state.clone()))
        .bind(&bind_address)
        .with_context(|| format!("Failed to bind {}", bind_address))?
        .run()
        .await
        .context("HTTP server error")?;

    info!("yatube-service stopped");
    Ok(())
}
