use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use pos_customer::config::AppConfig;
use pos_customer::repository::{CustomerRepository, MemoryCustomerRepository, PgCustomerRepository};
use pos_customer::{db, routes, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pos_customer=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("DATABASE_URL must be set")?;

    let customers: Arc<dyn CustomerRepository> = if config.uses_memory_store() {
        tracing::warn!("Using in-memory customer store; data is lost on exit");
        Arc::new(MemoryCustomerRepository::new())
    } else {
        let pool = db::create_pool(&config)
            .await
            .context("Failed to connect to database")?;
        if config.run_migrations {
            db::run_migrations(&pool)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Database migrations applied");
        }
        Arc::new(PgCustomerRepository::new(pool))
    };

    let addr = format!("{}:{}", config.host, config.port);
    let app = routes::router(AppState {
        customers,
        config: config.clone(),
    });

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(addr = %addr, default_lang = config.default_lang.as_str(), "Starting customer API server");
    axum::serve(listener, app).await?;

    Ok(())
}
