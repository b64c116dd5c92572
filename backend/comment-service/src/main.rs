use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use comment_service::config::{Config, StorageBackend};
use comment_service::db::{create_pool, InMemoryGateway, PersistenceGateway, PgGateway, MIGRATOR};
use comment_service::{handlers, AppState};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

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

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = terminate.recv() => {},
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler; waiting for Ctrl+C");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}

async fn build_gateway(config: &Config) -> anyhow::Result<Arc<dyn PersistenceGateway>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Ok(Arc::new(InMemoryGateway::new()))
        }
        StorageBackend::Postgres => {
            config.database.log_config();
            let pool = create_pool(&config.database)
                .await
                .context("Failed to create database pool")?;

            if config.storage.run_migrations {
                MIGRATOR
                    .run(&pool)
                    .await
                    .context("Failed to run database migrations")?;
                tracing::info!("Database migrations applied");
            }

            Ok(Arc::new(PgGateway::new(pool)))
        }
    }
}

/// Comment Service
///
/// # Routes
///
/// - `/api/v1/users/*` - Create and fetch users, list a user's posts
/// - `/api/v1/posts/*` - Create posts, rank posts, react to posts
/// - `/api/v1/comments/*` - Add comments and replies, rank them, react to them
/// - `/api/v1/health`, `/api/v1/health/live` - Health checks
/// - `/metrics` - Prometheus metrics
#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.logging.json);

    tracing::info!("Starting comment-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let gateway = build_gateway(&config).await?;
    let state = web::Data::new(AppState::new(gateway, config.pagination.clone()));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let cors_config = config.cors.clone();
    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in cors_config.origins() {
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .shutdown_timeout(30)
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, stopping HTTP server");
        handle.stop(true).await;
    });

    server.await.context("HTTP server error")?;
    tracing::info!("comment-service stopped");
    Ok(())
}
