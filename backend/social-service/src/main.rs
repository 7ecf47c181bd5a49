use actix_middleware::{SessionAuth, SessionKeys};
use actix_web::{web, App, HttpServer};
use anyhow::{Context, Result};
use social_service::config::{Config, StorageBackend};
use social_service::handlers;
use social_service::logging::init_tracing;
use social_service::state::AppState;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::{info, warn};
use tracing_actix_web::TracingLogger;

async fn build_state(config: &Config) -> Result<AppState> {
    match config.storage.backend {
        StorageBackend::Memory => {
            warn!("Using in-memory storage; data is lost on restart");
            let (state, _identities) = AppState::in_memory();
            Ok(state)
        }
        StorageBackend::Postgres => {
            let database = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for the postgres backend")?;

            let pool = PgPoolOptions::new()
                .max_connections(database.max_connections)
                .min_connections(database.min_connections)
                .acquire_timeout(Duration::from_secs(10))
                .idle_timeout(Duration::from_secs(600))
                .max_lifetime(Duration::from_secs(1800))
                .connect(&database.url)
                .await
                .context("Failed to connect to database")?;

            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .context("Failed to run database migrations")?;
            info!("Database pool created and migrations applied");

            Ok(AppState::with_postgres(pool))
        }
    }
}

#[actix_web::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    info!("Starting social-service");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        env = %config.app.env,
        http_port = config.app.http_port,
        backend = ?config.storage.backend,
        "Configuration loaded"
    );

    let state = web::Data::new(build_state(&config).await?);
    let keys = SessionKeys::from_secret(config.auth.jwt_secret.as_bytes());

    let http_addr = format!("{}:{}", config.app.host, config.app.http_port);
    info!("HTTP server listening on {}", http_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(SessionAuth::new(keys.clone()))
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
    })
    .bind(&http_addr)
    .context("Failed to bind HTTP server")?
    .run()
    .await
    .context("HTTP server error")?;

    info!("social-service stopped");
    Ok(())
}
