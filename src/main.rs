use std::env;

use actix_web::{middleware::NormalizePath, web, App, HttpServer};
use anyhow::Context;
use student_registry::{
    db::postgres::{create_pool, run_migrations},
    graceful_shutdown::shutdown_signal,
    routes::{configure_routes, payload_errors::multipart_config},
    settings::AppConfig,
    storage::{FileStore, LocalFileStore},
    web::cors::build_cors,
    AppState,
};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("APP_ENV").is_ok_and(|v| v.eq_ignore_ascii_case("production"));

    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Brings up the file store and the database; any failure is fatal.
async fn bootstrap(config: &AppConfig) -> anyhow::Result<AppState> {
    let file_store = LocalFileStore::new(config.upload_root());
    file_store
        .init()
        .await
        .with_context(|| format!("initializing file storage at {}", config.upload_root().display()))?;

    let pool = create_pool(&config.database_url)
        .await
        .context("creating database connection pool")?;

    run_migrations(&pool).await.context("running database migrations")?;

    Ok(AppState::new(config, pool, file_store))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_tracing();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        },
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let app_state = match bootstrap(&config).await {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            std::process::exit(1);
        }
    };

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let app_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(multipart_config(app_config.max_upload_bytes))
            .wrap(NormalizePath::trim())
            .wrap(build_cors(&app_config))
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .disable_signals()
    .bind(server_addr)?
    .run();

    let handle = server.handle();
    tokio::spawn(async move {
        shutdown_signal().await;
        handle.stop(true).await;
    });

    server.await
}
