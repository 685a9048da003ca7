mod config;
mod db;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use actix_web::{
    middleware::{Logger, NormalizePath},
    web, App, HttpServer,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::db::Database;
use crate::services::{TagRecordService, TagRecordStore};
use crate::state::AppState;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting tag registry");

    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    info!(
        "Running on port {}, saving data in directory {}, api prefix: {:?}",
        config.port,
        config.data_dir.display(),
        config.api_prefix
    );

    let database_path = config.database_path();
    info!("sqlite db path: {}", database_path.display());
    let db = Database::open(&database_path, config.db_max_connections).await?;
    db.run_migrations().await?;
    info!("Database ready");

    let store: Arc<dyn TagRecordStore> = Arc::new(TagRecordService::new(db));
    let store = web::Data::from(store);
    let state = web::Data::new(AppState::new(config.clone()));

    let bind_addr = config.bind_addr();
    let api_prefix = config.api_prefix.clone();
    info!("Starting HTTP server on {}", bind_addr);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(store.clone())
            .wrap(Logger::default())
            .wrap(NormalizePath::trim())
            .configure(routes::create_routes(api_prefix.clone()))
    })
    .bind(&bind_addr)?
    .run()
    .await?;

    Ok(())
}
