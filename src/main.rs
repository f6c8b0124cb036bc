use std::sync::Arc;

use catalog_api::config::AppConfig;
use catalog_api::database;
use catalog_api::media::{AssetStore, CloudMediaHost};
use catalog_api::router::app;
use catalog_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env()?;
    tracing::info!("starting catalog API in {:?} mode", config.environment);

    let pool = database::connect(&config.database).await?;
    let media: Arc<dyn AssetStore> = Arc::new(CloudMediaHost::new(&config.media));

    let port = config.server.port;
    // Multipart bodies carry the image plus text fields; allow some slack
    let body_limit = config.upload.max_bytes + 1024 * 1024;
    let state = AppState::new(pool, media, config);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("catalog API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, body_limit)).await?;
    Ok(())
}
