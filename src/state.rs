use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::media::AssetStore;

/// Shared per-process context, constructed once in `main` and passed down
/// through axum state. No module-level singletons.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub media: Arc<dyn AssetStore>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(pool: PgPool, media: Arc<dyn AssetStore>, config: AppConfig) -> Self {
        Self {
            pool,
            media,
            config: Arc::new(config),
        }
    }
}
