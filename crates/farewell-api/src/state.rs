use std::sync::Arc;

use tracing::error;

use farewell_db::Database;

use crate::error::AppError;
use crate::media::MediaStore;
use crate::render::Renderer;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub media: MediaStore,
    pub renderer: Box<dyn Renderer>,
}

impl AppStateInner {
    pub fn new(db: Database, media: MediaStore, renderer: impl Renderer + 'static) -> AppState {
        Arc::new(Self {
            db,
            media,
            renderer: Box::new(renderer),
        })
    }
}

/// Run a blocking DB call off the async runtime.
pub async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            AppError::Join
        })?
        .map_err(AppError::Database)
}

/// Like [`with_db`], for writes that reference freshly stored media. If the
/// write fails, the files are deleted again so no orphans are left behind.
pub async fn with_db_or_discard<F, T>(state: &AppState, media: &[String], f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let result = with_db(state, f).await;
    if result.is_err() {
        state.media.delete_all(media).await;
    }
    result
}
