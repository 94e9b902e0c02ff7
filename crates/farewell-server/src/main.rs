mod config;

use axum::extract::DefaultBodyLimit;
use tower_http::trace::TraceLayer;
use tracing::info;

use farewell_api::media::MediaStore;
use farewell_api::html::HtmlRenderer;
use farewell_api::{AppStateInner, build_router};
use farewell_db::Database;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "farewell=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and media storage
    let db = Database::open(&config.db_path)?;
    let media = MediaStore::new(config.media_dir.clone()).await?;

    let state = AppStateInner::new(db, media, HtmlRenderer);

    let app = build_router(state)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http());

    let addr = config.addr()?;
    info!("Farewell site listening on http://{}", addr);
    info!("Upload limit: {} MB", config.max_upload_bytes / (1024 * 1024));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        let Ok(mut sigterm) = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) else {
            ctrl_c.await.ok();
            info!("Received Ctrl+C, shutting down...");
            return;
        };
        tokio::select! {
            _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
            _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
