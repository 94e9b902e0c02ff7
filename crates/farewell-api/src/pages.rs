use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::AppError;
use crate::render::{Page, render_page};
use crate::state::{AppState, with_db};

/// How many slam book entries the gazette quotes.
const GAZETTE_MESSAGES: u32 = 5;

/// GET /newspaper/: the class gazette: totals, the latest album, recent
/// slam book entries, the awards and the whole timeline on one page.
pub async fn newspaper(State(state): State<AppState>) -> Result<Response, AppError> {
    let (counts, events, recent_messages, awards, milestones) = with_db(&state, |db| {
        Ok((
            db.site_counts()?,
            db.list_events_with_counts()?,
            db.recent_slam_messages(GAZETTE_MESSAGES)?,
            db.list_awards()?,
            db.list_milestones()?,
        ))
    })
    .await?;

    render_page(
        &state,
        StatusCode::OK,
        Page::Newspaper,
        json!({
            "page_title": "📰 The Farewell Gazette",
            "counts": counts,
            "latest_event": events.first(),
            "recent_messages": recent_messages,
            "awards": awards,
            "milestones": milestones,
        }),
    )
}

/// Fallback for unmatched routes: the same not-found page a missing
/// record gets.
pub async fn not_found() -> AppError {
    AppError::NotFound
}

/// GET /health
pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}
