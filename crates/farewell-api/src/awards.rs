use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;

use crate::error::AppError;
use crate::extract::Flash;
use crate::render::{Page, render_page};
use crate::state::{AppState, with_db};

/// GET /awards/: every award with its winner joined in.
pub async fn awards(State(state): State<AppState>, Query(flash): Query<Flash>) -> Result<Response, AppError> {
    let awards = with_db(&state, |db| db.list_awards()).await?;
    render_page(
        &state,
        StatusCode::OK,
        Page::Awards,
        json!({ "page_title": "🏆 Fun Awards", "msg": flash.msg, "awards": awards }),
    )
}
