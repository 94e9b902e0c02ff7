use axum::{
    extract::{State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{error, warn};

use crate::html::HtmlRenderer;
use crate::render::{Page, Renderer};
use crate::state::AppState;

/// Everything a handler can fail with. Validation failures are not errors:
/// handlers re-render the form instead.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(anyhow::Error),

    #[error("media storage error: {0}")]
    Storage(anyhow::Error),

    #[error("render error: {0}")]
    Render(anyhow::Error),

    #[error("malformed form submission: {0}")]
    Multipart(#[from] MultipartError),

    #[error("blocking task failed")]
    Join,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Multipart(e) => e.status(),
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let page = match &self {
            Self::NotFound => Page::NotFound,
            Self::Multipart(e) => {
                warn!("Rejected form submission: {}", e);
                Page::BadRequest
            }
            other => {
                error!("Request failed: {}", other);
                Page::ServerError
            }
        };

        // Drawn with the built-in renderer here; `render_error_pages`
        // swaps in the configured one once the response reaches the router.
        let body = HtmlRenderer
            .render(page, &error_context(page))
            .unwrap_or_else(|_| page.default_title().to_string());
        let mut response = (status, Html(body)).into_response();
        response.extensions_mut().insert(ErrorPage(page));
        response
    }
}

/// Marks a response built from an [`AppError`].
#[derive(Debug, Clone, Copy)]
pub struct ErrorPage(pub Page);

fn error_context(page: Page) -> Value {
    json!({ "page_title": page.default_title() })
}

/// Response mapper installed by `build_router`: redraws error pages with
/// the state's renderer. If that fails the built-in page is kept.
pub async fn render_error_pages(State(state): State<AppState>, mut response: Response) -> Response {
    let Some(ErrorPage(page)) = response.extensions_mut().remove::<ErrorPage>() else {
        return response;
    };
    match state.renderer.render(page, &error_context(page)) {
        Ok(body) => (response.status(), Html(body)).into_response(),
        Err(e) => {
            error!("Failed to render {} page: {}", page.name(), e);
            response
        }
    }
}
