//! Page rendering.
//!
//! Handlers build a JSON context and hand it to a [`Renderer`] together
//! with the [`Page`] to draw. [`crate::html::HtmlRenderer`] is the built-in
//! implementation; a themed site only has to implement the trait.

use axum::{
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use serde_json::Value;

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    SquadCards,
    FriendForm,
    FriendDetail,
    Gallery,
    EventDetail,
    EventForm,
    UploadPhotos,
    Timeline,
    MilestoneForm,
    DeleteMilestone,
    Awards,
    Newspaper,
    NotFound,
    BadRequest,
    ServerError,
}

impl Page {
    pub fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::SquadCards => "squad_cards",
            Self::FriendForm => "friend_form",
            Self::FriendDetail => "friend_detail",
            Self::Gallery => "gallery",
            Self::EventDetail => "event_detail",
            Self::EventForm => "event_form",
            Self::UploadPhotos => "upload_photos",
            Self::Timeline => "timeline",
            Self::MilestoneForm => "milestone_form",
            Self::DeleteMilestone => "delete_milestone",
            Self::Awards => "awards",
            Self::Newspaper => "newspaper",
            Self::NotFound => "not_found",
            Self::BadRequest => "bad_request",
            Self::ServerError => "server_error",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            Self::NotFound => "Page Not Found",
            Self::BadRequest => "Bad Request",
            Self::ServerError => "Something Went Wrong",
            _ => "Farewell",
        }
    }
}

/// Turns a page plus its context mapping into HTML.
pub trait Renderer: Send + Sync {
    fn render(&self, page: Page, context: &Value) -> anyhow::Result<String>;
}

/// Render `page` through the state's renderer.
pub fn render_page(state: &AppState, status: StatusCode, page: Page, context: Value) -> Result<Response, AppError> {
    let body = state.renderer.render(page, &context).map_err(AppError::Render)?;
    Ok((status, Html(body)).into_response())
}

/// 302 to `path`, carrying `msg` as the flash query parameter.
pub fn redirect(path: &str, msg: Option<&str>) -> Response {
    let location = match msg {
        Some(msg) => format!("{}?msg={}", path, urlencoding::encode(msg)),
        None => path.to_string(),
    };
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}
