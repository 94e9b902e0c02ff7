//! HTTP layer of the farewell site: handlers, shared state, media storage
//! and page rendering.

use axum::Router;
use axum::middleware::map_response_with_state;
use axum::routing::get;
use tower_http::services::ServeDir;

pub mod awards;
pub mod error;
pub mod extract;
pub mod friends;
pub mod gallery;
pub mod html;
pub mod media;
pub mod pages;
pub mod render;
pub mod state;
pub mod timeline;

pub use state::{AppState, AppStateInner};

/// Build the application router. Uploaded files are served from the media
/// root under `/media/`; error pages go through the state's renderer.
pub fn build_router(state: AppState) -> Router {
    let media = ServeDir::new(state.media.root());

    Router::new()
        // Friends + slam book
        .route("/", get(friends::index))
        .route("/squad-cards/", get(friends::squad_cards))
        .route("/add/", get(friends::add_friend_form).post(friends::add_friend))
        .route("/delete/{id}/", get(friends::delete_friend_get).post(friends::delete_friend))
        .route("/friend/{id}/", get(friends::friend_detail).post(friends::post_slam_message))
        .route("/friend/{id}/edit/", get(friends::edit_friend_form).post(friends::edit_friend))
        // Gallery
        .route("/gallery/", get(gallery::gallery))
        .route("/gallery/add/", get(gallery::add_event_form).post(gallery::add_event))
        .route("/gallery/{id}/", get(gallery::event_detail))
        .route("/gallery/{id}/edit/", get(gallery::edit_event_form).post(gallery::edit_event))
        .route("/gallery/{id}/delete/", get(gallery::delete_event_get).post(gallery::delete_event))
        .route("/gallery/{id}/upload/", get(gallery::upload_photos_form).post(gallery::upload_photos))
        .route("/photo/{id}/delete/", get(gallery::delete_photo_get).post(gallery::delete_photo))
        // Timeline
        .route("/timeline/", get(timeline::timeline))
        .route("/timeline/add/", get(timeline::add_milestone_form).post(timeline::add_milestone))
        .route("/timeline/edit/{id}/", get(timeline::edit_milestone_form).post(timeline::edit_milestone))
        .route(
            "/timeline/delete/{id}/",
            get(timeline::confirm_delete_milestone).post(timeline::delete_milestone),
        )
        // Everything else
        .route("/awards/", get(awards::awards))
        .route("/newspaper/", get(pages::newspaper))
        .route("/health", get(pages::health))
        .nest_service("/media", media)
        .fallback(pages::not_found)
        .layer(map_response_with_state(state.clone(), error::render_error_pages))
        .with_state(state)
}

