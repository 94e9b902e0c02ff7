use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;
use tracing::info;

use farewell_types::forms::{EventForm, FormErrors, PhotoBatch, PhotoUploadForm};
use farewell_types::media::MediaKind;
use farewell_types::models::Event;

use crate::error::AppError;
use crate::extract::{Flash, RecordId, read_form};
use crate::render::{Page, redirect, render_page};
use crate::state::{AppState, with_db, with_db_or_discard};

const EVENT_CREATED: &str = "Event created! 📸";
const EVENT_UPDATED: &str = "Event updated! ✨";
const EVENT_DELETED: &str = "Event deleted";
const PHOTOS_UPLOADED: &str = "Photos uploaded! 📸";
const PHOTO_DELETED: &str = "Photo deleted";

/// GET /gallery/: albums newest first, each with its photo count.
pub async fn gallery(State(state): State<AppState>, Query(flash): Query<Flash>) -> Result<Response, AppError> {
    let events = with_db(&state, |db| db.list_events_with_counts()).await?;
    render_page(
        &state,
        StatusCode::OK,
        Page::Gallery,
        json!({ "page_title": "📸 Memories Gallery", "msg": flash.msg, "events": events }),
    )
}

/// GET /gallery/{id}/
pub async fn event_detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Query(flash): Query<Flash>,
) -> Result<Response, AppError> {
    let (event, photos) = with_db(&state, move |db| {
        let Some(event) = db.get_event(id)? else {
            return Ok(None);
        };
        Ok(Some((event, db.list_event_photos(id)?)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    render_page(
        &state,
        StatusCode::OK,
        Page::EventDetail,
        json!({
            "page_title": event.title,
            "msg": flash.msg,
            "event": event,
            "photo_count": photos.len(),
            "photos": photos,
        }),
    )
}

fn event_form_page(
    state: &AppState,
    form: &EventForm,
    errors: &FormErrors,
    event: Option<&Event>,
) -> Result<Response, AppError> {
    let (title, button_text, action) = match event {
        Some(e) => (format!("✏️ Edit {}", e.title), "Update Event", format!("/gallery/{}/edit/", e.id)),
        None => ("✨ Create New Event".to_string(), "Create Event", "/gallery/add/".to_string()),
    };
    render_page(
        state,
        StatusCode::OK,
        Page::EventForm,
        json!({
            "page_title": title,
            "button_text": button_text,
            "action": action,
            "event": event,
            "form": form,
            "errors": errors,
        }),
    )
}

/// GET /gallery/add/
pub async fn add_event_form(State(state): State<AppState>) -> Result<Response, AppError> {
    event_form_page(&state, &EventForm::default(), &FormErrors::default(), None)
}

/// POST /gallery/add/
pub async fn add_event(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let form = EventForm::from_data(&read_form(multipart).await?);
    let (fields, cover) = match form.validate_create() {
        Ok(valid) => valid,
        Err(errors) => return event_form_page(&state, &form, &errors, None),
    };

    let cover_path = state
        .media
        .save(MediaKind::EventCover, &cover)
        .await
        .map_err(AppError::Storage)?;

    let stored = vec![cover_path.clone()];
    let event = with_db_or_discard(&state, &stored, move |db| db.insert_event(&fields, &cover_path)).await?;

    info!("Event {} created: {}", event.id, event.title);
    Ok(redirect("/gallery/", Some(EVENT_CREATED)))
}

/// GET /gallery/{id}/edit/
pub async fn edit_event_form(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let event = with_db(&state, move |db| db.get_event(id)).await?.ok_or(AppError::NotFound)?;
    event_form_page(&state, &EventForm::from_event(&event), &FormErrors::default(), Some(&event))
}

/// POST /gallery/{id}/edit/: a new cover replaces the old file.
pub async fn edit_event(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let event = with_db(&state, move |db| db.get_event(id)).await?.ok_or(AppError::NotFound)?;

    let form = EventForm::from_data(&read_form(multipart).await?);
    let validated = match form.validate_edit() {
        Ok(valid) => valid,
        Err(errors) => return event_form_page(&state, &form, &errors, Some(&event)),
    };

    let new_cover = match &validated.image {
        Some(cover) => Some(
            state
                .media
                .save(MediaKind::EventCover, cover)
                .await
                .map_err(AppError::Storage)?,
        ),
        None => None,
    };

    let stored: Vec<String> = new_cover.iter().cloned().collect();
    let fields = validated.fields;
    let cover = new_cover.clone();
    let updated = with_db_or_discard(&state, &stored, move |db| {
        db.update_event(id, &fields, cover.as_deref())
    })
    .await?;
    if !updated {
        state.media.delete_all(&stored).await;
        return Err(AppError::NotFound);
    }

    if new_cover.is_some() {
        state.media.delete_all(&[event.cover_image]).await;
    }

    info!("Event {} updated", id);
    Ok(redirect(&format!("/gallery/{}/", id), Some(EVENT_UPDATED)))
}

/// POST /gallery/{id}/delete/: removes the album and every photo in it.
pub async fn delete_event(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let removed = with_db(&state, move |db| db.delete_event(id))
        .await?
        .ok_or(AppError::NotFound)?;

    state.media.delete_all(&removed.paths).await;
    Ok(redirect("/gallery/", Some(EVENT_DELETED)))
}

/// GET /gallery/{id}/delete/ does not delete.
pub async fn delete_event_get() -> Response {
    redirect("/gallery/", None)
}

fn upload_page(
    state: &AppState,
    event: &Event,
    form: &PhotoUploadForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    render_page(
        state,
        StatusCode::OK,
        Page::UploadPhotos,
        json!({
            "page_title": format!("📷 Upload to {}", event.title),
            "button_text": "Upload Photos",
            "action": format!("/gallery/{}/upload/", event.id),
            "event": event,
            "form": form,
            "errors": errors,
        }),
    )
}

/// GET /gallery/{id}/upload/
pub async fn upload_photos_form(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let event = with_db(&state, move |db| db.get_event(id)).await?.ok_or(AppError::NotFound)?;
    upload_page(&state, &event, &PhotoUploadForm::default(), &FormErrors::default())
}

/// POST /gallery/{id}/upload/: any number of `images` sharing one caption.
///
/// With no files attached the form is shown again and nothing is created.
/// Files are written first and the rows inserted in one transaction; if
/// the insert fails the written files are removed.
pub async fn upload_photos(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let event = with_db(&state, move |db| db.get_event(id)).await?.ok_or(AppError::NotFound)?;

    let form = PhotoUploadForm::from_data(&read_form(multipart).await?);
    let (images, caption) = match form.validate() {
        Ok(PhotoBatch::Ready { images, caption }) => (images, caption),
        Ok(PhotoBatch::Empty) => return upload_page(&state, &event, &form, &FormErrors::default()),
        Err(errors) => return upload_page(&state, &event, &form, &errors),
    };

    let paths = state
        .media
        .save_all(MediaKind::EventPhoto, &images)
        .await
        .map_err(AppError::Storage)?;

    let batch = paths.clone();
    let photos = with_db_or_discard(&state, &paths, move |db| {
        db.insert_event_photos(id, &batch, caption.as_deref())
    })
    .await?;

    info!("Uploaded {} photos to event {}", photos.len(), id);
    Ok(redirect(&format!("/gallery/{}/", id), Some(PHOTOS_UPLOADED)))
}

/// POST /photo/{id}/delete/: back to the photo's album.
pub async fn delete_photo(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let photo = with_db(&state, move |db| db.delete_event_photo(id))
        .await?
        .ok_or(AppError::NotFound)?;

    state.media.delete_all(&[photo.image]).await;
    info!("Photo {} deleted from event {}", id, photo.event_id);
    Ok(redirect(&format!("/gallery/{}/", photo.event_id), Some(PHOTO_DELETED)))
}

/// GET /photo/{id}/delete/ does not delete.
pub async fn delete_photo_get() -> Response {
    redirect("/gallery/", None)
}
