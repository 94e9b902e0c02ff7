use axum::{
    Form,
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;
use tracing::info;

use farewell_types::forms::{FormErrors, FriendForm, SlamBookForm};
use farewell_types::media::MediaKind;

use crate::error::AppError;
use crate::extract::{Flash, RecordId, read_form};
use crate::render::{Page, redirect, render_page};
use crate::state::{AppState, with_db, with_db_or_discard};

pub const SITE_TITLE: &str = "Farewell Batch 2026 - The Anti-Gravity Squad";

const FRIEND_ADDED: &str = "Friend added successfully! ✨";
const FRIEND_REMOVED: &str = "Friend removed";
const FRIEND_UPDATED: &str = "Friend updated! ✨";
const SCRAP_PINNED: &str = "Scrap pinned! 📌";

/// GET /
pub async fn index(State(state): State<AppState>, Query(flash): Query<Flash>) -> Result<Response, AppError> {
    let friends = with_db(&state, |db| db.list_friends()).await?;
    render_page(
        &state,
        StatusCode::OK,
        Page::Index,
        json!({ "page_title": SITE_TITLE, "msg": flash.msg, "friends": friends }),
    )
}

/// GET /squad-cards/: same friends, drawn as trading cards.
pub async fn squad_cards(State(state): State<AppState>, Query(flash): Query<Flash>) -> Result<Response, AppError> {
    let friends = with_db(&state, |db| db.list_friends()).await?;
    render_page(
        &state,
        StatusCode::OK,
        Page::SquadCards,
        json!({ "page_title": "🃏 Squad Cards", "msg": flash.msg, "friends": friends }),
    )
}

fn friend_form_page(
    state: &AppState,
    form: &FriendForm,
    errors: &FormErrors,
    title: &str,
    button_text: &str,
    action: &str,
) -> Result<Response, AppError> {
    render_page(
        state,
        StatusCode::OK,
        Page::FriendForm,
        json!({
            "page_title": title,
            "button_text": button_text,
            "action": action,
            "form": form,
            "errors": errors,
        }),
    )
}

/// GET /add/
pub async fn add_friend_form(State(state): State<AppState>) -> Result<Response, AppError> {
    friend_form_page(&state, &FriendForm::default(), &FormErrors::default(), "Add a Friend", "Add Friend", "/add/")
}

/// POST /add/
pub async fn add_friend(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let form = FriendForm::from_data(&read_form(multipart).await?);
    let (fields, photo) = match form.validate_create() {
        Ok(valid) => valid,
        Err(errors) => {
            return friend_form_page(&state, &form, &errors, "Add a Friend", "Add Friend", "/add/");
        }
    };

    let photo_path = state
        .media
        .save(MediaKind::FriendPhoto, &photo)
        .await
        .map_err(AppError::Storage)?;

    let stored = vec![photo_path.clone()];
    let friend = with_db_or_discard(&state, &stored, move |db| db.insert_friend(&fields, &photo_path)).await?;

    info!("Friend {} added: {}", friend.id, friend.name);
    Ok(redirect("/", Some(FRIEND_ADDED)))
}

/// POST /delete/{id}/: removes the friend, their awards and slam messages.
pub async fn delete_friend(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let removed = with_db(&state, move |db| db.delete_friend(id))
        .await?
        .ok_or(AppError::NotFound)?;

    state.media.delete_all(&removed.paths).await;
    Ok(redirect("/", Some(FRIEND_REMOVED)))
}

/// GET /delete/{id}/ does not delete; it only bounces back home.
pub async fn delete_friend_get() -> Response {
    redirect("/", None)
}

async fn friend_detail_page(
    state: &AppState,
    id: i64,
    msg: Option<String>,
    slam_form: &SlamBookForm,
    errors: &FormErrors,
) -> Result<Response, AppError> {
    let (friend, slam_messages, awards) = with_db(state, move |db| {
        let Some(friend) = db.get_friend(id)? else {
            return Ok(None);
        };
        let messages = db.list_slam_messages(id)?;
        let awards = db.list_awards_for_friend(id)?;
        Ok(Some((friend, messages, awards)))
    })
    .await?
    .ok_or(AppError::NotFound)?;

    render_page(
        state,
        StatusCode::OK,
        Page::FriendDetail,
        json!({
            "page_title": friend.name,
            "msg": msg,
            "friend": friend,
            "slam_messages": slam_messages,
            "awards": awards,
            "slam_form": slam_form,
            "errors": errors,
        }),
    )
}

/// GET /friend/{id}/
pub async fn friend_detail(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Query(flash): Query<Flash>,
) -> Result<Response, AppError> {
    friend_detail_page(&state, id, flash.msg, &SlamBookForm::default(), &FormErrors::default()).await
}

/// POST /friend/{id}/: pin a slam book message.
pub async fn post_slam_message(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    Form(form): Form<SlamBookForm>,
) -> Result<Response, AppError> {
    let fields = match form.validate() {
        Ok(fields) => fields,
        Err(errors) => return friend_detail_page(&state, id, None, &form, &errors).await,
    };

    let message = with_db(&state, move |db| {
        if db.get_friend(id)?.is_none() {
            return Ok(None);
        }
        db.insert_slam_message(id, &fields).map(Some)
    })
    .await?
    .ok_or(AppError::NotFound)?;

    info!("Slam message {} pinned for friend {} by {}", message.id, id, message.sender_name);
    Ok(redirect(&format!("/friend/{}/", id), Some(SCRAP_PINNED)))
}

/// GET /friend/{id}/edit/
pub async fn edit_friend_form(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let friend = with_db(&state, move |db| db.get_friend(id)).await?.ok_or(AppError::NotFound)?;
    friend_form_page(
        &state,
        &FriendForm::from_friend(&friend),
        &FormErrors::default(),
        &format!("Edit {}", friend.name),
        "Update Friend",
        &format!("/friend/{}/edit/", id),
    )
}

/// POST /friend/{id}/edit/: a new photo replaces the old file.
pub async fn edit_friend(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let friend = with_db(&state, move |db| db.get_friend(id)).await?.ok_or(AppError::NotFound)?;

    let form = FriendForm::from_data(&read_form(multipart).await?);
    let validated = match form.validate_edit() {
        Ok(valid) => valid,
        Err(errors) => {
            return friend_form_page(
                &state,
                &form,
                &errors,
                &format!("Edit {}", friend.name),
                "Update Friend",
                &format!("/friend/{}/edit/", id),
            );
        }
    };

    let new_photo = match &validated.image {
        Some(photo) => Some(
            state
                .media
                .save(MediaKind::FriendPhoto, photo)
                .await
                .map_err(AppError::Storage)?,
        ),
        None => None,
    };

    let stored: Vec<String> = new_photo.iter().cloned().collect();
    let fields = validated.fields;
    let photo = new_photo.clone();
    let updated = with_db_or_discard(&state, &stored, move |db| {
        db.update_friend(id, &fields, photo.as_deref())
    })
    .await?;
    if !updated {
        state.media.delete_all(&stored).await;
        return Err(AppError::NotFound);
    }

    if new_photo.is_some() {
        state.media.delete_all(&[friend.photo]).await;
    }

    info!("Friend {} updated", id);
    Ok(redirect(&format!("/friend/{}/", id), Some(FRIEND_UPDATED)))
}
