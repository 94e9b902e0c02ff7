use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    response::Response,
};
use serde_json::json;
use tracing::info;

use farewell_types::forms::{FormErrors, MilestoneForm};
use farewell_types::media::MediaKind;
use farewell_types::models::TimelineEvent;

use crate::error::AppError;
use crate::extract::{Flash, RecordId, read_form};
use crate::render::{Page, redirect, render_page};
use crate::state::{AppState, with_db, with_db_or_discard};

const MEMORY_SAVED: &str = "Memory saved! ✨";
const MEMORY_UPDATED: &str = "Memory updated! ✏️";
const MEMORY_REMOVED: &str = "Memory removed 🗑️";

/// GET /timeline/: oldest milestone first.
pub async fn timeline(State(state): State<AppState>, Query(flash): Query<Flash>) -> Result<Response, AppError> {
    let milestones = with_db(&state, |db| db.list_milestones()).await?;
    render_page(
        &state,
        StatusCode::OK,
        Page::Timeline,
        json!({ "page_title": "🎓 Our College Journey", "msg": flash.msg, "milestones": milestones }),
    )
}

fn milestone_form_page(
    state: &AppState,
    form: &MilestoneForm,
    errors: &FormErrors,
    milestone: Option<&TimelineEvent>,
) -> Result<Response, AppError> {
    let (title, button_text, action) = match milestone {
        Some(m) => (format!("✏️ Edit: {}", m.title), "Update Memory", format!("/timeline/edit/{}/", m.id)),
        None => ("📝 Add a Milestone".to_string(), "Save Memory", "/timeline/add/".to_string()),
    };
    render_page(
        state,
        StatusCode::OK,
        Page::MilestoneForm,
        json!({
            "page_title": title,
            "button_text": button_text,
            "action": action,
            "milestone": milestone,
            "form": form,
            "errors": errors,
        }),
    )
}

/// GET /timeline/add/
pub async fn add_milestone_form(State(state): State<AppState>) -> Result<Response, AppError> {
    milestone_form_page(&state, &MilestoneForm::default(), &FormErrors::default(), None)
}

/// POST /timeline/add/
pub async fn add_milestone(State(state): State<AppState>, multipart: Multipart) -> Result<Response, AppError> {
    let form = MilestoneForm::from_data(&read_form(multipart).await?);
    let validated = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return milestone_form_page(&state, &form, &errors, None),
    };

    let image = match &validated.image {
        Some(file) => Some(state.media.save(MediaKind::Timeline, file).await.map_err(AppError::Storage)?),
        None => None,
    };

    let stored: Vec<String> = image.iter().cloned().collect();
    let fields = validated.fields;
    let milestone = with_db_or_discard(&state, &stored, move |db| {
        db.insert_milestone(&fields, image.as_deref())
    })
    .await?;

    info!("Milestone {} saved: {}", milestone.id, milestone.title);
    Ok(redirect("/timeline/", Some(MEMORY_SAVED)))
}

/// GET /timeline/edit/{id}/
pub async fn edit_milestone_form(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let milestone = with_db(&state, move |db| db.get_milestone(id)).await?.ok_or(AppError::NotFound)?;
    milestone_form_page(&state, &MilestoneForm::from_milestone(&milestone), &FormErrors::default(), Some(&milestone))
}

/// POST /timeline/edit/{id}/
pub async fn edit_milestone(
    State(state): State<AppState>,
    RecordId(id): RecordId,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let milestone = with_db(&state, move |db| db.get_milestone(id)).await?.ok_or(AppError::NotFound)?;

    let form = MilestoneForm::from_data(&read_form(multipart).await?);
    let validated = match form.validate() {
        Ok(valid) => valid,
        Err(errors) => return milestone_form_page(&state, &form, &errors, Some(&milestone)),
    };

    let new_image = match &validated.image {
        Some(file) => Some(state.media.save(MediaKind::Timeline, file).await.map_err(AppError::Storage)?),
        None => None,
    };

    let stored: Vec<String> = new_image.iter().cloned().collect();
    let fields = validated.fields;
    let image = new_image.clone();
    let updated = with_db_or_discard(&state, &stored, move |db| {
        db.update_milestone(id, &fields, image.as_deref())
    })
    .await?;
    if !updated {
        state.media.delete_all(&stored).await;
        return Err(AppError::NotFound);
    }

    if let (Some(_), Some(old)) = (&new_image, milestone.image) {
        state.media.delete_all(&[old]).await;
    }

    info!("Milestone {} updated", id);
    Ok(redirect("/timeline/", Some(MEMORY_UPDATED)))
}

/// GET /timeline/delete/{id}/: confirmation page; nothing is deleted yet.
pub async fn confirm_delete_milestone(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Response, AppError> {
    let milestone = with_db(&state, move |db| db.get_milestone(id)).await?.ok_or(AppError::NotFound)?;
    render_page(
        &state,
        StatusCode::OK,
        Page::DeleteMilestone,
        json!({
            "page_title": format!("Delete: {}", milestone.title),
            "milestone": milestone,
        }),
    )
}

/// POST /timeline/delete/{id}/
pub async fn delete_milestone(State(state): State<AppState>, RecordId(id): RecordId) -> Result<Response, AppError> {
    let milestone = with_db(&state, move |db| db.delete_milestone(id))
        .await?
        .ok_or(AppError::NotFound)?;

    if let Some(image) = milestone.image {
        state.media.delete_all(&[image]).await;
    }
    info!("Milestone {} removed", id);
    Ok(redirect("/timeline/", Some(MEMORY_REMOVED)))
}
