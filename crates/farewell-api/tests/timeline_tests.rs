//! Router tests for the timeline, awards, the gazette and the fallbacks.

mod common;

use axum::http::StatusCode;
use chrono::NaiveDate;
use farewell_types::models::{MilestoneFields, SlamFields, TimelineEvent};

use common::{JPEG, MultipartForm, TestApp, location, rendered};

fn seed_milestone(app: &TestApp, title: &str, date: &str) -> TimelineEvent {
    let fields = MilestoneFields {
        title: title.to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        description: format!("{title} happened"),
    };
    app.state.db.insert_milestone(&fields, None).unwrap()
}

// =============================================================================
// Timeline
// =============================================================================

#[tokio::test]
async fn test_timeline_is_chronological() {
    let app = TestApp::new().await;
    seed_milestone(&app, "Graduation", "2026-05-30");
    seed_milestone(&app, "First Day", "2022-08-01");
    seed_milestone(&app, "Tech Fest Win", "2024-02-14");

    let body = rendered(app.get("/timeline/").await).await;
    assert_eq!(body["page"], "timeline");
    let titles: Vec<&str> = body["context"]["milestones"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["First Day", "Tech Fest Win", "Graduation"]);
}

#[tokio::test]
async fn test_add_milestone_with_optional_image() {
    let app = TestApp::new().await;

    let form = MultipartForm::new()
        .text("title", "First Day")
        .text("date", "2022-08-01")
        .text("description", "Lost in the corridors");
    let response = app.post_multipart("/timeline/add/", form).await;
    assert!(location(&response).starts_with("/timeline/?msg="));

    let form = MultipartForm::new()
        .text("title", "Sports Day")
        .text("date", "2023-01-20")
        .text("description", "Relay gold")
        .file("image", "relay.jpg", "image/jpeg", JPEG);
    app.post_multipart("/timeline/add/", form).await;

    let milestones = app.state.db.list_milestones().unwrap();
    assert_eq!(milestones.len(), 2);
    assert_eq!(milestones[0].image, None);
    let image = milestones[1].image.as_deref().unwrap();
    assert!(image.starts_with("timeline/"));
    assert!(app.media_exists(image));
}

#[tokio::test]
async fn test_add_milestone_requires_description() {
    let app = TestApp::new().await;

    let form = MultipartForm::new()
        .text("title", "First Day")
        .text("date", "2022-08-01")
        .text("description", "   ");
    let response = app.post_multipart("/timeline/add/", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = rendered(response).await;
    assert_eq!(body["page"], "milestone_form");
    assert!(body["context"]["errors"]["description"].is_string());
    assert!(app.state.db.list_milestones().unwrap().is_empty());
}

#[tokio::test]
async fn test_edit_milestone_updates_fields() {
    let app = TestApp::new().await;
    let milestone = seed_milestone(&app, "First Day", "2022-08-01");

    let form_page = rendered(app.get(&format!("/timeline/edit/{}/", milestone.id)).await).await;
    assert_eq!(form_page["context"]["form"]["title"], "First Day");
    assert_eq!(form_page["context"]["form"]["date"], "2022-08-01");

    let form = MultipartForm::new()
        .text("title", "Orientation Day")
        .text("date", "2022-07-30")
        .text("description", "Name tags everywhere");
    let response = app
        .post_multipart(&format!("/timeline/edit/{}/", milestone.id), form)
        .await;
    assert!(location(&response).starts_with("/timeline/?msg="));

    let updated = app.state.db.get_milestone(milestone.id).unwrap().unwrap();
    assert_eq!(updated.title, "Orientation Day");
    assert_eq!(updated.date.to_string(), "2022-07-30");
}

#[tokio::test]
async fn test_get_delete_shows_confirmation_without_deleting() {
    let app = TestApp::new().await;
    let milestone = seed_milestone(&app, "Graduation", "2026-05-30");

    let response = app.get(&format!("/timeline/delete/{}/", milestone.id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = rendered(response).await;
    assert_eq!(body["page"], "delete_milestone");
    assert_eq!(body["context"]["milestone"]["title"], "Graduation");
    assert!(app.state.db.get_milestone(milestone.id).unwrap().is_some());

    let response = app.post_empty(&format!("/timeline/delete/{}/", milestone.id)).await;
    assert!(location(&response).starts_with("/timeline/?msg="));
    assert!(app.state.db.get_milestone(milestone.id).unwrap().is_none());
}

#[tokio::test]
async fn test_missing_milestone_is_404() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/timeline/edit/5/").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.get("/timeline/delete/5/").await.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.post_empty("/timeline/delete/5/").await.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Awards + gazette
// =============================================================================

#[tokio::test]
async fn test_awards_page_shows_winner_names() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Kabir");
    app.state.db.insert_award("Canteen King", friend.id, Some("🍔")).unwrap();

    let body = rendered(app.get("/awards/").await).await;
    assert_eq!(body["page"], "awards");
    let award = &body["context"]["awards"][0];
    assert_eq!(award["title"], "Canteen King");
    assert_eq!(award["winner_name"], "Kabir");
}

#[tokio::test]
async fn test_newspaper_aggregates_site() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Kabir");
    app.seed_event("Old Trip", "2023-01-01");
    let latest = app.seed_event("Farewell Party", "2026-04-01");
    seed_milestone(&app, "First Day", "2022-08-01");
    app.state
        .db
        .insert_slam_message(
            friend.id,
            &SlamFields {
                sender_name: "Meera".into(),
                message: "Stay weird".into(),
            },
        )
        .unwrap();

    let body = rendered(app.get("/newspaper/").await).await;
    assert_eq!(body["page"], "newspaper");
    let context = &body["context"];
    assert_eq!(context["counts"]["friends"], 1);
    assert_eq!(context["counts"]["events"], 2);
    assert_eq!(context["counts"]["milestones"], 1);
    assert_eq!(context["counts"]["messages"], 1);
    assert_eq!(context["latest_event"]["id"], latest.id);
    assert_eq!(context["recent_messages"][0]["friend_name"], "Kabir");
}

// =============================================================================
// Health + fallback
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;
    let response = app.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = rendered(response).await;
    assert_eq!(body["status"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_unknown_route_renders_not_found_page() {
    let app = TestApp::new().await;
    let response = app.get("/no-such-page/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = rendered(response).await;
    assert_eq!(body["page"], "not_found");
}
