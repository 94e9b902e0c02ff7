//! Router tests for the friends directory and the slam book.

mod common;

use axum::http::StatusCode;
use farewell_types::models::SlamFields;

use common::{JPEG, MultipartForm, TestApp, decoded_msg, location, rendered};

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_index_lists_friends_alphabetically() {
    let app = TestApp::new().await;
    app.seed_friend("Zara");
    app.seed_friend("aman");
    app.seed_friend("Meera");

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = rendered(response).await;
    assert_eq!(body["page"], "index");
    let names: Vec<&str> = body["context"]["friends"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["aman", "Meera", "Zara"]);
    assert!(body["context"]["msg"].is_null());
}

#[tokio::test]
async fn test_flash_message_is_passed_to_page() {
    let app = TestApp::new().await;
    let body = rendered(app.get("/?msg=Friend%20removed").await).await;
    assert_eq!(body["context"]["msg"], "Friend removed");
}

#[tokio::test]
async fn test_squad_cards_share_the_friend_list() {
    let app = TestApp::new().await;
    app.seed_friend("Kabir");

    let body = rendered(app.get("/squad-cards/").await).await;
    assert_eq!(body["page"], "squad_cards");
    assert_eq!(body["context"]["friends"][0]["name"], "Kabir");
}

// =============================================================================
// Create
// =============================================================================

#[tokio::test]
async fn test_add_friend_saves_photo_and_redirects_home() {
    let app = TestApp::new().await;

    let form = MultipartForm::new()
        .text("name", "Priya")
        .text("nickname", "Pri")
        .text("memory_text", "Canteen chai every morning")
        .text("future_goal", "")
        .file("photo", "priya.jpg", "image/jpeg", JPEG);
    let response = app.post_multipart("/add/", form).await;

    let location = location(&response);
    assert!(location.starts_with("/?msg="));
    assert_eq!(decoded_msg(&location), "Friend added successfully! ✨");

    let friends = app.state.db.list_friends().unwrap();
    assert_eq!(friends.len(), 1);
    let friend = &friends[0];
    assert_eq!(friend.name, "Priya");
    assert_eq!(friend.future_goal, None);
    assert!(friend.photo.starts_with("friend_photos/"));
    assert!(friend.photo.ends_with(".jpg"));
    assert!(app.media_exists(&friend.photo));
}

#[tokio::test]
async fn test_add_friend_without_name_or_photo_rerenders_form() {
    let app = TestApp::new().await;

    let form = MultipartForm::new()
        .text("name", "")
        .text("nickname", "Ghost")
        .text("memory_text", "Never seen in class");
    let response = app.post_multipart("/add/", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = rendered(response).await;
    assert_eq!(body["page"], "friend_form");
    let errors = &body["context"]["errors"];
    assert!(errors["name"].is_string());
    assert!(errors["photo"].is_string());
    // Submitted values are echoed back
    assert_eq!(body["context"]["form"]["nickname"], "Ghost");

    assert!(app.state.db.list_friends().unwrap().is_empty());
    assert_eq!(app.media_files("friend_photos"), 0);
}

#[tokio::test]
async fn test_add_friend_rejects_non_image_photo() {
    let app = TestApp::new().await;

    let form = MultipartForm::new()
        .text("name", "Rohan")
        .text("nickname", "Ro")
        .text("memory_text", "Bunked every lab")
        .file("photo", "notes.txt", "text/plain", b"not a picture");
    let response = app.post_multipart("/add/", form).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = rendered(response).await;
    assert!(body["context"]["errors"]["photo"].is_string());
    assert!(app.state.db.list_friends().unwrap().is_empty());
}

// =============================================================================
// Detail + slam book
// =============================================================================

#[tokio::test]
async fn test_missing_friend_is_404_with_not_found_page() {
    let app = TestApp::new().await;

    for uri in ["/friend/999/", "/friend/abc/", "/friend/999/edit/"] {
        let response = app.get(uri).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
        let body = rendered(response).await;
        assert_eq!(body["page"], "not_found", "{uri}");
        assert_eq!(body["context"]["page_title"], "Page Not Found");
    }

    let response = app.post_empty("/delete/999/").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(rendered(response).await["page"], "not_found");
}

#[tokio::test]
async fn test_slam_message_is_pinned_newest_first() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Alex");
    app.state
        .db
        .insert_slam_message(
            friend.id,
            &SlamFields {
                sender_name: "Sam".into(),
                message: "First!".into(),
            },
        )
        .unwrap();

    let uri = format!("/friend/{}/", friend.id);
    let response = app
        .post_urlencoded(&uri, "sender_name=Alex&message=Miss+you%21")
        .await;
    let location = location(&response);
    assert!(location.starts_with(&format!("/friend/{}/?msg=", friend.id)));
    assert_eq!(decoded_msg(&location), "Scrap pinned! 📌");

    let body = rendered(app.get(&uri).await).await;
    assert_eq!(body["page"], "friend_detail");
    let messages = body["context"]["slam_messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["sender_name"], "Alex");
    assert_eq!(messages[0]["message"], "Miss you!");
    assert_eq!(messages[1]["sender_name"], "Sam");
}

#[tokio::test]
async fn test_blank_slam_message_rerenders_detail() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Alex");

    let response = app
        .post_urlencoded(&format!("/friend/{}/", friend.id), "sender_name=Alex&message=")
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = rendered(response).await;
    assert_eq!(body["page"], "friend_detail");
    assert!(body["context"]["errors"]["message"].is_string());
    assert_eq!(body["context"]["slam_form"]["sender_name"], "Alex");
    assert!(app.state.db.list_slam_messages(friend.id).unwrap().is_empty());
}

#[tokio::test]
async fn test_slam_message_for_missing_friend_is_404() {
    let app = TestApp::new().await;
    let response = app
        .post_urlencoded("/friend/42/", "sender_name=Alex&message=Hello")
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Edit
// =============================================================================

#[tokio::test]
async fn test_edit_friend_keeps_photo_when_none_uploaded() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Neha");

    let form = MultipartForm::new()
        .text("name", "Neha")
        .text("nickname", "Nehu")
        .text("memory_text", "Topper who still shared notes")
        .text("future_goal", "Astronaut");
    let response = app
        .post_multipart(&format!("/friend/{}/edit/", friend.id), form)
        .await;
    let location = location(&response);
    assert_eq!(decoded_msg(&location), "Friend updated! ✨");

    let updated = app.state.db.get_friend(friend.id).unwrap().unwrap();
    assert_eq!(updated.nickname, "Nehu");
    assert_eq!(updated.future_goal.as_deref(), Some("Astronaut"));
    assert_eq!(updated.photo, friend.photo);
}

#[tokio::test]
async fn test_edit_friend_replaces_photo_file() {
    let app = TestApp::new().await;
    let uri = "/add/";
    let form = MultipartForm::new()
        .text("name", "Dev")
        .text("nickname", "D")
        .text("memory_text", "Guitar on the terrace")
        .file("photo", "dev.png", "image/png", JPEG);
    app.post_multipart(uri, form).await;
    let friend = app.state.db.list_friends().unwrap().remove(0);
    assert!(app.media_exists(&friend.photo));

    let form = MultipartForm::new()
        .text("name", "Dev")
        .text("nickname", "D")
        .text("memory_text", "Guitar on the terrace")
        .file("photo", "dev-new.jpg", "image/jpeg", JPEG);
    let response = app
        .post_multipart(&format!("/friend/{}/edit/", friend.id), form)
        .await;
    assert_eq!(response.status(), StatusCode::FOUND);

    let updated = app.state.db.get_friend(friend.id).unwrap().unwrap();
    assert_ne!(updated.photo, friend.photo);
    assert!(app.media_exists(&updated.photo));
    assert!(!app.media_exists(&friend.photo));
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_friend_cascades_awards_and_messages() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Ishaan");
    let other = app.seed_friend("Tara");
    app.state.db.insert_award("Most Likely to Be Late", friend.id, Some("⏰")).unwrap();
    app.state.db.insert_award("Best Dancer", other.id, None).unwrap();
    app.state
        .db
        .insert_slam_message(
            friend.id,
            &SlamFields {
                sender_name: "Tara".into(),
                message: "See you at the reunion".into(),
            },
        )
        .unwrap();

    let response = app.post_empty(&format!("/delete/{}/", friend.id)).await;
    let location = location(&response);
    assert_eq!(decoded_msg(&location), "Friend removed");
    assert!(location.starts_with("/?msg="));

    assert!(app.state.db.get_friend(friend.id).unwrap().is_none());
    assert!(app.state.db.list_slam_messages(friend.id).unwrap().is_empty());
    let awards = app.state.db.list_awards().unwrap();
    assert_eq!(awards.len(), 1);
    assert_eq!(awards[0].winner_name, "Tara");
}

#[tokio::test]
async fn test_get_on_delete_url_does_not_delete() {
    let app = TestApp::new().await;
    let friend = app.seed_friend("Ishaan");

    let response = app.get(&format!("/delete/{}/", friend.id)).await;
    assert_eq!(location(&response), "/");
    assert!(app.state.db.get_friend(friend.id).unwrap().is_some());
}

#[tokio::test]
async fn test_delete_missing_friend_is_404() {
    let app = TestApp::new().await;
    assert_eq!(app.post_empty("/delete/77/").await.status(), StatusCode::NOT_FOUND);
}
