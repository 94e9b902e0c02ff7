//! Shared harness for the router tests: in-memory database, temp media
//! root, and a renderer that echoes the page context back as JSON.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode, header},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use farewell_api::media::MediaStore;
use farewell_api::render::{Page, Renderer};
use farewell_api::{AppState, AppStateInner, build_router};
use farewell_db::Database;
use farewell_types::models::{Event, EventFields, Friend, FriendFields};

pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10];

/// Serializes `{ page, context }` so tests can inspect exactly what a
/// handler handed to the presentation layer.
pub struct ContextRenderer;

impl Renderer for ContextRenderer {
    fn render(&self, page: Page, context: &Value) -> anyhow::Result<String> {
        Ok(serde_json::to_string(&json!({ "page": page.name(), "context": context }))?)
    }
}

pub struct TestApp {
    pub state: AppState,
    media_dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        let media_dir = tempfile::tempdir().expect("temp media dir");
        let db = Database::open_in_memory().expect("in-memory db");
        let media = MediaStore::new(media_dir.path().to_path_buf())
            .await
            .expect("media store");
        let state = AppStateInner::new(db, media, ContextRenderer);
        Self { state, media_dir }
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.expect("router is infallible")
    }

    pub async fn get(&self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap()).await
    }

    pub async fn post_empty(&self, uri: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_urlencoded(&self, uri: &str, body: &str) -> Response<Body> {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn post_multipart(&self, uri: &str, form: MultipartForm) -> Response<Body> {
        self.send(form.into_request(uri)).await
    }

    pub fn media_exists(&self, relative: &str) -> bool {
        self.media_dir.path().join(relative).exists()
    }

    pub fn media_files(&self, kind_dir: &str) -> usize {
        std::fs::read_dir(self.media_dir.path().join(kind_dir))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    // -- Seeding straight through the data layer --

    pub fn seed_friend(&self, name: &str) -> Friend {
        let fields = FriendFields {
            name: name.to_string(),
            nickname: format!("{name} the Great"),
            memory_text: "Shared the last samosa".to_string(),
            ..Default::default()
        };
        self.state
            .db
            .insert_friend(&fields, &format!("friend_photos/{}.jpg", name.to_lowercase()))
            .expect("seed friend")
    }

    pub fn seed_event(&self, title: &str, date: &str) -> Event {
        let fields = EventFields {
            title: title.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            description: None,
        };
        self.state
            .db
            .insert_event(&fields, "event_covers/seed.jpg")
            .expect("seed event")
    }
}

/// Hand-built `multipart/form-data` body.
pub struct MultipartForm {
    boundary: &'static str,
    body: Vec<u8>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self {
            boundary: "farewell-test-boundary",
            body: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                self.boundary, name, value
            )
            .as_bytes(),
        );
        self
    }

    pub fn file(mut self, name: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Self {
        self.body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                self.boundary, name, file_name, content_type
            )
            .as_bytes(),
        );
        self.body.extend_from_slice(bytes);
        self.body.extend_from_slice(b"\r\n");
        self
    }

    pub fn into_request(mut self, uri: &str) -> Request<Body> {
        self.body
            .extend_from_slice(format!("--{}--\r\n", self.boundary).as_bytes());
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", self.boundary),
            )
            .body(Body::from(self.body))
            .unwrap()
    }
}

/// Parse the echoed `{ page, context }` body.
pub async fn rendered(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse rendered JSON")
}

pub fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::FOUND, "expected a 302 redirect");
    response.headers()[header::LOCATION]
        .to_str()
        .expect("ascii location")
        .to_string()
}

/// The flash message carried by a redirect, decoded.
pub fn decoded_msg(location: &str) -> String {
    let (_, encoded) = location.split_once("?msg=").expect("redirect carries a message");
    urlencoding::decode(encoded).expect("valid utf-8").into_owned()
}
