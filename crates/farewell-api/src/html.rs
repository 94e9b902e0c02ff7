//! Built-in HTML renderer backed by askama templates in `templates/`.
//!
//! Handlers speak JSON contexts; this module lifts each context into a
//! small typed view and lets the template escape everything it prints.

use askama::Template;
use serde_json::Value;

use crate::render::{Page, Renderer};

#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, page: Page, ctx: &Value) -> anyhow::Result<String> {
        let title = text(ctx, "page_title");
        let flash = text(ctx, "msg");
        let html = match page {
            Page::Index | Page::SquadCards => FriendsPage {
                title,
                flash,
                friends: items(ctx, "friends")
                    .iter()
                    .map(|f| FriendCard::from_value(f, page == Page::SquadCards))
                    .collect(),
            }
            .render()?,
            Page::FriendForm => form_page(title, flash, ctx, FRIEND_FIELDS)?,
            Page::EventForm => form_page(title, flash, ctx, EVENT_FIELDS)?,
            Page::UploadPhotos => form_page(title, flash, ctx, UPLOAD_FIELDS)?,
            Page::MilestoneForm => form_page(title, flash, ctx, MILESTONE_FIELDS)?,
            Page::FriendDetail => friend_detail(title, flash, ctx)?,
            Page::Gallery => GalleryPage {
                title,
                flash,
                events: items(ctx, "events").iter().map(EventCard::from_value).collect(),
            }
            .render()?,
            Page::EventDetail => {
                let event = field(ctx, "event");
                EventDetailPage {
                    title,
                    flash,
                    id: id(event),
                    date: text(event, "date"),
                    description: text(event, "description"),
                    photos: items(ctx, "photos").iter().map(PhotoView::from_value).collect(),
                }
                .render()?
            }
            Page::Timeline => TimelinePage {
                title,
                flash,
                milestones: milestones(ctx),
            }
            .render()?,
            Page::DeleteMilestone => {
                let milestone = field(ctx, "milestone");
                DeleteMilestonePage {
                    title,
                    flash,
                    id: id(milestone),
                    milestone_title: text(milestone, "title"),
                }
                .render()?
            }
            Page::Awards => AwardsPage {
                title,
                flash,
                awards: awards(ctx),
            }
            .render()?,
            Page::Newspaper => newspaper(title, flash, ctx)?,
            Page::NotFound => message(title, flash, "This page slipped out of the scrapbook.", true)?,
            Page::BadRequest => message(title, flash, "That submission could not be read.", false)?,
            Page::ServerError => message(title, flash, "Something went wrong on our side.", false)?,
        };
        Ok(html)
    }
}

// -- Context access --

fn field<'a>(v: &'a Value, key: &str) -> &'a Value {
    v.get(key).unwrap_or(&Value::Null)
}

fn text(v: &Value, key: &str) -> String {
    v.get(key).and_then(Value::as_str).unwrap_or_default().to_string()
}

fn items<'a>(v: &'a Value, key: &str) -> &'a [Value] {
    v.get(key).and_then(Value::as_array).map(Vec::as_slice).unwrap_or_default()
}

fn id(v: &Value) -> String {
    v.get("id").and_then(Value::as_i64).map(|id| id.to_string()).unwrap_or_default()
}

fn media_url(v: &Value, key: &str) -> String {
    match v.get(key).and_then(Value::as_str) {
        Some(path) if !path.is_empty() => format!("/media/{path}"),
        _ => String::new(),
    }
}

// -- Forms --

#[derive(Clone, Copy)]
enum Widget {
    Text,
    Date,
    TextArea,
    File,
    Files,
}

type FieldSpec = (&'static str, &'static str, Widget);

const FRIEND_FIELDS: &[FieldSpec] = &[
    ("name", "Full Name", Widget::Text),
    ("nickname", "Nickname", Widget::Text),
    ("photo", "Photo", Widget::File),
    ("memory_text", "Memory", Widget::TextArea),
    ("future_goal", "Future Goal", Widget::Text),
    ("special_power", "⚡ Special Power", Widget::Text),
    ("weakness", "💀 Weakness", Widget::Text),
    ("signature_dialogue", "💬 Signature Dialogue", Widget::Text),
];

const EVENT_FIELDS: &[FieldSpec] = &[
    ("title", "Event Name", Widget::Text),
    ("date", "Date", Widget::Date),
    ("cover_image", "Cover Image", Widget::File),
    ("description", "Description", Widget::TextArea),
];

const MILESTONE_FIELDS: &[FieldSpec] = &[
    ("title", "Title", Widget::Text),
    ("date", "Date", Widget::Date),
    ("description", "What happened", Widget::TextArea),
    ("image", "Image (optional)", Widget::File),
];

const UPLOAD_FIELDS: &[FieldSpec] = &[
    ("images", "Photos", Widget::Files),
    ("caption", "Caption (optional)", Widget::Text),
];

const SLAM_FIELDS: &[FieldSpec] = &[
    ("sender_name", "Your Name", Widget::Text),
    ("message", "Your Message", Widget::TextArea),
];

struct FieldView {
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
    textarea: bool,
    file: bool,
    multiple: bool,
    value: String,
    error: String,
}

struct FormView {
    action: String,
    multipart: bool,
    button: String,
    fields: Vec<FieldView>,
}

impl FormView {
    /// `form` holds submitted values, `errors` the per-field messages.
    fn new(action: String, button: String, form: &Value, errors: &Value, specs: &[FieldSpec]) -> Self {
        let fields: Vec<FieldView> = specs
            .iter()
            .map(|&(name, label, widget)| FieldView {
                name,
                label,
                input_type: match widget {
                    Widget::Date => "date",
                    Widget::File | Widget::Files => "file",
                    Widget::Text | Widget::TextArea => "text",
                },
                textarea: matches!(widget, Widget::TextArea),
                file: matches!(widget, Widget::File | Widget::Files),
                multiple: matches!(widget, Widget::Files),
                value: text(form, name),
                error: text(errors, name),
            })
            .collect();
        let multipart = fields.iter().any(|f| f.file);
        let button = if button.is_empty() { "Save".to_string() } else { button };
        Self {
            action,
            multipart,
            button,
            fields,
        }
    }
}

#[derive(Template)]
#[template(path = "form_page.html")]
struct FormPage {
    title: String,
    flash: String,
    form: FormView,
}

fn form_page(title: String, flash: String, ctx: &Value, specs: &[FieldSpec]) -> askama::Result<String> {
    let form = FormView::new(
        text(ctx, "action"),
        text(ctx, "button_text"),
        field(ctx, "form"),
        field(ctx, "errors"),
        specs,
    );
    FormPage { title, flash, form }.render()
}

// -- Friends --

struct Stat {
    label: &'static str,
    value: String,
}

struct FriendCard {
    id: String,
    name: String,
    nickname: String,
    photo_url: String,
    stats: Vec<Stat>,
}

impl FriendCard {
    fn from_value(f: &Value, with_stats: bool) -> Self {
        let stats = if with_stats {
            [("special_power", "Power"), ("weakness", "Weakness"), ("signature_dialogue", "Says")]
                .into_iter()
                .filter_map(|(key, label)| {
                    f.get(key).and_then(Value::as_str).map(|v| Stat {
                        label,
                        value: v.to_string(),
                    })
                })
                .collect()
        } else {
            Vec::new()
        };
        Self {
            id: id(f),
            name: text(f, "name"),
            nickname: text(f, "nickname"),
            photo_url: media_url(f, "photo"),
            stats,
        }
    }
}

#[derive(Template)]
#[template(path = "friends.html")]
struct FriendsPage {
    title: String,
    flash: String,
    friends: Vec<FriendCard>,
}

struct SlamLine {
    sender: String,
    text: String,
}

#[derive(Template)]
#[template(path = "friend_detail.html")]
struct FriendDetailPage {
    title: String,
    flash: String,
    id: String,
    photo_url: String,
    nickname: String,
    memory: String,
    goal: String,
    awards: Vec<String>,
    messages: Vec<SlamLine>,
    form: FormView,
}

fn friend_detail(title: String, flash: String, ctx: &Value) -> askama::Result<String> {
    let friend = field(ctx, "friend");
    let friend_id = id(friend);
    let form = FormView::new(
        format!("/friend/{friend_id}/"),
        "Pin it".to_string(),
        field(ctx, "slam_form"),
        field(ctx, "errors"),
        SLAM_FIELDS,
    );
    FriendDetailPage {
        title,
        flash,
        photo_url: media_url(friend, "photo"),
        nickname: text(friend, "nickname"),
        memory: text(friend, "memory_text"),
        goal: text(friend, "future_goal"),
        awards: items(ctx, "awards").iter().map(|a| text(a, "title")).collect(),
        messages: items(ctx, "slam_messages")
            .iter()
            .map(|m| SlamLine {
                sender: text(m, "sender_name"),
                text: text(m, "message"),
            })
            .collect(),
        id: friend_id,
        form,
    }
    .render()
}

// -- Gallery --

struct EventCard {
    id: String,
    title: String,
    date: String,
    cover_url: String,
    photo_count: i64,
}

impl EventCard {
    fn from_value(e: &Value) -> Self {
        Self {
            id: id(e),
            title: text(e, "title"),
            date: text(e, "date"),
            cover_url: media_url(e, "cover_image"),
            photo_count: e.get("photo_count").and_then(Value::as_i64).unwrap_or(0),
        }
    }
}

#[derive(Template)]
#[template(path = "gallery.html")]
struct GalleryPage {
    title: String,
    flash: String,
    events: Vec<EventCard>,
}

struct PhotoView {
    id: String,
    url: String,
    caption: String,
}

impl PhotoView {
    fn from_value(p: &Value) -> Self {
        Self {
            id: id(p),
            url: media_url(p, "image"),
            caption: text(p, "caption"),
        }
    }
}

#[derive(Template)]
#[template(path = "event_detail.html")]
struct EventDetailPage {
    title: String,
    flash: String,
    id: String,
    date: String,
    description: String,
    photos: Vec<PhotoView>,
}

// -- Timeline + awards --

struct MilestoneView {
    id: String,
    date: String,
    title: String,
    description: String,
    image_url: String,
}

fn milestones(ctx: &Value) -> Vec<MilestoneView> {
    items(ctx, "milestones")
        .iter()
        .map(|m| MilestoneView {
            id: id(m),
            date: text(m, "date"),
            title: text(m, "title"),
            description: text(m, "description"),
            image_url: media_url(m, "image"),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "timeline.html")]
struct TimelinePage {
    title: String,
    flash: String,
    milestones: Vec<MilestoneView>,
}

#[derive(Template)]
#[template(path = "delete_milestone.html")]
struct DeleteMilestonePage {
    title: String,
    flash: String,
    id: String,
    milestone_title: String,
}

struct AwardView {
    title: String,
    winner_id: String,
    winner_name: String,
}

fn awards(ctx: &Value) -> Vec<AwardView> {
    items(ctx, "awards")
        .iter()
        .map(|a| AwardView {
            title: text(a, "title"),
            winner_id: a.get("winner_id").and_then(Value::as_i64).map(|i| i.to_string()).unwrap_or_default(),
            winner_name: text(a, "winner_name"),
        })
        .collect()
}

#[derive(Template)]
#[template(path = "awards.html")]
struct AwardsPage {
    title: String,
    flash: String,
    awards: Vec<AwardView>,
}

// -- Gazette --

#[derive(Default)]
struct Counts {
    friends: i64,
    events: i64,
    photos: i64,
    milestones: i64,
    awards: i64,
    messages: i64,
}

struct GazetteLine {
    sender: String,
    friend: String,
    text: String,
}

#[derive(Template)]
#[template(path = "newspaper.html")]
struct NewspaperPage {
    title: String,
    flash: String,
    counts: Counts,
    latest_event: String,
    messages: Vec<GazetteLine>,
    awards: Vec<AwardView>,
    milestones: Vec<MilestoneView>,
}

fn newspaper(title: String, flash: String, ctx: &Value) -> askama::Result<String> {
    let c = field(ctx, "counts");
    let n = |k: &str| c.get(k).and_then(Value::as_i64).unwrap_or(0);
    NewspaperPage {
        title,
        flash,
        counts: Counts {
            friends: n("friends"),
            events: n("events"),
            photos: n("photos"),
            milestones: n("milestones"),
            awards: n("awards"),
            messages: n("messages"),
        },
        latest_event: text(field(ctx, "latest_event"), "title"),
        messages: items(ctx, "recent_messages")
            .iter()
            .map(|m| GazetteLine {
                sender: text(m, "sender_name"),
                friend: text(m, "friend_name"),
                text: text(m, "message"),
            })
            .collect(),
        awards: awards(ctx),
        milestones: milestones(ctx),
    }
    .render()
}

// -- Status pages --

#[derive(Template)]
#[template(path = "message.html")]
struct MessagePage {
    title: String,
    flash: String,
    text: &'static str,
    home_link: bool,
}

fn message(title: String, flash: String, text: &'static str, home_link: bool) -> askama::Result<String> {
    MessagePage {
        title,
        flash,
        text,
        home_link,
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn escapes_user_content() {
        let ctx = json!({
            "page_title": "Squad",
            "friends": [{ "id": 1, "name": "<script>alert(1)</script>", "nickname": "\"Q\"", "photo": "friend_photos/a.jpg" }],
        });
        let html = HtmlRenderer.render(Page::Index, &ctx).unwrap();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(html.contains("/friend/1/"));
    }

    #[test]
    fn form_shows_values_and_errors() {
        let ctx = json!({
            "page_title": "Add a Friend",
            "action": "/add/",
            "button_text": "Add Friend",
            "form": { "name": "", "nickname": "Vanisher" },
            "errors": { "name": "This field is required." },
        });
        let html = HtmlRenderer.render(Page::FriendForm, &ctx).unwrap();
        assert!(html.contains("value=\"Vanisher\""));
        assert!(html.contains("This field is required."));
        assert!(html.contains("enctype=\"multipart/form-data\""));
        assert!(html.contains("Add Friend</button>"));
    }

    #[test]
    fn slam_form_is_not_multipart() {
        let ctx = json!({
            "page_title": "Alex",
            "friend": { "id": 7, "name": "Alex", "nickname": "Al", "photo": "friend_photos/al.jpg", "memory_text": "Hi" },
            "slam_messages": [{ "sender_name": "Sam", "message": "Miss you!" }],
        });
        let html = HtmlRenderer.render(Page::FriendDetail, &ctx).unwrap();
        assert!(html.contains("<strong>Sam</strong>: Miss you!"));
        assert!(html.contains("Pin it</button>"));
        assert!(!html.contains("multipart/form-data"));
    }

    #[test]
    fn flash_message_is_shown() {
        let html = HtmlRenderer
            .render(Page::Timeline, &json!({ "page_title": "Journey", "msg": "Memory saved!" }))
            .unwrap();
        assert!(html.contains("<div class=\"flash\">Memory saved!</div>"));
    }

    #[test]
    fn status_pages_render_without_context() {
        let html = HtmlRenderer
            .render(Page::NotFound, &json!({ "page_title": Page::NotFound.default_title() }))
            .unwrap();
        assert!(html.contains("Page Not Found"));
        assert!(html.contains("Back home"));
    }
}
