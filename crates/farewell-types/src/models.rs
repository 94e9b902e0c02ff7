use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A classmate's profile card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Friend {
    pub id: i64,
    pub name: String,
    pub nickname: String,
    /// Media path of the profile photo, relative to the media root.
    pub photo: String,
    pub memory_text: String,
    pub future_goal: Option<String>,
    pub special_power: Option<String>,
    pub weakness: Option<String>,
    pub signature_dialogue: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable text fields of a friend. The photo travels separately.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FriendFields {
    pub name: String,
    pub nickname: String,
    pub memory_text: String,
    pub future_goal: Option<String>,
    pub special_power: Option<String>,
    pub weakness: Option<String>,
    pub signature_dialogue: Option<String>,
}

/// A photo album (Pongal, tour, farewell day...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub title: String,
    pub cover_image: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFields {
    pub title: String,
    pub date: NaiveDate,
    pub description: Option<String>,
}

/// Gallery listing entry: the album plus how many photos it holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    pub photo_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventPhoto {
    pub id: i64,
    pub event_id: i64,
    pub image: String,
    pub caption: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

/// A milestone on the college journey timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub id: i64,
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneFields {
    pub title: String,
    pub date: NaiveDate,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunAward {
    pub id: i64,
    pub title: String,
    pub winner_id: i64,
    pub icon_or_image: Option<String>,
}

/// Award row joined with its winner for the awards wall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwardWithWinner {
    #[serde(flatten)]
    pub award: FunAward,
    pub winner_name: String,
    pub winner_nickname: String,
}

/// A slam book entry left on a friend's page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlamMessage {
    pub id: i64,
    pub friend_id: i64,
    pub sender_name: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlamFields {
    pub sender_name: String,
    pub message: String,
}

/// Slam message with the recipient's name, used by the gazette page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlamWithFriend {
    #[serde(flatten)]
    pub message: SlamMessage,
    pub friend_name: String,
}

/// Row totals shown on the gazette page.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteCounts {
    pub friends: i64,
    pub events: i64,
    pub photos: i64,
    pub milestones: i64,
    pub awards: i64,
    pub messages: i64,
}
