//! Row mapping between SQLite and the farewell-types records.
//! Column lists and `from_row` functions live together so a SELECT and its
//! mapper can't drift apart.

use farewell_types::models::{
    AwardWithWinner, Event, EventPhoto, EventSummary, Friend, FunAward, SlamMessage,
    SlamWithFriend, TimelineEvent,
};
use rusqlite::Row;

pub(crate) const FRIEND_COLUMNS: &str = "id, name, nickname, photo, memory_text, future_goal, \
     special_power, weakness, signature_dialogue, created_at, updated_at";

pub(crate) const EVENT_COLUMNS: &str = "id, title, cover_image, date, description";

pub(crate) const PHOTO_COLUMNS: &str = "id, event_id, image, caption, uploaded_at";

pub(crate) const MILESTONE_COLUMNS: &str = "id, title, date, description, image";

pub(crate) const AWARD_COLUMNS: &str = "id, title, winner_id, icon_or_image";

pub(crate) const SLAM_COLUMNS: &str = "id, friend_id, sender_name, message, created_at";

/// Media paths left behind by a delete. Files are removed by the caller
/// once the transaction has committed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RemovedMedia {
    pub paths: Vec<String>,
}

impl RemovedMedia {
    pub(crate) fn push(&mut self, path: Option<String>) {
        if let Some(p) = path.filter(|p| !p.is_empty()) {
            self.paths.push(p);
        }
    }
}

pub(crate) fn friend_from_row(row: &Row) -> rusqlite::Result<Friend> {
    Ok(Friend {
        id: row.get(0)?,
        name: row.get(1)?,
        nickname: row.get(2)?,
        photo: row.get(3)?,
        memory_text: row.get(4)?,
        future_goal: row.get(5)?,
        special_power: row.get(6)?,
        weakness: row.get(7)?,
        signature_dialogue: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

pub(crate) fn event_from_row(row: &Row) -> rusqlite::Result<Event> {
    Ok(Event {
        id: row.get(0)?,
        title: row.get(1)?,
        cover_image: row.get(2)?,
        date: row.get(3)?,
        description: row.get(4)?,
    })
}

/// Expects the event columns followed by the photo count.
pub(crate) fn event_summary_from_row(row: &Row) -> rusqlite::Result<EventSummary> {
    Ok(EventSummary {
        event: event_from_row(row)?,
        photo_count: row.get(5)?,
    })
}

pub(crate) fn photo_from_row(row: &Row) -> rusqlite::Result<EventPhoto> {
    Ok(EventPhoto {
        id: row.get(0)?,
        event_id: row.get(1)?,
        image: row.get(2)?,
        caption: row.get(3)?,
        uploaded_at: row.get(4)?,
    })
}

pub(crate) fn milestone_from_row(row: &Row) -> rusqlite::Result<TimelineEvent> {
    Ok(TimelineEvent {
        id: row.get(0)?,
        title: row.get(1)?,
        date: row.get(2)?,
        description: row.get(3)?,
        image: row.get(4)?,
    })
}

pub(crate) fn award_from_row(row: &Row) -> rusqlite::Result<FunAward> {
    Ok(FunAward {
        id: row.get(0)?,
        title: row.get(1)?,
        winner_id: row.get(2)?,
        icon_or_image: row.get(3)?,
    })
}

/// Expects the award columns followed by winner name and nickname.
pub(crate) fn award_with_winner_from_row(row: &Row) -> rusqlite::Result<AwardWithWinner> {
    Ok(AwardWithWinner {
        award: award_from_row(row)?,
        winner_name: row.get(4)?,
        winner_nickname: row.get(5)?,
    })
}

pub(crate) fn slam_from_row(row: &Row) -> rusqlite::Result<SlamMessage> {
    Ok(SlamMessage {
        id: row.get(0)?,
        friend_id: row.get(1)?,
        sender_name: row.get(2)?,
        message: row.get(3)?,
        created_at: row.get(4)?,
    })
}

/// Expects the slam columns followed by the friend's name.
pub(crate) fn slam_with_friend_from_row(row: &Row) -> rusqlite::Result<SlamWithFriend> {
    Ok(SlamWithFriend {
        message: slam_from_row(row)?,
        friend_name: row.get(5)?,
    })
}
