use crate::Database;
use crate::models::{
    AWARD_COLUMNS, EVENT_COLUMNS, FRIEND_COLUMNS, MILESTONE_COLUMNS, PHOTO_COLUMNS, RemovedMedia,
    SLAM_COLUMNS, award_from_row, award_with_winner_from_row, event_from_row,
    event_summary_from_row, friend_from_row, milestone_from_row, photo_from_row, slam_from_row,
    slam_with_friend_from_row,
};
use anyhow::Result;
use chrono::Utc;
use farewell_types::models::{
    AwardWithWinner, Event, EventFields, EventPhoto, EventSummary, Friend, FriendFields, FunAward,
    MilestoneFields, SiteCounts, SlamFields, SlamMessage, SlamWithFriend, TimelineEvent,
};
use rusqlite::{Connection, params};
use tracing::info;

impl Database {
    // -- Friends --

    pub fn insert_friend(&self, fields: &FriendFields, photo: &str) -> Result<Friend> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO friends (name, nickname, photo, memory_text, future_goal,
                     special_power, weakness, signature_dialogue, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)",
                params![
                    fields.name,
                    fields.nickname,
                    photo,
                    fields.memory_text,
                    fields.future_goal,
                    fields.special_power,
                    fields.weakness,
                    fields.signature_dialogue,
                    now,
                ],
            )?;

            Ok(Friend {
                id: conn.last_insert_rowid(),
                name: fields.name.clone(),
                nickname: fields.nickname.clone(),
                photo: photo.to_string(),
                memory_text: fields.memory_text.clone(),
                future_goal: fields.future_goal.clone(),
                special_power: fields.special_power.clone(),
                weakness: fields.weakness.clone(),
                signature_dialogue: fields.signature_dialogue.clone(),
                created_at: now,
                updated_at: now,
            })
        })
    }

    pub fn get_friend(&self, id: i64) -> Result<Option<Friend>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {FRIEND_COLUMNS} FROM friends WHERE id = ?1"),
                [id],
                friend_from_row,
            )
            .optional()
        })
    }

    /// Friends in alphabetical order.
    pub fn list_friends(&self) -> Result<Vec<Friend>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {FRIEND_COLUMNS} FROM friends ORDER BY name COLLATE NOCASE, id"
            ))?;
            let rows = stmt
                .query_map([], friend_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Overwrite the editable fields. `photo: None` keeps the stored photo.
    /// Returns false when the friend does not exist.
    pub fn update_friend(&self, id: i64, fields: &FriendFields, photo: Option<&str>) -> Result<bool> {
        let now = Utc::now();
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE friends SET name = ?1, nickname = ?2, memory_text = ?3, future_goal = ?4,
                     special_power = ?5, weakness = ?6, signature_dialogue = ?7,
                     photo = COALESCE(?8, photo), updated_at = ?9
                 WHERE id = ?10",
                params![
                    fields.name,
                    fields.nickname,
                    fields.memory_text,
                    fields.future_goal,
                    fields.special_power,
                    fields.weakness,
                    fields.signature_dialogue,
                    photo,
                    now,
                    id,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    /// Delete a friend with their awards and slam messages in one transaction.
    /// Returns `None` if the friend does not exist.
    pub fn delete_friend(&self, id: i64) -> Result<Option<RemovedMedia>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let photo: Option<String> = tx
                .query_row("SELECT photo FROM friends WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            let Some(photo) = photo else {
                return Ok(None);
            };

            let mut removed = RemovedMedia::default();
            removed.push(Some(photo));
            for icon in column_values(&tx, "SELECT icon_or_image FROM fun_awards WHERE winner_id = ?1", id)? {
                removed.push(icon);
            }

            let messages = tx.execute("DELETE FROM slam_messages WHERE friend_id = ?1", [id])?;
            let awards = tx.execute("DELETE FROM fun_awards WHERE winner_id = ?1", [id])?;
            tx.execute("DELETE FROM friends WHERE id = ?1", [id])?;
            tx.commit()?;

            info!(
                "Deleted friend {} with {} awards and {} slam messages",
                id, awards, messages
            );
            Ok(Some(removed))
        })
    }

    // -- Events --

    pub fn insert_event(&self, fields: &EventFields, cover_image: &str) -> Result<Event> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO events (title, cover_image, date, description) VALUES (?1, ?2, ?3, ?4)",
                params![fields.title, cover_image, fields.date, fields.description],
            )?;

            Ok(Event {
                id: conn.last_insert_rowid(),
                title: fields.title.clone(),
                cover_image: cover_image.to_string(),
                date: fields.date,
                description: fields.description.clone(),
            })
        })
    }

    pub fn get_event(&self, id: i64) -> Result<Option<Event>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1"),
                [id],
                event_from_row,
            )
            .optional()
        })
    }

    pub fn update_event(&self, id: i64, fields: &EventFields, cover_image: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE events SET title = ?1, date = ?2, description = ?3,
                     cover_image = COALESCE(?4, cover_image)
                 WHERE id = ?5",
                params![fields.title, fields.date, fields.description, cover_image, id],
            )?;
            Ok(changed > 0)
        })
    }

    /// Events newest first, each with the number of photos in its album.
    pub fn list_events_with_counts(&self) -> Result<Vec<EventSummary>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT e.id, e.title, e.cover_image, e.date, e.description, COUNT(p.id)
                 FROM events e
                 LEFT JOIN event_photos p ON p.event_id = e.id
                 GROUP BY e.id
                 ORDER BY e.date DESC, e.id DESC",
            )?;
            let rows = stmt
                .query_map([], event_summary_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Delete an album and all of its photos in one transaction.
    pub fn delete_event(&self, id: i64) -> Result<Option<RemovedMedia>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let cover: Option<String> = tx
                .query_row("SELECT cover_image FROM events WHERE id = ?1", [id], |row| row.get(0))
                .optional()?;
            let Some(cover) = cover else {
                return Ok(None);
            };

            let mut removed = RemovedMedia::default();
            removed.push(Some(cover));
            for image in column_values(&tx, "SELECT image FROM event_photos WHERE event_id = ?1", id)? {
                removed.push(image);
            }

            let photos = tx.execute("DELETE FROM event_photos WHERE event_id = ?1", [id])?;
            tx.execute("DELETE FROM events WHERE id = ?1", [id])?;
            tx.commit()?;

            info!("Deleted event {} with {} photos", id, photos);
            Ok(Some(removed))
        })
    }

    // -- Event photos --

    /// Insert a whole upload batch atomically: either every photo row is
    /// created or none is.
    pub fn insert_event_photos(
        &self,
        event_id: i64,
        images: &[String],
        caption: Option<&str>,
    ) -> Result<Vec<EventPhoto>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut photos = Vec::with_capacity(images.len());
            {
                let mut stmt = tx.prepare(
                    "INSERT INTO event_photos (event_id, image, caption, uploaded_at)
                     VALUES (?1, ?2, ?3, ?4)",
                )?;
                for image in images {
                    let uploaded_at = Utc::now();
                    stmt.execute(params![event_id, image, caption, uploaded_at])?;
                    photos.push(EventPhoto {
                        id: tx.last_insert_rowid(),
                        event_id,
                        image: image.clone(),
                        caption: caption.map(str::to_owned),
                        uploaded_at,
                    });
                }
            }
            tx.commit()?;
            Ok(photos)
        })
    }

    pub fn get_event_photo(&self, id: i64) -> Result<Option<EventPhoto>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {PHOTO_COLUMNS} FROM event_photos WHERE id = ?1"),
                [id],
                photo_from_row,
            )
            .optional()
        })
    }

    /// Photos of one album, most recently uploaded first.
    pub fn list_event_photos(&self, event_id: i64) -> Result<Vec<EventPhoto>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PHOTO_COLUMNS} FROM event_photos WHERE event_id = ?1
                 ORDER BY uploaded_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([event_id], photo_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns the removed row so the caller knows the parent album and file.
    pub fn delete_event_photo(&self, id: i64) -> Result<Option<EventPhoto>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let photo = tx
                .query_row(
                    &format!("SELECT {PHOTO_COLUMNS} FROM event_photos WHERE id = ?1"),
                    [id],
                    photo_from_row,
                )
                .optional()?;
            if photo.is_some() {
                tx.execute("DELETE FROM event_photos WHERE id = ?1", [id])?;
            }
            tx.commit()?;
            Ok(photo)
        })
    }

    // -- Timeline --

    pub fn insert_milestone(&self, fields: &MilestoneFields, image: Option<&str>) -> Result<TimelineEvent> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO timeline_events (title, date, description, image) VALUES (?1, ?2, ?3, ?4)",
                params![fields.title, fields.date, fields.description, image],
            )?;

            Ok(TimelineEvent {
                id: conn.last_insert_rowid(),
                title: fields.title.clone(),
                date: fields.date,
                description: fields.description.clone(),
                image: image.map(str::to_owned),
            })
        })
    }

    pub fn get_milestone(&self, id: i64) -> Result<Option<TimelineEvent>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {MILESTONE_COLUMNS} FROM timeline_events WHERE id = ?1"),
                [id],
                milestone_from_row,
            )
            .optional()
        })
    }

    /// Milestones in the order they happened.
    pub fn list_milestones(&self) -> Result<Vec<TimelineEvent>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MILESTONE_COLUMNS} FROM timeline_events ORDER BY date ASC, id ASC"
            ))?;
            let rows = stmt
                .query_map([], milestone_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_milestone(&self, id: i64, fields: &MilestoneFields, image: Option<&str>) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE timeline_events SET title = ?1, date = ?2, description = ?3,
                     image = COALESCE(?4, image)
                 WHERE id = ?5",
                params![fields.title, fields.date, fields.description, image, id],
            )?;
            Ok(changed > 0)
        })
    }

    pub fn delete_milestone(&self, id: i64) -> Result<Option<TimelineEvent>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let milestone = tx
                .query_row(
                    &format!("SELECT {MILESTONE_COLUMNS} FROM timeline_events WHERE id = ?1"),
                    [id],
                    milestone_from_row,
                )
                .optional()?;
            if milestone.is_some() {
                tx.execute("DELETE FROM timeline_events WHERE id = ?1", [id])?;
            }
            tx.commit()?;
            Ok(milestone)
        })
    }

    // -- Fun awards --

    pub fn insert_award(&self, title: &str, winner_id: i64, icon_or_image: Option<&str>) -> Result<FunAward> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO fun_awards (title, winner_id, icon_or_image) VALUES (?1, ?2, ?3)",
                params![title, winner_id, icon_or_image],
            )?;

            Ok(FunAward {
                id: conn.last_insert_rowid(),
                title: title.to_string(),
                winner_id,
                icon_or_image: icon_or_image.map(str::to_owned),
            })
        })
    }

    /// Every award joined with its winner (single query, no N+1).
    pub fn list_awards(&self) -> Result<Vec<AwardWithWinner>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT a.id, a.title, a.winner_id, a.icon_or_image, f.name, f.nickname
                 FROM fun_awards a
                 JOIN friends f ON f.id = a.winner_id
                 ORDER BY a.id",
            )?;
            let rows = stmt
                .query_map([], award_with_winner_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn list_awards_for_friend(&self, friend_id: i64) -> Result<Vec<FunAward>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {AWARD_COLUMNS} FROM fun_awards WHERE winner_id = ?1 ORDER BY id"
            ))?;
            let rows = stmt
                .query_map([friend_id], award_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_award(&self, id: i64) -> Result<Option<FunAward>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let award = tx
                .query_row(
                    &format!("SELECT {AWARD_COLUMNS} FROM fun_awards WHERE id = ?1"),
                    [id],
                    award_from_row,
                )
                .optional()?;
            if award.is_some() {
                tx.execute("DELETE FROM fun_awards WHERE id = ?1", [id])?;
            }
            tx.commit()?;
            Ok(award)
        })
    }

    // -- Slam book --

    pub fn insert_slam_message(&self, friend_id: i64, fields: &SlamFields) -> Result<SlamMessage> {
        let now = Utc::now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO slam_messages (friend_id, sender_name, message, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![friend_id, fields.sender_name, fields.message, now],
            )?;

            Ok(SlamMessage {
                id: conn.last_insert_rowid(),
                friend_id,
                sender_name: fields.sender_name.clone(),
                message: fields.message.clone(),
                created_at: now,
            })
        })
    }

    /// Messages left for one friend, newest first.
    pub fn list_slam_messages(&self, friend_id: i64) -> Result<Vec<SlamMessage>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SLAM_COLUMNS} FROM slam_messages WHERE friend_id = ?1
                 ORDER BY created_at DESC, id DESC"
            ))?;
            let rows = stmt
                .query_map([friend_id], slam_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Latest messages across all friends, with the recipient's name.
    pub fn recent_slam_messages(&self, limit: u32) -> Result<Vec<SlamWithFriend>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT m.id, m.friend_id, m.sender_name, m.message, m.created_at, f.name
                 FROM slam_messages m
                 JOIN friends f ON f.id = m.friend_id
                 ORDER BY m.created_at DESC, m.id DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], slam_with_friend_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Aggregates --

    pub fn site_counts(&self) -> Result<SiteCounts> {
        self.with_conn(|conn| {
            let counts = conn.query_row(
                "SELECT
                    (SELECT COUNT(*) FROM friends),
                    (SELECT COUNT(*) FROM events),
                    (SELECT COUNT(*) FROM event_photos),
                    (SELECT COUNT(*) FROM timeline_events),
                    (SELECT COUNT(*) FROM fun_awards),
                    (SELECT COUNT(*) FROM slam_messages)",
                [],
                |row| {
                    Ok(SiteCounts {
                        friends: row.get(0)?,
                        events: row.get(1)?,
                        photos: row.get(2)?,
                        milestones: row.get(3)?,
                        awards: row.get(4)?,
                        messages: row.get(5)?,
                    })
                },
            )?;
            Ok(counts)
        })
    }
}

/// First column of every row matching `sql` (one `?1` id parameter).
fn column_values(conn: &Connection, sql: &str, id: i64) -> Result<Vec<Option<String>>> {
    let mut stmt = conn.prepare(sql)?;
    let values = stmt
        .query_map([id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(values)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
