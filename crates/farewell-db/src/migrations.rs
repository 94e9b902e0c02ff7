use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 =
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |r| r.get(0))?;

    if version < 1 {
        info!("Running migration v1 (initial schema)");
        conn.execute_batch(
            "
            CREATE TABLE friends (
                id                  INTEGER PRIMARY KEY AUTOINCREMENT,
                name                TEXT NOT NULL,
                nickname            TEXT NOT NULL,
                photo               TEXT NOT NULL,
                memory_text         TEXT NOT NULL,
                future_goal         TEXT,
                special_power       TEXT,
                weakness            TEXT,
                signature_dialogue  TEXT,
                created_at          TEXT NOT NULL,
                updated_at          TEXT NOT NULL
            );

            CREATE INDEX idx_friends_name ON friends(name COLLATE NOCASE);

            CREATE TABLE events (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                title        TEXT NOT NULL,
                cover_image  TEXT NOT NULL,
                date         TEXT NOT NULL,
                description  TEXT
            );

            CREATE INDEX idx_events_date ON events(date);

            CREATE TABLE event_photos (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                event_id     INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
                image        TEXT NOT NULL,
                caption      TEXT,
                uploaded_at  TEXT NOT NULL
            );

            CREATE INDEX idx_event_photos_event ON event_photos(event_id, uploaded_at);

            CREATE TABLE timeline_events (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                title        TEXT NOT NULL,
                date         TEXT NOT NULL,
                description  TEXT NOT NULL,
                image        TEXT
            );

            CREATE INDEX idx_timeline_events_date ON timeline_events(date);

            CREATE TABLE fun_awards (
                id             INTEGER PRIMARY KEY AUTOINCREMENT,
                title          TEXT NOT NULL,
                winner_id      INTEGER NOT NULL REFERENCES friends(id) ON DELETE CASCADE,
                icon_or_image  TEXT
            );

            CREATE INDEX idx_fun_awards_winner ON fun_awards(winner_id);

            CREATE TABLE slam_messages (
                id           INTEGER PRIMARY KEY AUTOINCREMENT,
                friend_id    INTEGER NOT NULL REFERENCES friends(id) ON DELETE CASCADE,
                sender_name  TEXT NOT NULL,
                message      TEXT NOT NULL,
                created_at   TEXT NOT NULL
            );

            CREATE INDEX idx_slam_messages_friend ON slam_messages(friend_id, created_at);

            INSERT INTO schema_version (version) VALUES (1);
            ",
        )?;
    }

    info!("Database migrations complete (schema v{})", SCHEMA_VERSION);
    Ok(())
}
