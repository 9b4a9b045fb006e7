use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            email       TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'user',
            image       TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS opinions (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            content         TEXT NOT NULL,
            category        TEXT,
            sub_category    TEXT,
            image_url       TEXT,
            author_id       TEXT NOT NULL REFERENCES users(id),
            status          TEXT NOT NULL DEFAULT 'PENDING',
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_opinions_author
            ON opinions(author_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_opinions_status
            ON opinions(status, created_at);

        CREATE TABLE IF NOT EXISTS notifications (
            id          TEXT PRIMARY KEY,
            type        TEXT NOT NULL,
            message     TEXT NOT NULL,
            user_id     TEXT NOT NULL REFERENCES users(id),
            opinion_id  TEXT REFERENCES opinions(id),
            read        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_notifications_user
            ON notifications(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_notifications_type
            ON notifications(type, read);

        CREATE TABLE IF NOT EXISTS news (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            content         TEXT NOT NULL,
            category        TEXT,
            sub_category    TEXT,
            image_url       TEXT,
            author_id       TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_news_category
            ON news(category, created_at);

        CREATE TABLE IF NOT EXISTS polls (
            id          TEXT PRIMARY KEY,
            question    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS poll_options (
            id          TEXT PRIMARY KEY,
            poll_id     TEXT NOT NULL REFERENCES polls(id),
            text        TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS poll_votes (
            id          TEXT PRIMARY KEY,
            poll_id     TEXT NOT NULL REFERENCES polls(id),
            option_id   TEXT NOT NULL REFERENCES poll_options(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(poll_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            news_id     TEXT NOT NULL REFERENCES news(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_news
            ON comments(news_id, created_at);

        CREATE TABLE IF NOT EXISTS likes (
            id          TEXT PRIMARY KEY,
            news_id     TEXT NOT NULL REFERENCES news(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(news_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_news
            ON likes(news_id);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
