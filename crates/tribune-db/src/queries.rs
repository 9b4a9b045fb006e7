use crate::models::{
    CommentRow, NewsRow, NotificationRow, OpinionRow, PollOptionRow, PollRow, UserRow,
};
use crate::Database;
use anyhow::Result;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        name: &str,
        email: &str,
        password_hash: &str,
        role: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, name, email, password, role) VALUES (?1, ?2, ?3, ?4, ?5)",
                (id, name, email, password_hash, role),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<UserRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {USER_COLS} FROM users ORDER BY created_at DESC LIMIT ?1 OFFSET ?2"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![limit, offset], user_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_users(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
            Ok(count)
        })
    }

    pub fn update_user_role(&self, id: &str, role: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET role = ?2 WHERE id = ?1",
                rusqlite::params![id, role],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", id)
        })
    }

    pub fn update_user_profile(
        &self,
        id: &str,
        name: &str,
        image: Option<&str>,
    ) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE users SET name = ?2, image = ?3 WHERE id = ?1",
                rusqlite::params![id, name, image],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_user(conn, "id", id)
        })
    }

    // -- Opinions --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_opinion(
        &self,
        id: &str,
        title: &str,
        content: &str,
        category: Option<&str>,
        sub_category: Option<&str>,
        image_url: Option<&str>,
        author_id: &str,
    ) -> Result<OpinionRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO opinions (id, title, content, category, sub_category, image_url, author_id, status)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'PENDING')",
                rusqlite::params![id, title, content, category, sub_category, image_url, author_id],
            )?;
            query_opinion(conn, id)?.ok_or_else(|| anyhow::anyhow!("opinion vanished after insert"))
        })
    }

    pub fn get_opinion(&self, id: &str) -> Result<Option<OpinionRow>> {
        self.with_conn(|conn| query_opinion(conn, id))
    }

    /// Unconditional status overwrite — re-deciding an already-decided
    /// opinion is allowed and simply replaces the status.
    pub fn update_opinion_status(&self, id: &str, status: &str) -> Result<Option<OpinionRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE opinions SET status = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, status],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_opinion(conn, id)
        })
    }

    pub fn list_opinions(
        &self,
        status: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<OpinionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {OPINION_COLS} FROM opinions {} ORDER BY created_at DESC LIMIT ?1 OFFSET ?2",
                if status.is_some() { "WHERE status = ?3" } else { "" },
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = match status {
                Some(s) => stmt
                    .query_map(rusqlite::params![limit, offset, s], opinion_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?,
                None => stmt
                    .query_map(rusqlite::params![limit, offset], opinion_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?,
            };
            Ok(rows)
        })
    }

    pub fn count_opinions(&self, status: Option<&str>) -> Result<i64> {
        self.with_conn(|conn| {
            let count = match status {
                Some(s) => conn.query_row(
                    "SELECT COUNT(*) FROM opinions WHERE status = ?1",
                    [s],
                    |row| row.get(0),
                )?,
                None => conn.query_row("SELECT COUNT(*) FROM opinions", [], |row| row.get(0))?,
            };
            Ok(count)
        })
    }

    pub fn list_opinions_by_author(
        &self,
        author_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<OpinionRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {OPINION_COLS} FROM opinions WHERE author_id = ?1
                 ORDER BY created_at DESC LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![author_id, limit, offset], opinion_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_opinions_by_author(&self, author_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM opinions WHERE author_id = ?1",
                [author_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Returns true if a row was deleted.
    pub fn delete_opinion(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM opinions WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Notifications --

    pub fn insert_notification(
        &self,
        id: &str,
        kind: &str,
        message: &str,
        user_id: &str,
        opinion_id: Option<&str>,
    ) -> Result<NotificationRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO notifications (id, type, message, user_id, opinion_id, read)
                 VALUES (?1, ?2, ?3, ?4, ?5, 0)",
                rusqlite::params![id, kind, message, user_id, opinion_id],
            )?;
            query_notification(conn, id)?
                .ok_or_else(|| anyhow::anyhow!("notification vanished after insert"))
        })
    }

    pub fn get_notification(&self, id: &str) -> Result<Option<NotificationRow>> {
        self.with_conn(|conn| query_notification(conn, id))
    }

    pub fn mark_notification_read(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE notifications SET read = 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn mark_all_read_for_user(&self, user_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE notifications SET read = 1 WHERE user_id = ?1 AND read = 0",
                [user_id],
            )?;
            Ok(())
        })
    }

    /// Admin triage: marks every unread notification system-wide.
    pub fn mark_all_read(&self) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE notifications SET read = 1 WHERE read = 0", [])?;
            Ok(())
        })
    }

    /// A user's own inbox: decisions and system messages addressed to them.
    pub fn list_user_notifications(&self, user_id: &str, limit: u32) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, message, user_id, opinion_id, read, created_at
                 FROM notifications
                 WHERE user_id = ?1
                   AND type IN ('OPINION_APPROVED', 'OPINION_REJECTED', 'SYSTEM_MESSAGE')
                 ORDER BY created_at DESC LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![user_id, limit], notification_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// The shared admin inbox is a type filter, not a userId filter —
    /// submissions and system messages regardless of recipient.
    pub fn list_admin_notifications(&self, limit: u32) -> Result<Vec<NotificationRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, type, message, user_id, opinion_id, read, created_at
                 FROM notifications
                 WHERE type IN ('OPINION_SUBMITTED', 'SYSTEM_MESSAGE')
                 ORDER BY created_at DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit], notification_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_unread_for_user(&self, user_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE user_id = ?1 AND read = 0",
                [user_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn count_unread_submitted(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM notifications WHERE type = 'OPINION_SUBMITTED' AND read = 0",
                [],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    // -- News --

    #[allow(clippy::too_many_arguments)]
    pub fn insert_news(
        &self,
        id: &str,
        title: &str,
        content: &str,
        category: Option<&str>,
        sub_category: Option<&str>,
        image_url: Option<&str>,
        author_id: &str,
    ) -> Result<NewsRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO news (id, title, content, category, sub_category, image_url, author_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, title, content, category, sub_category, image_url, author_id],
            )?;
            query_news(conn, id)?.ok_or_else(|| anyhow::anyhow!("news vanished after insert"))
        })
    }

    pub fn get_news(&self, id: &str) -> Result<Option<NewsRow>> {
        self.with_conn(|conn| query_news(conn, id))
    }

    #[allow(clippy::too_many_arguments)]
    pub fn update_news(
        &self,
        id: &str,
        title: &str,
        content: &str,
        category: Option<&str>,
        sub_category: Option<&str>,
        image_url: Option<&str>,
    ) -> Result<Option<NewsRow>> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE news SET title = ?2, content = ?3, category = ?4, sub_category = ?5,
                        image_url = ?6, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, title, content, category, sub_category, image_url],
            )?;
            if changed == 0 {
                return Ok(None);
            }
            query_news(conn, id)
        })
    }

    pub fn delete_news(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM likes WHERE news_id = ?1", [id])?;
            conn.execute("DELETE FROM comments WHERE news_id = ?1", [id])?;
            let changed = conn.execute("DELETE FROM news WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    pub fn list_news(
        &self,
        search: Option<&str>,
        category: Option<&str>,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<NewsRow>> {
        self.with_conn(|conn| {
            let (clause, pattern) = news_filter(search, category);
            let sql = format!(
                "SELECT {NEWS_COLS} FROM news {clause} ORDER BY created_at DESC LIMIT :limit OFFSET :offset"
            );
            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<(&str, &dyn rusqlite::types::ToSql)> =
                vec![(":limit", &limit), (":offset", &offset)];
            if let Some(p) = pattern.as_ref() {
                params.push((":search", p));
            }
            if let Some(c) = category.as_ref() {
                params.push((":category", c));
            }
            let rows = stmt
                .query_map(params.as_slice(), news_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_news(&self, search: Option<&str>, category: Option<&str>) -> Result<i64> {
        self.with_conn(|conn| {
            let (clause, pattern) = news_filter(search, category);
            let sql = format!("SELECT COUNT(*) FROM news {clause}");
            let mut stmt = conn.prepare(&sql)?;
            let mut params: Vec<(&str, &dyn rusqlite::types::ToSql)> = vec![];
            if let Some(p) = pattern.as_ref() {
                params.push((":search", p));
            }
            if let Some(c) = category.as_ref() {
                params.push((":category", c));
            }
            let count = stmt.query_row(params.as_slice(), |row| row.get(0))?;
            Ok(count)
        })
    }

    // -- Polls --

    pub fn insert_poll(&self, id: &str, question: &str, options: &[(String, String)]) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO polls (id, question) VALUES (?1, ?2)",
                (id, question),
            )?;
            for (option_id, text) in options {
                conn.execute(
                    "INSERT INTO poll_options (id, poll_id, text) VALUES (?1, ?2, ?3)",
                    (option_id, id, text),
                )?;
            }
            Ok(())
        })
    }

    pub fn get_poll(&self, id: &str) -> Result<Option<PollRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, question, created_at FROM polls WHERE id = ?1",
                    [id],
                    |row| {
                        Ok(PollRow {
                            id: row.get(0)?,
                            question: row.get(1)?,
                            created_at: row.get(2)?,
                        })
                    },
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn list_polls(&self) -> Result<Vec<PollRow>> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, question, created_at FROM polls ORDER BY created_at DESC")?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(PollRow {
                        id: row.get(0)?,
                        question: row.get(1)?,
                        created_at: row.get(2)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Options with their vote tallies, in insertion order.
    pub fn get_poll_options(&self, poll_id: &str) -> Result<Vec<PollOptionRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT o.id, o.poll_id, o.text, COUNT(v.id)
                 FROM poll_options o
                 LEFT JOIN poll_votes v ON v.option_id = o.id
                 WHERE o.poll_id = ?1
                 GROUP BY o.id
                 ORDER BY o.rowid",
            )?;
            let rows = stmt
                .query_map([poll_id], |row| {
                    Ok(PollOptionRow {
                        id: row.get(0)?,
                        poll_id: row.get(1)?,
                        text: row.get(2)?,
                        votes: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// One vote per user per poll. Returns false if the user already voted.
    pub fn cast_vote(
        &self,
        id: &str,
        poll_id: &str,
        option_id: &str,
        user_id: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "INSERT OR IGNORE INTO poll_votes (id, poll_id, option_id, user_id)
                 VALUES (?1, ?2, ?3, ?4)",
                (id, poll_id, option_id, user_id),
            )?;
            Ok(changed > 0)
        })
    }

    // -- Comments --

    pub fn insert_comment(
        &self,
        id: &str,
        news_id: &str,
        user_id: &str,
        content: &str,
    ) -> Result<CommentRow> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, news_id, user_id, content) VALUES (?1, ?2, ?3, ?4)",
                (id, news_id, user_id, content),
            )?;
            query_comment(conn, id)?.ok_or_else(|| anyhow::anyhow!("comment vanished after insert"))
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| query_comment(conn, id))
    }

    pub fn list_comments(&self, news_id: &str, limit: u32) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            // JOIN users to fetch the author name in a single query
            let mut stmt = conn.prepare(
                "SELECT c.id, c.news_id, c.user_id, u.name, c.content, c.created_at
                 FROM comments c
                 LEFT JOIN users u ON c.user_id = u.id
                 WHERE c.news_id = ?1
                 ORDER BY c.created_at DESC
                 LIMIT ?2",
            )?;
            let rows = stmt
                .query_map(rusqlite::params![news_id, limit], comment_from_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn delete_comment(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let changed = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(changed > 0)
        })
    }

    // -- Likes --

    /// Toggle a like: removes if present, inserts if not.
    /// Returns true when the like was added.
    pub fn toggle_like(&self, id: &str, news_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row(
                    "SELECT id FROM likes WHERE news_id = ?1 AND user_id = ?2",
                    (news_id, user_id),
                    |row| row.get(0),
                )
                .optional()?;

            if let Some(existing_id) = existing {
                conn.execute("DELETE FROM likes WHERE id = ?1", [&existing_id])?;
                Ok(false)
            } else {
                conn.execute(
                    "INSERT INTO likes (id, news_id, user_id) VALUES (?1, ?2, ?3)",
                    (id, news_id, user_id),
                )?;
                Ok(true)
            }
        })
    }

    pub fn count_likes(&self, news_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE news_id = ?1",
                [news_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}

const OPINION_COLS: &str =
    "id, title, content, category, sub_category, image_url, author_id, status, created_at, updated_at";

const NEWS_COLS: &str =
    "id, title, content, category, sub_category, image_url, author_id, created_at, updated_at";

fn news_filter(search: Option<&str>, category: Option<&str>) -> (String, Option<String>) {
    let mut parts = Vec::new();
    let pattern = search.map(|s| format!("%{}%", s));
    if pattern.is_some() {
        parts.push("(title LIKE :search OR content LIKE :search)");
    }
    if category.is_some() {
        parts.push("category = :category");
    }
    let clause = if parts.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", parts.join(" AND "))
    };
    (clause, pattern)
}

const USER_COLS: &str = "id, name, email, password, role, image, created_at";

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // column is a fixed identifier chosen by the caller, never user input
    let sql = format!("SELECT {USER_COLS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        role: row.get(4)?,
        image: row.get(5)?,
        created_at: row.get(6)?,
    })
}

fn query_opinion(conn: &Connection, id: &str) -> Result<Option<OpinionRow>> {
    let sql = format!("SELECT {OPINION_COLS} FROM opinions WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], opinion_from_row).optional()?;
    Ok(row)
}

fn opinion_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<OpinionRow> {
    Ok(OpinionRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        sub_category: row.get(4)?,
        image_url: row.get(5)?,
        author_id: row.get(6)?,
        status: row.get(7)?,
        created_at: row.get(8)?,
        updated_at: row.get(9)?,
    })
}

fn query_notification(conn: &Connection, id: &str) -> Result<Option<NotificationRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, type, message, user_id, opinion_id, read, created_at
         FROM notifications WHERE id = ?1",
    )?;
    let row = stmt.query_row([id], notification_from_row).optional()?;
    Ok(row)
}

fn notification_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NotificationRow> {
    Ok(NotificationRow {
        id: row.get(0)?,
        kind: row.get(1)?,
        message: row.get(2)?,
        user_id: row.get(3)?,
        opinion_id: row.get(4)?,
        read: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

fn query_news(conn: &Connection, id: &str) -> Result<Option<NewsRow>> {
    let sql = format!("SELECT {NEWS_COLS} FROM news WHERE id = ?1");
    let mut stmt = conn.prepare(&sql)?;
    let row = stmt.query_row([id], news_from_row).optional()?;
    Ok(row)
}

fn news_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<NewsRow> {
    Ok(NewsRow {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        category: row.get(3)?,
        sub_category: row.get(4)?,
        image_url: row.get(5)?,
        author_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

fn query_comment(conn: &Connection, id: &str) -> Result<Option<CommentRow>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.news_id, c.user_id, u.name, c.content, c.created_at
         FROM comments c
         LEFT JOIN users u ON c.user_id = u.id
         WHERE c.id = ?1",
    )?;
    let row = stmt.query_row([id], comment_from_row).optional()?;
    Ok(row)
}

fn comment_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        news_id: row.get(1)?,
        user_id: row.get(2)?,
        author_name: row.get::<_, Option<String>>(3)?.unwrap_or_else(|| "unknown".to_string()),
        content: row.get(4)?,
        created_at: row.get(5)?,
    })
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

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db_with_user(id: &str) -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user(id, "Test User", &format!("{id}@example.com"), "hash", "user")
            .unwrap();
        db
    }

    #[test]
    fn unread_counts_are_scoped() {
        let db = db_with_user("u1");
        db.create_user("u2", "Other", "u2@example.com", "hash", "user").unwrap();

        db.insert_notification("n1", "OPINION_SUBMITTED", "m", "u1", None).unwrap();
        db.insert_notification("n2", "OPINION_APPROVED", "m", "u1", None).unwrap();
        db.insert_notification("n3", "OPINION_APPROVED", "m", "u2", None).unwrap();

        assert_eq!(db.count_unread_for_user("u1").unwrap(), 2);
        assert_eq!(db.count_unread_for_user("u2").unwrap(), 1);
        // Admin inbox only counts submissions
        assert_eq!(db.count_unread_submitted().unwrap(), 1);
    }

    #[test]
    fn mark_read_is_idempotent() {
        let db = db_with_user("u1");
        db.insert_notification("n1", "OPINION_APPROVED", "m", "u1", None).unwrap();

        db.mark_notification_read("n1").unwrap();
        db.mark_notification_read("n1").unwrap();

        let row = db.get_notification("n1").unwrap().unwrap();
        assert!(row.read);
        assert_eq!(db.count_unread_for_user("u1").unwrap(), 0);
    }

    #[test]
    fn admin_inbox_filters_by_type_not_recipient() {
        let db = db_with_user("u1");
        db.insert_notification("n1", "OPINION_SUBMITTED", "m", "u1", None).unwrap();
        db.insert_notification("n2", "OPINION_APPROVED", "m", "u1", None).unwrap();
        db.insert_notification("n3", "SYSTEM_MESSAGE", "m", "u1", None).unwrap();

        let admin = db.list_admin_notifications(20).unwrap();
        assert_eq!(admin.len(), 2);
        assert!(admin.iter().all(|n| n.kind != "OPINION_APPROVED"));

        let user = db.list_user_notifications("u1", 20).unwrap();
        assert_eq!(user.len(), 2);
        assert!(user.iter().all(|n| n.kind != "OPINION_SUBMITTED"));
    }

    #[test]
    fn role_and_profile_updates_persist() {
        let db = db_with_user("u1");

        let updated = db.update_user_role("u1", "editor").unwrap().unwrap();
        assert_eq!(updated.role, "editor");

        let updated = db.update_user_profile("u1", "Renamed", Some("avatar.png")).unwrap().unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.image.as_deref(), Some("avatar.png"));
        // Role survives a profile update
        assert_eq!(updated.role, "editor");

        assert!(db.update_user_role("missing", "admin").unwrap().is_none());
        assert!(db.update_user_profile("missing", "X", None).unwrap().is_none());

        db.create_user("u2", "Second", "u2@example.com", "hash", "user").unwrap();
        assert_eq!(db.count_users().unwrap(), 2);
        assert_eq!(db.list_users(10, 0).unwrap().len(), 2);
        assert_eq!(db.list_users(1, 1).unwrap().len(), 1);
    }

    #[test]
    fn opinion_status_overwrite() {
        let db = db_with_user("u1");
        let opinion = db
            .insert_opinion("o1", "Title", "Content", None, None, None, "u1")
            .unwrap();
        assert_eq!(opinion.status, "PENDING");

        let updated = db.update_opinion_status("o1", "APPROVED").unwrap().unwrap();
        assert_eq!(updated.status, "APPROVED");

        // Re-deciding overwrites without complaint
        let updated = db.update_opinion_status("o1", "REJECTED").unwrap().unwrap();
        assert_eq!(updated.status, "REJECTED");

        assert!(db.update_opinion_status("missing", "APPROVED").unwrap().is_none());
    }

    #[test]
    fn vote_once_per_poll() {
        let db = db_with_user("u1");
        db.insert_poll(
            "p1",
            "Best section?",
            &[("a".to_string(), "Sports".to_string()), ("b".to_string(), "Politics".to_string())],
        )
        .unwrap();

        assert!(db.cast_vote("v1", "p1", "a", "u1").unwrap());
        // Second vote by the same user is rejected, even for another option
        assert!(!db.cast_vote("v2", "p1", "b", "u1").unwrap());

        let options = db.get_poll_options("p1").unwrap();
        assert_eq!(options[0].votes, 1);
        assert_eq!(options[1].votes, 0);
    }

    #[test]
    fn like_toggles() {
        let db = db_with_user("u1");
        db.insert_news("news1", "T", "C", None, None, None, "u1").unwrap();

        assert!(db.toggle_like("l1", "news1", "u1").unwrap());
        assert_eq!(db.count_likes("news1").unwrap(), 1);
        assert!(!db.toggle_like("l2", "news1", "u1").unwrap());
        assert_eq!(db.count_likes("news1").unwrap(), 0);
    }

    #[test]
    fn news_search_and_category_filter() {
        let db = db_with_user("u1");
        db.insert_news("n1", "Budget passes", "parliament", Some("politics"), None, None, "u1")
            .unwrap();
        db.insert_news("n2", "Cup final", "football", Some("sports"), None, None, "u1").unwrap();

        let hits = db.list_news(Some("Budget"), None, 10, 0).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "n1");

        let sports = db.list_news(None, Some("sports"), 10, 0).unwrap();
        assert_eq!(sports.len(), 1);
        assert_eq!(db.count_news(None, Some("sports")).unwrap(), 1);

        let both = db.list_news(Some("final"), Some("sports"), 10, 0).unwrap();
        assert_eq!(both.len(), 1);
    }
}
