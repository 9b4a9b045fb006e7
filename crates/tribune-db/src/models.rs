/// Database row types — these map directly to SQLite rows.
/// Distinct from the tribune-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub image: Option<String>,
    pub created_at: String,
}

pub struct OpinionRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
    pub author_id: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct NotificationRow {
    pub id: String,
    pub kind: String,
    pub message: String,
    pub user_id: String,
    pub opinion_id: Option<String>,
    pub read: bool,
    pub created_at: String,
}

pub struct NewsRow {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
    pub author_id: String,
    pub created_at: String,
    pub updated_at: String,
}

pub struct PollRow {
    pub id: String,
    pub question: String,
    pub created_at: String,
}

pub struct PollOptionRow {
    pub id: String,
    pub poll_id: String,
    pub text: String,
    pub votes: i64,
}

pub struct CommentRow {
    pub id: String,
    pub news_id: String,
    pub user_id: String,
    pub author_name: String,
    pub content: String,
    pub created_at: String,
}
