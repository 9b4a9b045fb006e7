//! Row-to-model conversion. SQLite stores ids, enums and timestamps as text;
//! corrupt values are logged and defaulted rather than failing a whole list
//! response.

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use tribune_db::models::{
    CommentRow, NewsRow, NotificationRow, OpinionRow, PollOptionRow, PollRow, UserRow,
};
use tribune_types::models::{
    Comment, NewsArticle, Notification, NotificationType, Opinion, OpinionStatus, Poll, PollOption,
    Role, UserAccount,
};

pub(crate) fn parse_id(value: &str, context: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt id '{}' in {}: {}", value, context, e);
        Uuid::default()
    })
}

pub(crate) fn parse_timestamp(value: &str, context: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}' in {}: {}", value, context, e);
            DateTime::default()
        })
}

pub fn user_from_row(row: UserRow) -> UserAccount {
    let role = row.role.parse::<Role>().unwrap_or_else(|e| {
        warn!("Corrupt role on user '{}': {}", row.id, e);
        Role::User
    });
    UserAccount {
        created_at: parse_timestamp(&row.created_at, "user"),
        id: parse_id(&row.id, "user"),
        name: row.name,
        email: row.email,
        role,
        image: row.image,
    }
}

pub fn opinion_from_row(row: OpinionRow) -> Opinion {
    let status = row.status.parse::<OpinionStatus>().unwrap_or_else(|e| {
        warn!("Corrupt status on opinion '{}': {}", row.id, e);
        OpinionStatus::Pending
    });
    Opinion {
        author_id: parse_id(&row.author_id, "opinion author"),
        created_at: parse_timestamp(&row.created_at, "opinion"),
        updated_at: parse_timestamp(&row.updated_at, "opinion"),
        id: parse_id(&row.id, "opinion"),
        title: row.title,
        content: row.content,
        category: row.category,
        sub_category: row.sub_category,
        image_url: row.image_url,
        status,
    }
}

pub fn notification_from_row(row: NotificationRow) -> Notification {
    let kind = row.kind.parse::<NotificationType>().unwrap_or_else(|e| {
        warn!("Corrupt type on notification '{}': {}", row.id, e);
        NotificationType::SystemMessage
    });
    Notification {
        user_id: parse_id(&row.user_id, "notification recipient"),
        opinion_id: row.opinion_id.as_deref().map(|id| parse_id(id, "notification opinion")),
        created_at: parse_timestamp(&row.created_at, "notification"),
        id: parse_id(&row.id, "notification"),
        kind,
        message: row.message,
        read: row.read,
    }
}

pub fn news_from_row(row: NewsRow) -> NewsArticle {
    NewsArticle {
        author_id: parse_id(&row.author_id, "news author"),
        created_at: parse_timestamp(&row.created_at, "news"),
        updated_at: parse_timestamp(&row.updated_at, "news"),
        id: parse_id(&row.id, "news"),
        title: row.title,
        content: row.content,
        category: row.category,
        sub_category: row.sub_category,
        image_url: row.image_url,
    }
}

pub fn poll_from_row(row: PollRow) -> Poll {
    Poll {
        created_at: parse_timestamp(&row.created_at, "poll"),
        id: parse_id(&row.id, "poll"),
        question: row.question,
    }
}

pub fn poll_option_from_row(row: PollOptionRow) -> PollOption {
    PollOption {
        id: parse_id(&row.id, "poll option"),
        poll_id: parse_id(&row.poll_id, "poll option"),
        text: row.text,
        votes: row.votes,
    }
}

pub fn comment_from_row(row: CommentRow) -> Comment {
    Comment {
        news_id: parse_id(&row.news_id, "comment news"),
        user_id: parse_id(&row.user_id, "comment author"),
        created_at: parse_timestamp(&row.created_at, "comment"),
        id: parse_id(&row.id, "comment"),
        author_name: row.author_name,
        content: row.content,
    }
}
