use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The authenticated identity behind a request or a gateway connection.
/// Always re-derived from the user table — never trusted from the token alone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Roles allowed to create and edit news articles.
    pub fn can_publish(&self) -> bool {
        matches!(self.role, Role::Editor | Role::Moderator | Role::Admin)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Editor,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Editor => "editor",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "editor" => Ok(Role::Editor),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            _ => Err(ParseEnumError { value: s.to_string() }),
        }
    }
}

/// A user account as surfaced to the admin dashboard and the profile
/// endpoints. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A user-submitted editorial piece subject to moderation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opinion {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
    pub author_id: Uuid,
    pub status: OpinionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpinionStatus {
    Pending,
    Approved,
    Rejected,
}

impl OpinionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpinionStatus::Pending => "PENDING",
            OpinionStatus::Approved => "APPROVED",
            OpinionStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for OpinionStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(OpinionStatus::Pending),
            "APPROVED" => Ok(OpinionStatus::Approved),
            "REJECTED" => Ok(OpinionStatus::Rejected),
            _ => Err(ParseEnumError { value: s.to_string() }),
        }
    }
}

/// Durable record of an event relevant to a user or the admin group.
/// The persisted row is the source of truth; the realtime push is best-effort.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationType,
    pub message: String,
    pub user_id: Uuid,
    pub opinion_id: Option<Uuid>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    OpinionSubmitted,
    OpinionApproved,
    OpinionRejected,
    SystemMessage,
}

impl NotificationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationType::OpinionSubmitted => "OPINION_SUBMITTED",
            NotificationType::OpinionApproved => "OPINION_APPROVED",
            NotificationType::OpinionRejected => "OPINION_REJECTED",
            NotificationType::SystemMessage => "SYSTEM_MESSAGE",
        }
    }
}

impl FromStr for NotificationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OPINION_SUBMITTED" => Ok(NotificationType::OpinionSubmitted),
            "OPINION_APPROVED" => Ok(NotificationType::OpinionApproved),
            "OPINION_REJECTED" => Ok(NotificationType::OpinionRejected),
            "SYSTEM_MESSAGE" => Ok(NotificationType::SystemMessage),
            _ => Err(ParseEnumError { value: s.to_string() }),
        }
    }
}

/// A published news article.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: Uuid,
    pub question: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollOption {
    pub id: Uuid,
    pub poll_id: Uuid,
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub news_id: Uuid,
    pub user_id: Uuid,
    pub author_name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Error for parsing stored enum text back into its typed form.
#[derive(Debug, Clone)]
pub struct ParseEnumError {
    pub value: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognised enum value '{}'", self.value)
    }
}

impl std::error::Error for ParseEnumError {}
