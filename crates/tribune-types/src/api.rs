use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    Comment, NewsArticle, Notification, Opinion, Poll, PollOption, Role, UserAccount,
};

// -- JWT Claims --

/// JWT claims shared between the HTTP middleware and the gateway handshake.
/// Canonical definition lives here to eliminate duplication. Only the stable
/// user id and the expiry are embedded — role and identity are re-read from
/// storage on every authenticated request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
    pub token: String,
}

// -- Users --

/// Role payload stays a raw string so an unknown value surfaces as a
/// validation error, mirroring the decision payload.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: UserAccount,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserAccount>,
    pub meta: PageMeta,
}

// -- Opinions --

#[derive(Debug, Deserialize)]
pub struct SubmitOpinionRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
}

/// Decision payload. `status` stays a raw string so an unknown value surfaces
/// as a validation error rather than a deserialization failure.
#[derive(Debug, Deserialize)]
pub struct DecideOpinionRequest {
    pub status: String,
    pub rejection_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OpinionResponse {
    pub opinion: Opinion,
}

#[derive(Debug, Serialize)]
pub struct OpinionListResponse {
    pub opinions: Vec<Opinion>,
    pub meta: PageMeta,
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<Notification>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

// -- News --

#[derive(Debug, Deserialize)]
pub struct CreateNewsRequest {
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateNewsRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub sub_category: Option<String>,
    pub image_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub article: NewsArticle,
}

#[derive(Debug, Serialize)]
pub struct NewsListResponse {
    pub articles: Vec<NewsArticle>,
    pub meta: PageMeta,
}

// -- Polls --

#[derive(Debug, Deserialize)]
pub struct CreatePollRequest {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoteRequest {
    pub option_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PollResponse {
    pub poll: Poll,
    pub options: Vec<PollOption>,
}

// -- Comments & likes --

#[derive(Debug, Deserialize)]
pub struct CreateCommentRequest {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub liked: bool,
    pub likes: i64,
}

// -- Paging --

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
    pub search: Option<String>,
    pub category: Option<String>,
    pub status: Option<String>,
}

impl PageQuery {
    /// Page size clamped to a sane window.
    pub fn limit_clamped(&self) -> u32 {
        self.limit.clamp(1, 100)
    }

    /// Zero-based row offset. Saturating: an absurd client-supplied `page`
    /// must not overflow.
    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.limit_clamped())
    }
}

fn default_page() -> u32 {
    1
}

fn default_limit() -> u32 {
    10
}

#[derive(Debug, Serialize)]
pub struct PageMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total: i64, page: u32, limit: u32) -> Self {
        let total_pages = if limit == 0 {
            0
        } else {
            (total + i64::from(limit) - 1) / i64::from(limit)
        };
        Self { total, page, limit, total_pages }
    }
}
