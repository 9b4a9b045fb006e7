pub mod auth;
pub mod comments;
pub mod convert;
pub mod error;
pub mod middleware;
pub mod moderation;
pub mod news;
pub mod notifications;
pub mod notify;
pub mod opinions;
pub mod polls;
pub mod principal;
pub mod state;
pub mod users;
