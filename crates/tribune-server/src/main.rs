use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    extract::{Query, State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use tribune_api::error::ApiError;
use tribune_api::middleware::require_auth;
use tribune_api::notify::NotificationEngine;
use tribune_api::state::{AppState, AppStateInner};
use tribune_api::{auth, comments, news, notifications, opinions, polls, principal, users};
use tribune_gateway::connection;
use tribune_gateway::rooms::Gateway;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tribune=debug,tower_http=info".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("TRIBUNE_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("TRIBUNE_DB_PATH").unwrap_or_else(|_| "tribune.db".into());
    let host = std::env::var("TRIBUNE_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("TRIBUNE_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = Arc::new(tribune_db::Database::open(&PathBuf::from(&db_path))?);

    // Shared state
    let gateway = Gateway::new();
    let notifier = NotificationEngine::new(db.clone(), gateway.clone());
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        gateway,
        notifier,
    });

    let app = router(state.clone())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Tribune server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/news", get(news::list_news))
        .route("/news/{id}", get(news::get_news))
        .route("/news/{id}/comments", get(comments::list_comments))
        .route("/polls", get(polls::list_polls))
        .route("/polls/{id}", get(polls::get_poll))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/opinions", post(opinions::submit_opinion))
        .route("/opinions", get(opinions::list_opinions))
        .route("/opinions/mine", get(opinions::my_opinions))
        .route("/opinions/{id}", get(opinions::get_opinion))
        .route("/opinions/{id}", delete(opinions::delete_opinion))
        .route("/opinions/{id}/status", put(opinions::decide_opinion))
        .route("/notifications/user", get(notifications::list_user_notifications))
        .route("/notifications/admin", get(notifications::list_admin_notifications))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/mark-as-read", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_one_read))
        .route("/news", post(news::create_news))
        .route("/news/{id}", put(news::update_news))
        .route("/news/{id}", delete(news::delete_news))
        .route("/news/{id}/comments", post(comments::add_comment))
        .route("/news/{news_id}/comments/{comment_id}", delete(comments::delete_comment))
        .route("/news/{id}/like", post(comments::toggle_like))
        .route("/polls", post(polls::create_poll))
        .route("/polls/{id}/vote", post(polls::vote))
        .route("/users", get(users::list_users))
        .route("/users/{id}/role", put(users::update_role))
        .route("/profile", put(users::update_profile))
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(ws_route)
}

#[derive(Deserialize)]
struct GatewayQuery {
    token: Option<String>,
}

/// Credential is resolved BEFORE the upgrade completes, so a socket that
/// reaches the gateway is already authenticated and room membership is
/// fixed for the lifetime of the connection.
async fn ws_upgrade(
    State(state): State<AppState>,
    Query(query): Query<GatewayQuery>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    let Some(token) = query.token else {
        return ApiError::Unauthenticated("Authentication required".into()).into_response();
    };

    match principal::resolve(&state.db, &state.jwt_secret, &token) {
        Ok(principal) => {
            let gateway = state.gateway.clone();
            ws.on_upgrade(move |socket| connection::serve(socket, gateway, principal))
        }
        Err(e) => ApiError::from(e).into_response(),
    }
}
