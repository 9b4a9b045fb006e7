//! Account administration and self-service profile updates. Role is the
//! only privilege lever: registration always lands on `user`, so any
//! editor/moderator/admin promotion goes through here.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use tribune_types::api::{
    PageMeta, PageQuery, UpdateProfileRequest, UpdateRoleRequest, UserListResponse, UserResponse,
};
use tribune_types::models::{Principal, Role};

use crate::convert;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn list_users(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Extension(principal): Extension<Principal>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }

    let limit = query.limit_clamped();
    let rows = state.db.list_users(limit, query.offset())?;
    let total = state.db.count_users()?;

    Ok(Json(UserListResponse {
        users: rows.into_iter().map(convert::user_from_row).collect(),
        meta: PageMeta::new(total, query.page, limit),
    }))
}

pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateRoleRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    if !principal.is_admin() {
        return Err(ApiError::Forbidden);
    }
    let role = req
        .role
        .parse::<Role>()
        .map_err(|_| ApiError::Validation("Invalid role".into()))?;

    let row = state
        .db
        .update_user_role(&id.to_string(), role.as_str())?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(UserResponse { user: convert::user_from_row(row) }))
}

/// Self-service: name and avatar only. Role and email stay fixed.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse + std::fmt::Debug, ApiError> {
    let name = req.name.unwrap_or_else(|| principal.name.clone());
    if name.trim().is_empty() {
        return Err(ApiError::Validation("Name must not be empty".into()));
    }
    let image = req.image.or_else(|| principal.image.clone());

    let row = state
        .db
        .update_user_profile(&principal.id.to_string(), &name, image.as_deref())?
        .ok_or(ApiError::NotFound("User not found"))?;

    Ok(Json(UserResponse { user: convert::user_from_row(row) }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NotificationEngine;
    use crate::principal;
    use crate::state::AppStateInner;
    use std::sync::Arc;
    use tribune_db::Database;
    use tribune_gateway::rooms::Gateway;

    fn state_with_users(users: &[(Uuid, &str)]) -> AppState {
        let db = Arc::new(Database::open_in_memory().unwrap());
        for (id, role) in users {
            db.create_user(&id.to_string(), "Test", &format!("{id}@example.com"), "hash", role)
                .unwrap();
        }
        let gateway = Gateway::new();
        let notifier = NotificationEngine::new(db.clone(), gateway.clone());
        Arc::new(AppStateInner {
            db,
            jwt_secret: "test-secret".into(),
            gateway,
            notifier,
        })
    }

    fn principal_for(state: &AppState, id: Uuid) -> Principal {
        let token = crate::auth::create_token(&state.jwt_secret, id).unwrap();
        principal::resolve(&state.db, &state.jwt_secret, &token).unwrap()
    }

    #[tokio::test]
    async fn promotion_unlocks_publishing() {
        let admin = Uuid::new_v4();
        let writer = Uuid::new_v4();
        let state = state_with_users(&[(admin, "admin"), (writer, "user")]);

        assert!(!principal_for(&state, writer).can_publish());

        update_role(
            State(state.clone()),
            Path(writer),
            Extension(principal_for(&state, admin)),
            Json(UpdateRoleRequest { role: "editor".into() }),
        )
        .await
        .unwrap();

        // The resolver re-reads the role from storage, so the change is
        // effective on the very next request.
        assert!(principal_for(&state, writer).can_publish());
    }

    #[tokio::test]
    async fn non_admin_cannot_change_roles_or_list_users() {
        let admin = Uuid::new_v4();
        let user = Uuid::new_v4();
        let state = state_with_users(&[(admin, "admin"), (user, "user")]);
        let p = principal_for(&state, user);

        let err = update_role(
            State(state.clone()),
            Path(admin),
            Extension(p.clone()),
            Json(UpdateRoleRequest { role: "user".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
        assert_eq!(state.db.get_user_by_id(&admin.to_string()).unwrap().unwrap().role, "admin");

        let query = PageQuery { page: 1, limit: 10, search: None, category: None, status: None };
        let err = list_users(State(state), Query(query), Extension(p)).await.unwrap_err();
        assert!(matches!(err, ApiError::Forbidden));
    }

    #[tokio::test]
    async fn unknown_role_value_is_rejected() {
        let admin = Uuid::new_v4();
        let user = Uuid::new_v4();
        let state = state_with_users(&[(admin, "admin"), (user, "user")]);
        let admin_principal = principal_for(&state, admin);

        for role in ["superadmin", "ADMIN", ""] {
            let err = update_role(
                State(state.clone()),
                Path(user),
                Extension(admin_principal.clone()),
                Json(UpdateRoleRequest { role: role.into() }),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, ApiError::Validation(_)), "{role} must be invalid");
        }
        assert_eq!(state.db.get_user_by_id(&user.to_string()).unwrap().unwrap().role, "user");
    }

    #[tokio::test]
    async fn role_update_for_missing_user_is_not_found() {
        let admin = Uuid::new_v4();
        let state = state_with_users(&[(admin, "admin")]);

        let err = update_role(
            State(state.clone()),
            Path(Uuid::new_v4()),
            Extension(principal_for(&state, admin)),
            Json(UpdateRoleRequest { role: "editor".into() }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn profile_update_merges_absent_fields() {
        let user = Uuid::new_v4();
        let state = state_with_users(&[(user, "user")]);

        update_profile(
            State(state.clone()),
            Extension(principal_for(&state, user)),
            Json(UpdateProfileRequest { name: None, image: Some("avatar.png".into()) }),
        )
        .await
        .unwrap();

        let row = state.db.get_user_by_id(&user.to_string()).unwrap().unwrap();
        assert_eq!(row.name, "Test");
        assert_eq!(row.image.as_deref(), Some("avatar.png"));

        let err = update_profile(
            State(state.clone()),
            Extension(principal_for(&state, user)),
            Json(UpdateProfileRequest { name: Some("   ".into()), image: None }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
