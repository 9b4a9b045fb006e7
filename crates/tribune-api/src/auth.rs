use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use jsonwebtoken::{encode, EncodingKey, Header};
use uuid::Uuid;

use tribune_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};
use tribune_types::models::Role;

use crate::error::ApiError;
use crate::state::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.name.trim().is_empty() || !req.email.contains('@') {
        return Err(ApiError::Validation("Name and a valid email are required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("Password must be at least 8 characters".into()));
    }

    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("Email already registered"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("password hashing failed: {}", e))?
        .to_string();

    let user_id = Uuid::new_v4();
    state
        .db
        .create_user(&user_id.to_string(), &req.name, &req.email, &password_hash, Role::User.as_str())?;

    let token = create_token(&state.jwt_secret, user_id)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            user_id,
            name: req.name,
            role: Role::User,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::Unauthenticated("Invalid email or password".into()))?;

    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| anyhow::anyhow!("corrupt password hash: {}", e))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthenticated("Invalid email or password".into()))?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", user.id, e))?;
    let role = user
        .role
        .parse::<Role>()
        .map_err(|e| anyhow::anyhow!("corrupt role on user '{}': {}", user.id, e))?;

    let token = create_token(&state.jwt_secret, user_id)?;

    Ok(Json(AuthResponse {
        user_id,
        name: user.name,
        role,
        token,
    }))
}

/// Issue the signed credential. Only the stable id and expiry are embedded;
/// everything else is re-read from storage on each request.
pub fn create_token(secret: &str, user_id: Uuid) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Exercises OsRng salt generation end to end, not just the verify path.
    #[test]
    fn password_hash_round_trip() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"correct horse", &salt)
            .unwrap()
            .to_string();

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
