use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey, Validation};
use thiserror::Error;

use tribune_db::models::UserRow;
use tribune_db::Database;
use tribune_types::api::Claims;
use tribune_types::models::{Principal, Role};

use crate::error::ApiError;

/// Failure modes of credential resolution. All are terminal for the current
/// request; only `Storage` is the server's fault.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Authentication required")]
    MissingCredential,

    #[error("Invalid token")]
    InvalidCredential,

    #[error("Token expired")]
    Expired,

    #[error("User not found")]
    PrincipalNotFound,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl From<ResolveError> for ApiError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::Storage(source) => ApiError::Internal(source),
            other => ApiError::Unauthenticated(other.to_string()),
        }
    }
}

/// Validate the signed credential, then re-read the authoritative user row.
/// Role and identity embedded in an older token are never trusted — only the
/// stable id is taken from the claims.
pub fn resolve(db: &Database, secret: &str, token: &str) -> Result<Principal, ResolveError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => ResolveError::Expired,
        _ => ResolveError::InvalidCredential,
    })?;

    let row = db
        .get_user_by_id(&token_data.claims.sub.to_string())?
        .ok_or(ResolveError::PrincipalNotFound)?;

    principal_from_row(row)
}

fn principal_from_row(row: UserRow) -> Result<Principal, ResolveError> {
    let id = row
        .id
        .parse()
        .map_err(|e| anyhow::anyhow!("corrupt user id '{}': {}", row.id, e))?;
    let role = row
        .role
        .parse::<Role>()
        .map_err(|e| anyhow::anyhow!("corrupt role on user '{}': {}", row.id, e))?;

    Ok(Principal {
        id,
        name: row.name,
        email: row.email,
        role,
        image: row.image,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::create_token;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use uuid::Uuid;

    const SECRET: &str = "test-secret";

    fn db_with_user(id: Uuid, role: &str) -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user(&id.to_string(), "Reader", "reader@example.com", "hash", role)
            .unwrap();
        db
    }

    #[test]
    fn resolves_role_from_storage_not_token() {
        let id = Uuid::new_v4();
        let db = db_with_user(id, "admin");
        let token = create_token(SECRET, id).unwrap();

        let principal = resolve(&db, SECRET, &token).unwrap();
        assert_eq!(principal.id, id);
        assert_eq!(principal.role, Role::Admin);
        assert_eq!(principal.name, "Reader");
    }

    #[test]
    fn garbage_token_is_invalid() {
        let db = db_with_user(Uuid::new_v4(), "user");
        let err = resolve(&db, SECRET, "not-a-jwt").unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCredential));
    }

    #[test]
    fn wrong_secret_is_invalid() {
        let id = Uuid::new_v4();
        let db = db_with_user(id, "user");
        let token = create_token("other-secret", id).unwrap();
        let err = resolve(&db, SECRET, &token).unwrap_err();
        assert!(matches!(err, ResolveError::InvalidCredential));
    }

    #[test]
    fn expired_token_is_distinguished() {
        let id = Uuid::new_v4();
        let db = db_with_user(id, "user");

        let claims = Claims {
            sub: id,
            exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let err = resolve(&db, SECRET, &token).unwrap_err();
        assert!(matches!(err, ResolveError::Expired));
    }

    #[test]
    fn deleted_user_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let token = create_token(SECRET, Uuid::new_v4()).unwrap();
        let err = resolve(&db, SECRET, &token).unwrap_err();
        assert!(matches!(err, ResolveError::PrincipalNotFound));
    }
}
