// src/auth/service.rs
//! Session/identity binder: maps a verified external identity to a local
//! user row.

use sqlx::SqlitePool;
use tracing::{info, warn};

use super::models::User;
use super::verifier::VerifiedIdentity;
use crate::common::{generate_user_id, safe_email_log, ApiError};

pub struct AuthService {
    db: SqlitePool,
}

impl AuthService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Look up the user for a verified identity, creating it on first
    /// login. Lookup key is the email; a returning user's stored name and
    /// picture are intentionally left as they were.
    ///
    /// Concurrent first logins of the same identity are settled by the
    /// UNIQUE constraint on email: the loser of the insert race retries
    /// the lookup and returns the winner's row.
    pub async fn resolve_or_create_user(
        &self,
        identity: &VerifiedIdentity,
    ) -> Result<User, ApiError> {
        if let Some(user) = self.find_by_email(&identity.email).await? {
            return Ok(user);
        }

        let id = generate_user_id();
        info!(
            user_id = %id,
            email = %safe_email_log(&identity.email),
            "Creating new user account on first login"
        );

        let insert = sqlx::query(
            "INSERT INTO users (id, name, email, picture, created_at) VALUES (?, ?, ?, ?, datetime('now'))",
        )
        .bind(&id)
        .bind(&identity.name)
        .bind(&identity.email)
        .bind(&identity.picture_url)
        .execute(&self.db)
        .await;

        if let Err(e) = insert {
            if e.to_string().contains("UNIQUE constraint failed") {
                warn!(
                    email = %safe_email_log(&identity.email),
                    "Lost first-login insert race, retrying lookup"
                );
                return self
                    .find_by_email(&identity.email)
                    .await?
                    .ok_or_else(|| {
                        ApiError::Conflict("user creation race left no row".to_string())
                    });
            }
            return Err(ApiError::DatabaseError(e));
        }

        self.find_by_email(&identity.email)
            .await?
            .ok_or_else(|| ApiError::NotFound("newly created user not found".to_string()))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }
}
