//! Session extractors for Axum
//!
//! `SessionToken` surfaces the raw cookie value; `MaybeUser` resolves the
//! session binding to a user row when one exists. Handlers that mutate
//! resources take `MaybeUser` and let the authorization guard decide, so
//! the not-logged-in policy lives in exactly one place.

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::COOKIE, request::Parts},
};
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::models::User;
use super::service::AuthService;
use crate::common::{safe_email_log, ApiError, AppState};

/// Name of the cookie carrying the opaque session token
pub const SESSION_COOKIE: &str = "session";

fn cookie_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// Raw session token from the request cookie, if any
#[derive(Debug)]
pub struct SessionToken(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for SessionToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(SessionToken(cookie_value(parts, SESSION_COOKIE)))
    }
}

/// The user bound to the request's session, when the session is
/// authenticated. `None` for anonymous requests, sessions that were never
/// bound, and tokens the store no longer knows about.
#[derive(Debug)]
pub struct MaybeUser(pub Option<User>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
            Extension::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;

        let app_state = state_lock.read().await.clone();

        let Some(token) = cookie_value(parts, SESSION_COOKIE) else {
            return Ok(MaybeUser(None));
        };

        let Some(session) = app_state.sessions.get(&token).await else {
            return Ok(MaybeUser(None));
        };

        let Some(user_id) = session.user_id else {
            return Ok(MaybeUser(None));
        };

        // The session claims a binding; the row is the source of truth.
        let user = AuthService::new(app_state.db.clone())
            .find_by_id(&user_id)
            .await?;

        match user {
            Some(u) => {
                debug!(
                    user_id = %u.id,
                    email = %safe_email_log(&u.email),
                    "Resolved session binding to user"
                );
                Ok(MaybeUser(Some(u)))
            }
            None => {
                warn!(user_id = %user_id, "Session bound to a user that no longer exists");
                Ok(MaybeUser(None))
            }
        }
    }
}
