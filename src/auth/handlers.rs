//! Authentication handlers

use axum::{
    extract::{Extension, Json},
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::extractors::{MaybeUser, SessionToken, SESSION_COOKIE};
use super::models::{ConnectRequest, LoginStartResponse};
use super::provider::{AuthError, IdentityProvider};
use super::service::AuthService;
use super::session::{BoundIdentity, SessionStore};
use super::verifier::{self, Verification};
use crate::common::helpers::safe_token_log;
use crate::common::{safe_email_log, ApiError, AppState};

fn session_cookie(token: &str) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, token)
}

/// GET /api/auth/login
/// Starts a login attempt: issues a fresh anti-forgery nonce bound to the
/// caller's session and returns it with the provider consent URL. A new
/// session is created when the request carries no usable cookie.
pub async fn login_start(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    SessionToken(token): SessionToken,
) -> Result<impl IntoResponse, ApiError> {
    let state = state_lock.read().await.clone();

    let token = match token {
        Some(t) if state.sessions.exists(&t).await => t,
        _ => state.sessions.create().await,
    };

    let nonce = state
        .sessions
        .issue_nonce(&token)
        .await
        .ok_or_else(|| ApiError::InternalServer("session disappeared".to_string()))?;

    let authorization_url = state
        .provider
        .authorization_url(&nonce, &state.redirect_uri);

    Ok((
        AppendHeaders([(SET_COOKIE, session_cookie(&token))]),
        Json(LoginStartResponse {
            state: nonce,
            authorization_url,
        }),
    ))
}

/// POST /api/auth/google/connect
/// Login callback: verifies the echoed state nonce and authorization code,
/// resolves or creates the local user, and binds it to the session.
///
/// # Request Body
/// ```json
/// {
///   "state": "<nonce issued by /api/auth/login>",
///   "code": "<authorization code from the provider>"
/// }
/// ```
pub async fn google_connect(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    SessionToken(token): SessionToken,
    Json(payload): Json<ConnectRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    // No session means no issued nonce; same outcome as a stale one.
    let token = token.ok_or(AuthError::InvalidState)?;
    let session = state
        .sessions
        .get(&token)
        .await
        .ok_or(AuthError::InvalidState)?;

    let outcome = verifier::verify(
        state.provider.as_ref(),
        &state.client_id,
        &state.redirect_uri,
        &payload.state,
        session.state_nonce.as_deref(),
        session.subject.as_deref(),
        &payload.code,
    )
    .await?;

    let auth_service = AuthService::new(state.db.clone());

    match outcome {
        Verification::AlreadyConnected => {
            let user_id = session
                .user_id
                .ok_or_else(|| ApiError::Unauthorized("session not bound".to_string()))?;
            let user = auth_service
                .find_by_id(&user_id)
                .await?
                .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?;

            info!(user_id = %user.id, "Login repeated for already-connected session");

            Ok(Json(serde_json::json!({
                "already_connected": true,
                "user": user,
            })))
        }
        Verification::Connected {
            identity,
            access_token,
        } => {
            let user = auth_service.resolve_or_create_user(&identity).await?;

            let bound = state
                .sessions
                .bind_identity(
                    &token,
                    BoundIdentity {
                        user_id: user.id.clone(),
                        access_token,
                        subject: identity.subject_id.clone(),
                        email: identity.email.clone(),
                        name: identity.name.clone(),
                        picture: identity.picture_url.clone(),
                    },
                )
                .await;

            if !bound {
                return Err(ApiError::Unauthorized("session expired".to_string()));
            }

            info!(
                user_id = %user.id,
                email = %safe_email_log(&user.email),
                "User authentication successful via Google OAuth"
            );

            Ok(Json(serde_json::json!({
                "already_connected": false,
                "user": user,
            })))
        }
    }
}

/// Outcome of a disconnect attempt. Logging out without a bound
/// credential is not an error.
#[derive(Debug, PartialEq)]
pub enum DisconnectOutcome {
    NotLoggedIn,
    Disconnected,
}

/// Revokes the provider credential (best-effort) and clears the session
/// binding in one step.
pub async fn disconnect(
    sessions: &SessionStore,
    provider: &dyn IdentityProvider,
    token: Option<&str>,
) -> DisconnectOutcome {
    let Some(token) = token else {
        return DisconnectOutcome::NotLoggedIn;
    };
    let Some(session) = sessions.get(token).await else {
        return DisconnectOutcome::NotLoggedIn;
    };
    let Some(access_token) = session.access_token else {
        return DisconnectOutcome::NotLoggedIn;
    };

    // Revocation is best-effort: an already-invalid token or unreachable
    // provider must not leave the session half-cleared.
    if let Err(e) = provider.revoke(&access_token).await {
        warn!(
            error = %e,
            token = %safe_token_log(&access_token),
            "Token revocation failed, clearing session anyway"
        );
    }

    sessions.clear_identity(token).await;

    info!("User session disconnected");

    DisconnectOutcome::Disconnected
}

/// POST /api/auth/logout
/// Disconnects the session. Logging out an already logged-out session
/// succeeds without complaint.
pub async fn logout(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    SessionToken(token): SessionToken,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    match disconnect(&state.sessions, state.provider.as_ref(), token.as_deref()).await {
        DisconnectOutcome::NotLoggedIn => {
            Ok(Json(serde_json::json!({ "message": "not logged in" })))
        }
        DisconnectOutcome::Disconnected => Ok(Json(serde_json::json!({
            "message": "successfully disconnected"
        }))),
    }
}

/// GET /api/me
/// Returns the current authenticated user's information
pub async fn me_handler(MaybeUser(user): MaybeUser) -> Result<Json<serde_json::Value>, ApiError> {
    match user {
        Some(user) => Ok(Json(serde_json::json!({ "user": user }))),
        None => Err(ApiError::Unauthorized("login required".to_string())),
    }
}
