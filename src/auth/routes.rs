//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET  /api/auth/login` - Start a login attempt (issues state nonce)
/// - `POST /api/auth/google/connect` - Login callback verification
/// - `POST /api/auth/logout` - Disconnect the session
/// - `GET  /api/me` - Get current user information
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/login", get(handlers::login_start))
        .route("/api/auth/google/connect", post(handlers::google_connect))
        .route("/api/auth/logout", post(handlers::logout))
        .route("/api/me", get(handlers::me_handler))
}
