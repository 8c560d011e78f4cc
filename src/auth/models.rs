//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub picture: Option<String>,
    pub created_at: Option<String>,
}

/// Login callback payload: the echoed anti-forgery nonce and the
/// authorization code obtained from the client-side OAuth flow
#[derive(Deserialize, Debug)]
pub struct ConnectRequest {
    pub state: String,
    pub code: String,
}

/// Response to a login-start request
#[derive(Serialize, Debug)]
pub struct LoginStartResponse {
    pub state: String,
    pub authorization_url: String,
}
