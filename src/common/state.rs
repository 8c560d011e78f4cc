// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::provider::IdentityProvider;
use crate::auth::session::SessionStore;

/// Application state containing database pool, session store, and the
/// identity-provider client used by the login flow
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: SessionStore,
    pub provider: Arc<dyn IdentityProvider>,
    pub client_id: String,
    pub redirect_uri: String,
}
