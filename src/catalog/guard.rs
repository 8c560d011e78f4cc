// src/catalog/guard.rs
//! Authorization guard
//!
//! The single policy chokepoint for catalog mutations. Every mutating
//! handler asks this module before touching the database; handlers never
//! carry their own ownership checks. Reads are open to everyone,
//! ownership only gates mutation.

use crate::auth::models::User;
use crate::common::ApiError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogAction {
    View,
    Create,
    Edit,
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotLoggedIn,
    NotOwner,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed,
    Denied(DenyReason),
}

impl From<DenyReason> for ApiError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotLoggedIn => {
                ApiError::Unauthorized("login required for this action".to_string())
            }
            DenyReason::NotOwner => {
                ApiError::Forbidden("you do not own this resource".to_string())
            }
        }
    }
}

/// Decide whether `session_user` may perform `action` on a resource owned
/// by `owner`. `owner` is None for creations that have no parent resource
/// (a new category); adding an item under a category passes the category
/// owner, which is what makes item creation transitive on category
/// ownership.
pub fn authorize(
    action: CatalogAction,
    owner: Option<&str>,
    session_user: Option<&str>,
) -> Decision {
    if action == CatalogAction::View {
        return Decision::Allowed;
    }

    let Some(user) = session_user else {
        return Decision::Denied(DenyReason::NotLoggedIn);
    };

    match owner {
        Some(owner) if owner != user => Decision::Denied(DenyReason::NotOwner),
        _ => Decision::Allowed,
    }
}

/// Guard a mutation and hand back the acting user. The session user must
/// exist and, when the resource has an owner, be that owner.
pub fn require_owner<'a>(
    action: CatalogAction,
    owner: Option<&str>,
    user: Option<&'a User>,
) -> Result<&'a User, ApiError> {
    match authorize(action, owner, user.map(|u| u.id.as_str())) {
        Decision::Denied(reason) => Err(reason.into()),
        Decision::Allowed => user.ok_or_else(|| DenyReason::NotLoggedIn.into()),
    }
}
