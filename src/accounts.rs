//! Staff and parent accounts as seen by the login flow.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use crate::auth::password::verify_password;
use crate::auth::Role;
use crate::store::{AccountStore, StoreError};

/// Roles that can log in, in the order they are tried.
pub const LOGIN_ROLES: [Role; 2] = [Role::Staff, Role::Parent];

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

/// Find the first login role whose account matches both email and password.
///
/// A staff account with the right email but the wrong password does not stop
/// the parent lookup. `None` does not say which lookup failed.
pub async fn authenticate(
    store: &dyn AccountStore,
    email: &str,
    password: &str,
) -> Result<Option<(Role, Account)>, StoreError> {
    for role in LOGIN_ROLES {
        if let Some(account) = store.find_by_email(role, email).await? {
            if verify_password(password, &account.password_hash) {
                return Ok(Some((role, account)));
            }
        }
    }
    Ok(None)
}
