//! Role-based authorization over an optional [`AuthContext`].
//!
//! Every gated call site names its own [`AllowList`]. The general-access list
//! admits staff and students only; parents are admitted by the lists that
//! include them explicitly.

use thiserror::Error;

use super::context::AuthContext;
use super::role::Role;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AccessDenied {
    #[error("no identity in context, try logging in again")]
    NoIdentity,

    #[error("{0} is not allowed")]
    RoleNotAllowed(String),
}

/// Roles admitted by one gated operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllowList(&'static [Role]);

impl AllowList {
    /// General-access operations.
    pub const GENERAL_ACCESS: AllowList = AllowList(&[Role::Staff, Role::Student]);
    pub const ANY_ROLE: AllowList = AllowList(&Role::ALL);
    pub const STAFF_ONLY: AllowList = AllowList(&[Role::Staff]);
    pub const PARENT_ONLY: AllowList = AllowList(&[Role::Parent]);
    pub const STAFF_OR_PARENT: AllowList = AllowList(&[Role::Staff, Role::Parent]);

    pub const fn new(roles: &'static [Role]) -> Self {
        Self(roles)
    }

    pub fn roles(&self) -> &'static [Role] {
        self.0
    }

    /// Case-insensitive membership test on a role name.
    pub fn admits(&self, role: &str) -> bool {
        Role::parse(role).is_some_and(|role| self.0.contains(&role))
    }
}

/// Decide whether the caller may proceed.
///
/// Fails with [`AccessDenied::NoIdentity`] when no context was attached, and
/// with [`AccessDenied::RoleNotAllowed`] when the role is outside `allowed`.
pub fn authorize<'a>(ctx: Option<&'a AuthContext>, allowed: AllowList) -> Result<&'a AuthContext, AccessDenied> {
    let ctx = ctx.ok_or(AccessDenied::NoIdentity)?;

    if !allowed.admits(ctx.subject_role()) {
        tracing::debug!(
            subject_id = %ctx.subject_id(),
            role = %ctx.subject_role(),
            "role rejected by access gate"
        );
        return Err(AccessDenied::RoleNotAllowed(ctx.subject_role().to_string()));
    }

    Ok(ctx)
}
