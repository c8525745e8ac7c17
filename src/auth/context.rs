use serde::Serialize;

use super::role::Role;
use super::token::TokenClaims;

/// Identity of the caller for a single request.
///
/// Built once by the context middleware from a token that parsed and verified,
/// then only read. Requests without a usable token simply carry no context.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuthContext {
    subject_id: String,
    subject_role: String,
}

impl AuthContext {
    pub fn new(subject_id: impl Into<String>, subject_role: &str) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_role: subject_role.to_lowercase(),
        }
    }

    pub fn subject_id(&self) -> &str {
        &self.subject_id
    }

    /// Lower-cased role name as it appeared in the token.
    pub fn subject_role(&self) -> &str {
        &self.subject_role
    }

    /// The role as a known [`Role`], if it is one.
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.subject_role)
    }
}

impl From<TokenClaims> for AuthContext {
    fn from(claims: TokenClaims) -> Self {
        Self::new(claims.subject_id, &claims.subject_role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    #[test]
    fn role_is_lower_cased() {
        let ctx = AuthContext::new("S1", "Staff");
        assert_eq!(ctx.subject_role(), "staff");
        assert_eq!(ctx.role(), Some(Role::Staff));
    }

    #[test]
    fn unknown_role_is_kept_verbatim() {
        let ctx = AuthContext::from(TokenClaims {
            subject_id: "X1".to_string(),
            subject_role: "VISITOR".to_string(),
            issued_at: None,
            expires_at: None,
            extensions: Map::new(),
        });
        assert_eq!(ctx.subject_id(), "X1");
        assert_eq!(ctx.subject_role(), "visitor");
        assert_eq!(ctx.role(), None);
    }
}
