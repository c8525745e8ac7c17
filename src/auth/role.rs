//! Roles carried in the `type` claim.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Staff,
    Parent,
    Student,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Staff, Role::Parent, Role::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Staff => "staff",
            Role::Parent => "parent",
            Role::Student => "student",
        }
    }

    /// Parse a role name, ignoring case. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "staff" => Some(Role::Staff),
            "parent" => Some(Role::Parent),
            "student" => Some(Role::Student),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(Role::parse("STAFF"), Some(Role::Staff));
        assert_eq!(Role::parse("Parent"), Some(Role::Parent));
        assert_eq!(Role::parse("student"), Some(Role::Student));
        assert_eq!(Role::parse("janitor"), None);
    }

    #[test]
    fn serde_uses_lowercase_names() {
        assert_eq!(serde_json::to_string(&Role::Staff).unwrap(), "\"staff\"");
        let role: Role = serde_json::from_str("\"parent\"").unwrap();
        assert_eq!(role, Role::Parent);
    }
}
