use std::fmt;

use serde::{Deserialize, Serialize};

/// Identity handed to the service by the upstream identity provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub user_id: String,
    pub role: Role,
}

impl Session {
    pub fn actor(&self) -> Actor {
        match self.role {
            Role::Customer => Actor::Customer,
            Role::Business | Role::Admin => Actor::Business,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Business,
    Customer,
}

impl Role {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "business" => Some(Role::Business),
            "customer" => Some(Role::Customer),
            _ => None,
        }
    }
}

/// Party driving a booking status change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Actor {
    Customer,
    Business,
    /// Automated transitions, e.g. after a payment settles.
    System,
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Actor::Customer => f.write_str("customer"),
            Actor::Business => f.write_str("business"),
            Actor::System => f.write_str("system"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!(Role::parse("Business"), Some(Role::Business));
        assert_eq!(Role::parse(" customer "), Some(Role::Customer));
        assert_eq!(Role::parse("owner"), None);
    }

    #[test]
    fn test_admin_acts_as_business() {
        let session = Session {
            user_id: "u-1".to_string(),
            role: Role::Admin,
        };
        assert_eq!(session.actor(), Actor::Business);
    }
}
