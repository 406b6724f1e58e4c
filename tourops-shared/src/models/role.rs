use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Moderator,
    Operator,
    Customer,
}

impl Role {
    /// KYC and review queues
    pub fn can_moderate(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }

    /// Contact form inbox
    pub fn can_handle_support(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn receives_alerts(&self) -> bool {
        !matches!(self, Role::Customer)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Role::Admin => "ADMIN",
            Role::Moderator => "MODERATOR",
            Role::Operator => "OPERATOR",
            Role::Customer => "CUSTOMER",
        };
        f.write_str(s)
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "MODERATOR" => Ok(Role::Moderator),
            "OPERATOR" => Ok(Role::Operator),
            "CUSTOMER" | "USER" => Ok(Role::Customer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}
