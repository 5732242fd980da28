use serde::{Deserialize, Serialize};
use std::convert::TryFrom;
use utoipa::ToSchema;

/// Account role. Serialized as the numeric code stored in the user directory
/// and carried in caller tokens.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u8", into = "u8")]
pub enum Role {
    AdminAcademy,
    Teacher,
    AdminStudent,
    Student,
}

impl From<Role> for u8 {
    fn from(value: Role) -> u8 {
        match value {
            Role::AdminAcademy => 1u8,
            Role::Teacher => 2u8,
            Role::AdminStudent => 3u8,
            Role::Student => 4u8,
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Role::AdminAcademy),
            2 => Ok(Role::Teacher),
            3 => Ok(Role::AdminStudent),
            4 => Ok(Role::Student),
            other => Err(format!("unknown role code {}", other)),
        }
    }
}

impl Role {
    /// Ledger organization the role's wallet identity belongs to.
    pub fn org(self) -> Org {
        match self {
            Role::AdminAcademy | Role::Teacher => Org::Academy,
            Role::AdminStudent | Role::Student => Org::Student,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::AdminAcademy => write!(f, "admin_academy"),
            Role::Teacher => write!(f, "teacher"),
            Role::AdminStudent => write!(f, "admin_student"),
            Role::Student => write!(f, "student"),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Org {
    Academy,
    Student,
}

impl Org {
    pub fn as_str(self) -> &'static str {
        match self {
            Org::Academy => "academy",
            Org::Student => "student",
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(try_from = "u8", into = "u8")]
pub enum OAuthType {
    None,
    Google,
    Facebook,
}

impl Default for OAuthType {
    fn default() -> Self {
        OAuthType::None
    }
}

impl From<OAuthType> for u8 {
    fn from(value: OAuthType) -> u8 {
        match value {
            OAuthType::None => 0u8,
            OAuthType::Google => 1u8,
            OAuthType::Facebook => 2u8,
        }
    }
}

impl TryFrom<u8> for OAuthType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OAuthType::None),
            1 => Ok(OAuthType::Google),
            2 => Ok(OAuthType::Facebook),
            other => Err(format!("unknown oauth type {}", other)),
        }
    }
}
