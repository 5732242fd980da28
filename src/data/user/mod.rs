use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::role::{OAuthType, Role};

pub mod db;

pub use db::{DirectoryError, UserDirectory};

/// Off-ledger account. Credentials are owned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub username: String,
    pub role: Role,
    #[serde(rename = "oauthType", default)]
    pub oauth_type: OAuthType,
}

impl User {
    pub fn new(username: impl AsRef<str>, role: Role) -> User {
        User {
            username: username.as_ref().trim().to_lowercase(),
            role,
            oauth_type: OAuthType::None,
        }
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_document_uses_numeric_codes() {
        let user = User::new("GV01", Role::Teacher);
        assert_eq!(
            serde_json::to_value(&user).unwrap(),
            serde_json::json!({"username": "gv01", "role": 2, "oauthType": 0})
        );
    }
}
