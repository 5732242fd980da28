use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Validator;
use crate::error::WorkflowError;
use crate::util::null_as_default;

pub const MIN_FULLNAME_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase", default)]
pub struct Info {
    pub phone_number: String,
    pub email: String,
    pub address: String,
    pub sex: String,
    pub birthday: String,
    pub avatar: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Student {
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: Info,
    #[serde(default, deserialize_with = "null_as_default")]
    pub courses: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub certificates: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Teacher {
    pub username: String,
    #[serde(default)]
    pub fullname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub info: Info,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TeacherInput {
    pub username: String,
    pub fullname: String,
}

impl TeacherInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        Validator::new()
            .present("username", &self.username)
            .check(
                "username",
                self.username.trim().chars().all(|c| c.is_ascii_alphanumeric()),
                "must be alphanumeric",
            )
            .check(
                "fullname",
                self.fullname.trim().chars().count() >= MIN_FULLNAME_LEN,
                format!("must be at least {} characters long", MIN_FULLNAME_LEN),
            )
            .finish()
    }

    /// Directory usernames are stored lowercase.
    pub fn normalized_username(&self) -> String {
        self.username.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_fullnames_are_rejected() {
        let input = TeacherInput {
            username: "gv01".into(),
            fullname: "Ann".into(),
        };
        match input.validate() {
            Err(WorkflowError::Invalid(errors)) => assert_eq!(errors[0].field, "fullname"),
            other => panic!("expected invalid, got {:?}", other),
        }
    }

    #[test]
    fn usernames_are_normalized() {
        let input = TeacherInput {
            username: " GV01 ".into(),
            fullname: "Nguyen Van A".into(),
        };
        assert!(input.validate().is_ok());
        assert_eq!(input.normalized_username(), "gv01");
    }
}
