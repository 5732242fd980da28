use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Validator;
use crate::error::WorkflowError;
use crate::util::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Subject {
    #[serde(rename = "SubjectID")]
    pub subject_id: String,
    #[serde(default)]
    pub subject_code: String,
    #[serde(default)]
    pub subject_name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    /// Empty when no teacher is responsible.
    #[serde(default, deserialize_with = "null_as_default")]
    pub teacher_username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub students: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub classes: Vec<String>,
}

impl Subject {
    pub fn has_student(&self, username: &str) -> bool {
        self.students.iter().any(|s| s == username)
    }

    pub fn differs_from(&self, input: &SubjectInput) -> bool {
        self.subject_code != input.subject_code.trim()
            || self.subject_name != input.subject_name.trim()
            || self.short_description != input.short_description.trim()
            || self.description != input.description.trim()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInput {
    pub subject_code: String,
    pub subject_name: String,
    pub short_description: String,
    pub description: String,
}

impl SubjectInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        Validator::new()
            .present("subjectCode", &self.subject_code)
            .present("subjectName", &self.subject_name)
            .present("shortDescription", &self.short_description)
            .present("description", &self.description)
            .finish()
    }

    pub fn args(&self) -> [&str; 4] {
        [
            self.subject_code.trim(),
            self.subject_name.trim(),
            self.short_description.trim(),
            self.description.trim(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_teacher_means_unassigned() {
        let subject: Subject = serde_json::from_value(json!({
            "SubjectID": "s1",
            "SubjectName": "Go",
            "TeacherUsername": null,
            "Classes": null
        }))
        .unwrap();
        assert_eq!(subject.teacher_username, "");
        assert!(subject.classes.is_empty());
    }
}
