use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Validator;
use crate::error::WorkflowError;
use crate::status::CourseStatus;
use crate::util::null_as_default;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Course {
    #[serde(rename = "CourseID")]
    pub course_id: String,
    #[serde(default)]
    pub course_code: String,
    #[serde(default)]
    pub course_name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default, deserialize_with = "null_as_default")]
    pub subjects: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub students: Vec<String>,
}

impl Course {
    pub fn has_subject(&self, subject_id: &str) -> bool {
        self.subjects.iter().any(|s| s == subject_id)
    }

    pub fn has_student(&self, username: &str) -> bool {
        self.students.iter().any(|s| s == username)
    }

    /// Whether `input` would change any stored field.
    pub fn differs_from(&self, input: &CourseInput) -> bool {
        self.course_code != input.course_code.trim()
            || self.course_name != input.course_name.trim()
            || self.short_description != input.short_description.trim()
            || self.description != input.description.trim()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseInput {
    pub course_code: String,
    pub course_name: String,
    pub short_description: String,
    pub description: String,
}

impl CourseInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        Validator::new()
            .present("courseCode", &self.course_code)
            .present("courseName", &self.course_name)
            .present("shortDescription", &self.short_description)
            .present("description", &self.description)
            .finish()
    }

    /// Chaincode argument order after the course id.
    pub fn args(&self) -> [&str; 4] {
        [
            self.course_code.trim(),
            self.course_name.trim(),
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
    fn decodes_chaincode_snapshot_with_null_sets() {
        let course: Course = serde_json::from_value(json!({
            "CourseID": "c1",
            "CourseCode": "BC101",
            "CourseName": "Blockchain",
            "ShortDescription": "intro",
            "Description": "long",
            "Status": "Closed",
            "Subjects": null,
            "Students": ["st01"]
        }))
        .unwrap();

        assert_eq!(course.status, CourseStatus::Closed);
        assert!(course.subjects.is_empty());
        assert!(course.has_student("st01"));
    }

    #[test]
    fn trimmed_identical_input_is_not_a_change() {
        let course = Course {
            course_id: "c1".into(),
            course_code: "BC101".into(),
            course_name: "Blockchain".into(),
            short_description: "intro".into(),
            description: "long".into(),
            ..Default::default()
        };
        let mut input = CourseInput {
            course_code: " BC101 ".into(),
            course_name: "Blockchain".into(),
            short_description: "intro".into(),
            description: "long".into(),
        };
        assert!(!course.differs_from(&input));

        input.description = "longer".into();
        assert!(course.differs_from(&input));
    }
}
