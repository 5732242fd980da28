use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Validator;
use crate::error::WorkflowError;
use crate::status::ClassStatus;
use crate::util::null_as_default;

/// Minimum class duration, in the millisecond unit the dates are stored in.
pub const MIN_CLASS_SPAN_MS: i64 = 7 * 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Class {
    #[serde(rename = "ClassID")]
    pub class_id: String,
    #[serde(rename = "SubjectID", default)]
    pub subject_id: String,
    #[serde(default)]
    pub class_code: String,
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub status: ClassStatus,
    /// Epoch milliseconds.
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub repeat: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub students: Vec<String>,
    #[serde(default)]
    pub capacity: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub teacher_username: String,
}

impl Class {
    pub fn has_student(&self, username: &str) -> bool {
        self.students.iter().any(|s| s == username)
    }

    pub fn has_teacher(&self) -> bool {
        !self.teacher_username.is_empty()
    }

    pub fn is_taught_by(&self, username: &str) -> bool {
        self.has_teacher() && self.teacher_username == username
    }
}

/// Editable part of a class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassInfo {
    pub class_code: String,
    pub room: String,
    pub time: String,
    /// Epoch milliseconds.
    pub start_date: String,
    pub end_date: String,
    pub repeat: String,
    pub capacity: u64,
}

impl ClassInfo {
    fn validator(&self) -> Validator {
        Validator::new()
            .present("classCode", &self.class_code)
            .present("room", &self.room)
            .present("time", &self.time)
            .present("repeat", &self.repeat)
            .check(
                "startDate",
                parse_millis(&self.start_date).is_some(),
                "must be a timestamp in milliseconds",
            )
            .check(
                "endDate",
                parse_millis(&self.end_date).is_some(),
                "must be a timestamp in milliseconds",
            )
            .check(
                "endDate",
                self.span_ms().is_some() || !self.dates_parse(),
                "is too far from startDate",
            )
            .check("capacity", self.capacity > 0, "must be positive")
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        self.validator().finish()
    }

    fn dates_parse(&self) -> bool {
        parse_millis(&self.start_date).is_some() && parse_millis(&self.end_date).is_some()
    }

    /// `EndDate - StartDate` in milliseconds, once both parse and the difference fits.
    pub fn span_ms(&self) -> Option<i64> {
        parse_millis(&self.end_date)?.checked_sub(parse_millis(&self.start_date)?)
    }

    pub fn spans_a_week(&self) -> bool {
        matches!(self.span_ms(), Some(span) if span >= MIN_CLASS_SPAN_MS)
    }

    /// Chaincode argument order after the class (and subject) id.
    pub fn args(&self) -> Vec<String> {
        vec![
            self.class_code.trim().to_string(),
            self.room.trim().to_string(),
            self.time.trim().to_string(),
            self.start_date.trim().to_string(),
            self.end_date.trim().to_string(),
            self.repeat.trim().to_string(),
            self.capacity.to_string(),
        ]
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassInput {
    pub subject_id: String,
    #[serde(flatten)]
    pub info: ClassInfo,
}

impl ClassInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        self.info
            .validator()
            .present("subjectId", &self.subject_id)
            .finish()
    }
}

fn parse_millis(value: &str) -> Option<i64> {
    value.trim().parse().ok()
}
