use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Validator;
use crate::error::WorkflowError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Score {
    #[serde(rename = "SubjectID")]
    pub subject_id: String,
    pub student_username: String,
    #[serde(default)]
    pub score_value: f64,
    #[serde(default)]
    pub certificated: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInput {
    pub subject_id: String,
    pub student_username: String,
    pub score_value: f64,
}

impl ScoreInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        validate_value(
            Validator::new()
                .present("subjectId", &self.subject_id)
                .present("studentUsername", &self.student_username),
            self.score_value,
        )
    }
}

/// Score entered by the teacher of a class; the subject comes from the class.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassScoreInput {
    pub score_value: f64,
}

impl ClassScoreInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        validate_value(Validator::new(), self.score_value)
    }
}

fn validate_value(v: Validator, value: f64) -> Result<(), WorkflowError> {
    v.check("scoreValue", value.is_finite(), "must be a number")
        .check("scoreValue", value >= 0.0, "must not be negative")
        .finish()
}

/// Chaincode score argument.
pub fn format_value(value: f64) -> String {
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_scores_are_invalid() {
        let input = ScoreInput {
            subject_id: "s1".into(),
            student_username: "st01".into(),
            score_value: -1.0,
        };
        assert!(matches!(input.validate(), Err(WorkflowError::Invalid(_))));
    }

    #[test]
    fn certificated_defaults_to_false() {
        let score: Score = serde_json::from_value(serde_json::json!({
            "SubjectID": "s1",
            "StudentUsername": "st01",
            "ScoreValue": 8.5
        }))
        .unwrap();
        assert!(!score.certificated);
        assert_eq!(format_value(score.score_value), "8.5");
    }
}
