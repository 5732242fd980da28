use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Validator;
use crate::error::WorkflowError;

pub const ISSUE_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct Certificate {
    #[serde(rename = "CertificateID")]
    pub certificate_id: String,
    #[serde(rename = "CourseID")]
    pub course_id: String,
    pub student_username: String,
    #[serde(default)]
    pub issue_date: String,
}

/// Publicly readable view of a certificate. Holds nothing beyond what a
/// verifier needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct PublicCertificate {
    #[serde(rename = "CertificateID")]
    pub certificate_id: String,
    #[serde(rename = "CourseID")]
    pub course_id: String,
    pub course_name: String,
    pub student_username: String,
    pub fullname: String,
    pub issue_date: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateInput {
    pub course_id: String,
}

impl CertificateInput {
    pub fn validate(&self) -> Result<(), WorkflowError> {
        Validator::new().present("courseId", &self.course_id).finish()
    }
}

pub fn issue_date(day: NaiveDate) -> String {
    day.format(ISSUE_DATE_FORMAT).to_string()
}
