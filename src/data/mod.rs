//! Ledger records as stored by the academy chaincode, and the request bodies
//! that create or edit them.

use crate::error::{FieldError, WorkflowError};

pub mod certificate;
pub mod class;
pub mod course;
pub mod people;
pub mod score;
pub mod subject;
pub mod user;

pub use certificate::{Certificate, CertificateInput, PublicCertificate};
pub use class::{Class, ClassInfo, ClassInput};
pub use course::{Course, CourseInput};
pub use people::{Info, Student, Teacher, TeacherInput};
pub use score::{ClassScoreInput, Score, ScoreInput};
pub use subject::{Subject, SubjectInput};

/// Collects per-field problems of a request body.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Validator {
        Validator::default()
    }

    pub fn present(self, field: &'static str, value: &str) -> Self {
        self.check(field, !value.trim().is_empty(), "must not be empty")
    }

    pub fn check(mut self, field: &'static str, ok: bool, msg: impl ToString) -> Self {
        if !ok {
            self.errors.push(FieldError::new(field, msg));
        }
        self
    }

    pub fn finish(self) -> Result<(), WorkflowError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(WorkflowError::Invalid(self.errors))
        }
    }
}
