use crate::data::score::format_value;
use crate::data::{Class, ClassScoreInput, ScoreInput};
use crate::error::WorkflowError;
use crate::gate;
use crate::guard::Guards;
use crate::ledger::{invoke, query};
use crate::role::Role;
use crate::status::ClassStatus;

use super::class::{class_is, status_is, NO_CLASS};
use super::{Committed, Workflow};

impl Workflow<'_> {
    /// Upserts a subject score for a student account.
    #[tracing::instrument(skip(self))]
    pub async fn create_score(&self, input: &ScoreInput) -> Result<Committed, WorkflowError> {
        self.authorize(gate::TEACHER)?;
        input.validate()?;

        let username = input.student_username.trim().to_lowercase();
        self.require_student_account(&username).await?;

        let value = format_value(input.score_value);
        let receipt = self
            .commit(
                invoke::CREATE_SCORE,
                &[input.subject_id.trim(), username.as_str(), value.as_str()],
            )
            .await?;
        Ok(Committed::new(receipt))
    }

    /// Scores a student of a class the caller teaches, against the class's
    /// subject.
    #[tracing::instrument(skip(self))]
    pub async fn enter_class_score(
        &self,
        class_id: &str,
        student_username: &str,
        input: &ClassScoreInput,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::TEACHER)?;
        input.validate()?;

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        let teacher = self.caller.username.as_str();
        Guards::on(&class)
            .require(|c| c.is_taught_by(teacher), |_| WorkflowError::Denied)
            .require(status_is(ClassStatus::InProgress), class_is)
            .require(
                |c| c.has_student(student_username),
                |_| WorkflowError::state("Student is not in this class"),
            )
            .pass()?;

        let value = format_value(input.score_value);
        let receipt = self
            .commit(
                invoke::CREATE_SCORE,
                &[class.subject_id.as_str(), student_username, value.as_str()],
            )
            .await?;
        Ok(Committed::new(receipt))
    }

    async fn require_student_account(&self, username: &str) -> Result<(), WorkflowError> {
        match self.directory.find_by_username(username).await? {
            Some(user) if user.is(Role::Student) => Ok(()),
            _ => Err(WorkflowError::not_found("Student does not exist")),
        }
    }
}
