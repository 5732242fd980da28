use crate::data::{Class, Course};
use crate::error::WorkflowError;
use crate::gate;
use crate::guard::Guards;
use crate::ledger::{invoke, query};
use crate::status::{ClassStatus, CourseStatus};

use super::class::{class_is, status_is, NO_CLASS};
use super::{Committed, Workflow};

impl Workflow<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn register_course(&self, course_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        let username = self.caller.username.as_str();

        let ctx = self.connect().await?;
        let course: Course = self
            .fetch_existing(&ctx, query::GET_COURSE, &[course_id], "Course does not exist")
            .await?;

        Guards::on(&course)
            .forbid(
                |c| c.has_student(username),
                |_| WorkflowError::duplicate("You have already registered for this course"),
            )
            .require(
                |c| c.status == CourseStatus::Open,
                |c| WorkflowError::state(format!("Course is {}", c.status)),
            )
            .pass()?;

        let receipt = self
            .commit(invoke::REGISTER_COURSE, &[username, course_id])
            .await?;
        Ok(Committed::new(receipt))
    }

    /// A student holds at most one class of a subject.
    #[tracing::instrument(skip(self))]
    pub async fn register_class(&self, class_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        let username = self.caller.username.as_str();

        let ctx = self.connect().await?;
        let (class_args, student_args) = ([class_id], [username]);
        let (class, held) = tokio::try_join!(
            self.fetch::<Class>(&ctx, query::GET_CLASS, &class_args),
            self.fetch_list::<Class>(&ctx, query::GET_CLASSES_OF_STUDENT, &student_args),
        )?;
        let class = class.ok_or_else(|| WorkflowError::not_found(NO_CLASS))?;

        Guards::on(&class)
            .require(status_is(ClassStatus::Open), class_is)
            .forbid(
                |c| c.has_student(username),
                |_| WorkflowError::duplicate("You have already registered for this class"),
            )
            .forbid(
                |c| {
                    held.iter()
                        .any(|h| h.subject_id == c.subject_id && h.class_id != c.class_id)
                },
                |_| WorkflowError::duplicate("You have already registered for a class of this subject"),
            )
            .pass()?;

        let receipt = self
            .commit(invoke::REGISTER_CLASS, &[username, class_id])
            .await?;
        Ok(Committed::new(receipt))
    }

    #[tracing::instrument(skip(self))]
    pub async fn cancel_class(&self, class_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        let username = self.caller.username.as_str();

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        Guards::on(&class)
            .require(
                |c| c.has_student(username),
                |_| WorkflowError::state("You have not registered for this class"),
            )
            .require(status_is(ClassStatus::Open), class_is)
            .pass()?;

        let receipt = self
            .commit(invoke::CANCEL_CLASS, &[username, class_id])
            .await?;
        Ok(Committed::new(receipt))
    }
}
