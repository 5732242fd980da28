use crate::data::{Course, CourseInput, Student, Subject};
use crate::error::WorkflowError;
use crate::gate;
use crate::guard::Guards;
use crate::ledger::{invoke, query};
use crate::status::CourseStatus;
use crate::util::new_id;
use crate::view::CourseDetail;

use super::{Committed, Workflow};

const NO_COURSE: &str = "Course does not exist";
const NO_SUBJECT: &str = "Subject does not exist";

impl Workflow<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn list_courses(&self) -> Result<Vec<Course>, WorkflowError> {
        self.authorize(gate::ANY)?;
        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_ALL_COURSES, &[]).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_course(&self, course_id: &str) -> Result<CourseDetail, WorkflowError> {
        self.authorize(gate::ANY)?;
        let ctx = self.connect().await?;

        let args = [course_id];
        let (course, subjects) = tokio::try_join!(
            self.fetch::<Course>(&ctx, query::GET_COURSE, &args),
            self.fetch_list::<Subject>(&ctx, query::GET_SUBJECTS_OF_COURSE, &args),
        )?;
        let course = course.ok_or_else(|| WorkflowError::not_found(NO_COURSE))?;

        Ok(CourseDetail { course, subjects })
    }

    #[tracing::instrument(skip(self))]
    pub async fn students_of_course(&self, course_id: &str) -> Result<Vec<Student>, WorkflowError> {
        self.authorize(gate::STAFF)?;
        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_STUDENTS_OF_COURSE, &[course_id])
            .await
    }

    /// Creates the course and returns the refreshed course list.
    #[tracing::instrument(skip(self))]
    pub async fn create_course(&self, input: &CourseInput) -> Result<Vec<Course>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        input.validate()?;

        let id = new_id();
        let [code, name, short, description] = input.args();
        self.commit(invoke::CREATE_COURSE, &[id.as_str(), code, name, short, description])
            .await?;

        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_ALL_COURSES, &[]).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn update_course(
        &self,
        course_id: &str,
        input: &CourseInput,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        input.validate()?;

        let ctx = self.connect().await?;
        let course: Course = self
            .fetch_existing(&ctx, query::GET_COURSE, &[course_id], NO_COURSE)
            .await?;

        Guards::on(&course)
            .require(|c| c.differs_from(input), |_| WorkflowError::no_changes())
            .pass()?;

        let [code, name, short, description] = input.args();
        let receipt = self
            .commit(invoke::UPDATE_COURSE, &[course_id, code, name, short, description])
            .await?;
        Ok(Committed::new(receipt))
    }

    /// Deletes a course nobody is enrolled in and returns the refreshed list.
    #[tracing::instrument(skip(self))]
    pub async fn delete_course(&self, course_id: &str) -> Result<Vec<Course>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let course: Course = self
            .fetch_existing(&ctx, query::GET_COURSE, &[course_id], NO_COURSE)
            .await?;

        Guards::on(&course)
            .require(
                |c| c.students.is_empty(),
                |_| WorkflowError::state("Can not delete a course students are enrolled in"),
            )
            .pass()?;

        self.commit(invoke::DELETE_COURSE, &[course_id]).await?;

        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_ALL_COURSES, &[]).await
    }

    pub async fn open_course(&self, course_id: &str) -> Result<Committed, WorkflowError> {
        self.set_course_status(course_id, CourseStatus::Open).await
    }

    pub async fn close_course(&self, course_id: &str) -> Result<Committed, WorkflowError> {
        self.set_course_status(course_id, CourseStatus::Closed).await
    }

    #[tracing::instrument(skip(self))]
    async fn set_course_status(
        &self,
        course_id: &str,
        target: CourseStatus,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let course: Course = self
            .fetch_existing(&ctx, query::GET_COURSE, &[course_id], NO_COURSE)
            .await?;

        Guards::on(&course)
            .forbid(
                |c| c.status == target,
                |c| WorkflowError::unchanged(format!("Course is already {}", c.status)),
            )
            .pass()?;

        let func = match target {
            CourseStatus::Open => invoke::OPEN_COURSE,
            CourseStatus::Closed => invoke::CLOSE_COURSE,
        };
        Ok(Committed::new(self.commit(func, &[course_id]).await?))
    }

    #[tracing::instrument(skip(self))]
    pub async fn add_subject_to_course(
        &self,
        course_id: &str,
        subject_id: &str,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let (course_args, subject_args) = ([course_id], [subject_id]);
        let (course, subject) = tokio::try_join!(
            self.fetch::<Course>(&ctx, query::GET_COURSE, &course_args),
            self.fetch::<Subject>(&ctx, query::GET_SUBJECT, &subject_args),
        )?;
        let course = course.ok_or_else(|| WorkflowError::not_found(NO_COURSE))?;

        Guards::on(&(course, subject))
            .forbid(
                |(c, _)| c.status == CourseStatus::Closed,
                |(c, _)| WorkflowError::state(format!("Course is {}", c.status)),
            )
            .require(
                |(_, s)| s.is_some(),
                |_| WorkflowError::not_found(NO_SUBJECT),
            )
            .forbid(
                |(c, _)| c.has_subject(subject_id),
                |_| WorkflowError::duplicate("Subject already exists in this course"),
            )
            .pass()?;

        let receipt = self
            .commit(invoke::ADD_SUBJECT_TO_COURSE, &[course_id, subject_id])
            .await?;
        Ok(Committed::new(receipt))
    }

    #[tracing::instrument(skip(self))]
    pub async fn remove_subject_from_course(
        &self,
        course_id: &str,
        subject_id: &str,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let course: Course = self
            .fetch_existing(&ctx, query::GET_COURSE, &[course_id], NO_COURSE)
            .await?;

        Guards::on(&course)
            .forbid(
                |c| c.status == CourseStatus::Closed,
                |c| WorkflowError::state(format!("Course is {}", c.status)),
            )
            .require(
                |c| c.has_subject(subject_id),
                |_| WorkflowError::state("Subject does not exist in this course"),
            )
            .pass()?;

        let receipt = self
            .commit(invoke::REMOVE_SUBJECT_FROM_COURSE, &[course_id, subject_id])
            .await?;
        Ok(Committed::new(receipt))
    }
}
