use crate::data::user::User;
use crate::data::{Certificate, Class, Course, Score, Student, Subject, Teacher, TeacherInput};
use crate::error::WorkflowError;
use crate::gate;
use crate::ledger::{invoke, query};
use crate::role::Role;
use crate::view::{self, ClassView};

use super::{Committed, Workflow};

impl Workflow<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn list_teachers(&self) -> Result<Vec<Teacher>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_ALL_TEACHERS, &[]).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_teacher(&self, username: &str) -> Result<Teacher, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let ctx = self.connect().await?;
        self.fetch_existing(&ctx, query::GET_TEACHER, &[username], "Teacher does not exist")
            .await
    }

    /// Teachers may only list their own classes.
    #[tracing::instrument(skip(self))]
    pub async fn classes_of_teacher(&self, username: &str) -> Result<Vec<ClassView>, WorkflowError> {
        self.authorize(gate::STAFF)?;
        if self.caller.role == Role::Teacher && self.caller.username != username {
            return Err(WorkflowError::Denied);
        }
        self.teaching(username).await
    }

    pub(super) async fn teaching(&self, username: &str) -> Result<Vec<ClassView>, WorkflowError> {
        let ctx = self.connect().await?;
        let args = [username];
        let (classes, subjects) = tokio::try_join!(
            self.fetch_list::<Class>(&ctx, query::GET_CLASSES_OF_TEACHER, &args),
            self.fetch_list::<Subject>(&ctx, query::GET_ALL_SUBJECTS, &[]),
        )?;
        Ok(view::with_subject_names(classes, &subjects))
    }

    /// Creates the teacher on the ledger, then registers the account.
    #[tracing::instrument(skip(self))]
    pub async fn create_teacher(&self, input: &TeacherInput) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        input.validate()?;

        let username = input.normalized_username();
        if self.directory.find_by_username(&username).await?.is_some() {
            return Err(WorkflowError::duplicate("Username already exists"));
        }

        let receipt = self
            .commit(
                invoke::CREATE_TEACHER,
                &[username.as_str(), input.fullname.trim()],
            )
            .await?;
        if let Err(e) = self
            .directory
            .register(&User::new(&username, Role::Teacher))
            .await
        {
            tracing::error!(
                "teacher {} committed in transaction {} but not registered: {}",
                username,
                receipt.transaction_id.as_deref().unwrap_or("<none>"),
                e
            );
            return Err(e.into());
        }

        Ok(Committed::created(username, receipt))
    }

    #[tracing::instrument(skip(self))]
    pub async fn list_students(&self) -> Result<Vec<Student>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_ALL_STUDENTS, &[]).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_student(&self, username: &str) -> Result<Student, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let ctx = self.connect().await?;
        self.fetch_existing(&ctx, query::GET_STUDENT, &[username], "Student does not exist")
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn courses_of_student(&self, username: &str) -> Result<Vec<Course>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        self.student_list(query::GET_COURSES_OF_STUDENT, username).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn classes_of_student(&self, username: &str) -> Result<Vec<Class>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        self.student_list(query::GET_CLASSES_OF_STUDENT, username).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn scores_of_student(&self, username: &str) -> Result<Vec<Score>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        self.student_list(query::GET_SCORES_OF_STUDENT, username).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn certificates_of_student(
        &self,
        username: &str,
    ) -> Result<Vec<Certificate>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        self.student_list(query::GET_CERTIFICATES_OF_STUDENT, username)
            .await
    }

    pub(super) async fn student_list<T: serde::de::DeserializeOwned>(
        &self,
        func: &str,
        username: &str,
    ) -> Result<Vec<T>, WorkflowError> {
        let ctx = self.connect().await?;
        self.fetch_list(&ctx, func, &[username]).await
    }
}
