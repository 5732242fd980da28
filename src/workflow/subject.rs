use crate::data::{Certificate, Class, Score, Student, Subject, SubjectInput};
use crate::error::WorkflowError;
use crate::gate;
use crate::guard::Guards;
use crate::ledger::{invoke, query};
use crate::role::Role;
use crate::util::new_id;
use crate::view::{self, ClassView, StudentCertification, StudentScore};

use super::{Committed, Workflow};

const NO_SUBJECT: &str = "Subject does not exist";

impl Workflow<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn list_subjects(&self) -> Result<Vec<Subject>, WorkflowError> {
        self.authorize(gate::ANY)?;
        let ctx = self.connect().await?;
        self.fetch_list(&ctx, query::GET_ALL_SUBJECTS, &[]).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_subject(&self, subject_id: &str) -> Result<Subject, WorkflowError> {
        self.authorize(gate::ANY)?;
        let ctx = self.connect().await?;
        self.fetch_existing(&ctx, query::GET_SUBJECT, &[subject_id], NO_SUBJECT)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_subject(&self, input: &SubjectInput) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        input.validate()?;

        let id = new_id();
        let [code, name, short, description] = input.args();
        let receipt = self
            .commit(
                invoke::CREATE_SUBJECT,
                &[id.as_str(), code, name, short, description],
            )
            .await?;
        Ok(Committed::created(id, receipt))
    }

    /// Rejects updates that would leave every field as stored.
    #[tracing::instrument(skip(self))]
    pub async fn update_subject(
        &self,
        subject_id: &str,
        input: &SubjectInput,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        input.validate()?;

        let ctx = self.connect().await?;
        let subject: Subject = self
            .fetch_existing(&ctx, query::GET_SUBJECT, &[subject_id], NO_SUBJECT)
            .await?;

        Guards::on(&subject)
            .require(|s| s.differs_from(input), |_| WorkflowError::no_changes())
            .pass()?;

        let [code, name, short, description] = input.args();
        let receipt = self
            .commit(
                invoke::UPDATE_SUBJECT,
                &[subject_id, code, name, short, description],
            )
            .await?;
        Ok(Committed::new(receipt))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_subject(&self, subject_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let subject: Subject = self
            .fetch_existing(&ctx, query::GET_SUBJECT, &[subject_id], NO_SUBJECT)
            .await?;

        Guards::on(&subject)
            .require(
                |s| s.classes.is_empty(),
                |_| WorkflowError::state("Can not delete a subject that still has classes"),
            )
            .pass()?;

        let receipt = self.commit(invoke::DELETE_SUBJECT, &[subject_id]).await?;
        Ok(Committed::new(receipt))
    }

    /// Students only see the schedule, not who else attends.
    #[tracing::instrument(skip(self))]
    pub async fn classes_of_subject(&self, subject_id: &str) -> Result<Vec<ClassView>, WorkflowError> {
        self.authorize(gate::ANY)?;
        let ctx = self.connect().await?;

        let classes: Vec<Class> = self
            .fetch_list(&ctx, query::GET_CLASSES_OF_SUBJECT, &[subject_id])
            .await?;
        let hide_students = self.caller.role == Role::Student;

        Ok(classes
            .into_iter()
            .map(ClassView::from)
            .map(|c| if hide_students { c.without_students() } else { c })
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn students_of_subject(&self, subject_id: &str) -> Result<Vec<StudentScore>, WorkflowError> {
        self.authorize(gate::STAFF)?;
        let ctx = self.connect().await?;

        let args = [subject_id];
        let (students, scores) = tokio::try_join!(
            self.fetch_list::<Student>(&ctx, query::GET_STUDENTS_OF_SUBJECT, &args),
            self.fetch_list::<Score>(&ctx, query::GET_SCORES_OF_SUBJECT, &args),
        )?;

        Ok(view::students_with_scores(students, &scores))
    }

    #[tracing::instrument(skip(self))]
    pub async fn certificates_of_subject(
        &self,
        subject_id: &str,
    ) -> Result<Vec<StudentCertification>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let ctx = self.connect().await?;

        let args = [subject_id];
        let (students, scores, certificates) = tokio::try_join!(
            self.fetch_list::<Student>(&ctx, query::GET_STUDENTS_OF_SUBJECT, &args),
            self.fetch_list::<Score>(&ctx, query::GET_SCORES_OF_SUBJECT, &args),
            self.fetch_list::<Certificate>(&ctx, query::GET_CERTIFICATES_OF_SUBJECT, &args),
        )?;

        Ok(view::certification_status(students, &scores, &certificates))
    }
}
