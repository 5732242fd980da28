use serde::Serialize;
use utoipa::ToSchema;

use crate::data::{Certificate, Class, Course, Score, Student, Subject, Teacher};
use crate::error::WorkflowError;
use crate::gate;
use crate::ledger::query;
use crate::role::Role;
use crate::view::{self, ClassView, CourseProgress, SubjectRegistration};

use super::Workflow;

/// Ledger record of the caller, or the bare account for admins who have none.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum Profile {
    Student(Student),
    Teacher(Teacher),
    Account { username: String, role: Role },
}

impl Workflow<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn profile(&self) -> Result<Profile, WorkflowError> {
        self.authorize(gate::ANY)?;
        let username = self.caller.username.as_str();

        match self.caller.role {
            Role::Student => {
                let ctx = self.connect().await?;
                self.fetch_existing(&ctx, query::GET_STUDENT, &[username], "Student does not exist")
                    .await
                    .map(Profile::Student)
            }
            Role::Teacher => {
                let ctx = self.connect().await?;
                self.fetch_existing(&ctx, query::GET_TEACHER, &[username], "Teacher does not exist")
                    .await
                    .map(Profile::Teacher)
            }
            role => Ok(Profile::Account {
                username: username.to_string(),
                role,
            }),
        }
    }

    /// Every subject, with the caller's registration state.
    #[tracing::instrument(skip(self))]
    pub async fn my_subjects(&self) -> Result<Vec<SubjectRegistration>, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        let username = self.caller.username.as_str();

        let ctx = self.connect().await?;
        let args = [username];
        let (subjects, courses, certificates) = tokio::try_join!(
            self.fetch_list::<Subject>(&ctx, query::GET_ALL_SUBJECTS, &[]),
            self.fetch_list::<Course>(&ctx, query::GET_ALL_COURSES, &[]),
            self.fetch_list::<Certificate>(&ctx, query::GET_CERTIFICATES_OF_STUDENT, &args),
        )?;
        Ok(view::subjects_with_registration(
            subjects,
            &courses,
            &certificates,
            username,
        ))
    }

    #[tracing::instrument(skip(self))]
    pub async fn my_courses(&self) -> Result<Vec<CourseProgress>, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        let username = self.caller.username.as_str();

        let ctx = self.connect().await?;
        let args = [username];
        let (courses, certificates) = tokio::try_join!(
            self.fetch_list::<Course>(&ctx, query::GET_COURSES_OF_STUDENT, &args),
            self.fetch_list::<Certificate>(&ctx, query::GET_CERTIFICATES_OF_STUDENT, &args),
        )?;
        Ok(view::courses_with_progress(courses, &certificates, username))
    }

    /// Classes the caller studies or teaches.
    #[tracing::instrument(skip(self))]
    pub async fn my_classes(&self) -> Result<Vec<ClassView>, WorkflowError> {
        self.authorize(&[Role::Student, Role::Teacher])?;
        let username = self.caller.username.as_str();

        if self.caller.role == Role::Teacher {
            return self.teaching(username).await;
        }

        let ctx = self.connect().await?;
        let args = [username];
        let (classes, subjects) = tokio::try_join!(
            self.fetch_list::<Class>(&ctx, query::GET_CLASSES_OF_STUDENT, &args),
            self.fetch_list::<Subject>(&ctx, query::GET_ALL_SUBJECTS, &[]),
        )?;
        Ok(view::with_subject_names(classes, &subjects)
            .into_iter()
            .map(ClassView::without_students)
            .collect())
    }

    #[tracing::instrument(skip(self))]
    pub async fn my_scores(&self) -> Result<Vec<Score>, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        self.student_list(query::GET_SCORES_OF_STUDENT, &self.caller.username)
            .await
    }

    #[tracing::instrument(skip(self))]
    pub async fn my_certificates(&self) -> Result<Vec<Certificate>, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        self.student_list(query::GET_CERTIFICATES_OF_STUDENT, &self.caller.username)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::ledger::mock::ScriptedLedger;
    use crate::status::{Progress, RegistrationStatus};
    use serde_json::json;

    #[rocket::async_test]
    async fn admins_get_their_account() {
        let ledger = ScriptedLedger::new();
        let directory = directory();
        let caller = admin();

        let profile = Workflow::new(&ledger, &directory, &caller)
            .profile()
            .await
            .unwrap();

        assert_eq!(
            serde_json::to_value(&profile).unwrap(),
            json!({ "username": "admin", "role": 1 })
        );
        assert!(ledger.calls().is_empty());
    }

    #[rocket::async_test]
    async fn students_get_their_record() {
        let ledger = ScriptedLedger::new().on(query::GET_STUDENT, student_record("st01", &["c1"]));
        let directory = directory();
        let caller = student("st01");

        let profile = Workflow::new(&ledger, &directory, &caller)
            .profile()
            .await
            .unwrap();

        match profile {
            Profile::Student(record) => assert_eq!(record.courses, vec!["c1".to_string()]),
            other => panic!("unexpected profile {:?}", other),
        }
        assert_eq!(ledger.queries(), vec![query::GET_STUDENT.to_string()]);
    }

    #[rocket::async_test]
    async fn my_subjects_mark_registration() {
        let ledger = ScriptedLedger::new()
            .on(
                query::GET_ALL_SUBJECTS,
                json!([subject("s1", &[], &["st01"]), subject("s2", &[], &[])]),
            )
            .on(
                query::GET_ALL_COURSES,
                json!([course("c1", "Open", &["s1"], &["st01"])]),
            );
        let directory = directory();
        let caller = student("st01");

        let subjects = Workflow::new(&ledger, &directory, &caller)
            .my_subjects()
            .await
            .unwrap();

        assert_eq!(subjects[0].status_confirm, RegistrationStatus::Registered);
        assert_eq!(subjects[1].status_confirm, RegistrationStatus::Unregistered);
    }

    #[rocket::async_test]
    async fn my_courses_report_progress() {
        let ledger = ScriptedLedger::new()
            .on(
                query::GET_COURSES_OF_STUDENT,
                json!([
                    course("c1", "Open", &["s1"], &["st01"]),
                    course("c2", "Open", &["s2"], &["st01"])
                ]),
            )
            .on(
                query::GET_CERTIFICATES_OF_STUDENT,
                json!([certificate("cert1", "c1", "st01")]),
            );
        let directory = directory();
        let caller = student("st01");

        let courses = Workflow::new(&ledger, &directory, &caller)
            .my_courses()
            .await
            .unwrap();

        assert_eq!(courses[0].progressing, Progress::Completed);
        assert!(!courses[0].get_cert);
        assert_eq!(courses[1].progressing, Progress::Learning);
        assert!(courses[1].get_cert);
    }

    #[rocket::async_test]
    async fn students_do_not_see_classmates() {
        let ledger = ScriptedLedger::new()
            .on(
                query::GET_CLASSES_OF_STUDENT,
                json!([class("cl1", "s1", "Open", "gv01", &["st01", "st02"])]),
            )
            .on(query::GET_ALL_SUBJECTS, json!([subject("s1", &["cl1"], &[])]));
        let directory = directory();
        let caller = student("st01");

        let classes = Workflow::new(&ledger, &directory, &caller)
            .my_classes()
            .await
            .unwrap();

        assert_eq!(classes[0].students, None);
        assert_eq!(classes[0].subject_name.as_deref(), Some("Subject s1"));
    }

    #[rocket::async_test]
    async fn admins_have_no_classes() {
        let ledger = ScriptedLedger::new();
        let directory = directory();
        let caller = admin();

        let err = Workflow::new(&ledger, &directory, &caller)
            .my_classes()
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Denied));
    }
}
