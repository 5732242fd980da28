use crate::data::{Class, ClassInfo, ClassInput, Score, Student, Subject};
use crate::error::WorkflowError;
use crate::gate;
use crate::guard::Guards;
use crate::ledger::{invoke, query};
use crate::role::Role;
use crate::status::ClassStatus;
use crate::util::new_id;
use crate::view::{self, ClassStudent, ClassView};

use super::{Committed, Workflow};

pub(crate) const NO_CLASS: &str = "Class does not exist";
const NO_SUBJECT: &str = "Subject does not exist";
const NO_TEACHER: &str = "There is no teacher assigned to this class";

pub(crate) fn status_is(
    expected: ClassStatus,
) -> impl FnOnce(&Class) -> bool {
    move |c| c.status == expected
}

pub(crate) fn class_is(c: &Class) -> WorkflowError {
    WorkflowError::state(format!("Class is {}", c.status))
}

fn short_span() -> WorkflowError {
    WorkflowError::state("Start date must occur before end date by at least one week")
}

impl Workflow<'_> {
    #[tracing::instrument(skip(self))]
    pub async fn get_class(&self, class_id: &str) -> Result<ClassView, WorkflowError> {
        self.authorize(gate::ANY)?;
        let ctx = self.connect().await?;

        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;
        let subject: Option<Subject> = self
            .fetch(&ctx, query::GET_SUBJECT, &[class.subject_id.as_str()])
            .await?;

        let view = ClassView {
            subject_name: subject.map(|s| s.subject_name),
            ..ClassView::from(class)
        };
        Ok(if self.caller.role == Role::Student {
            view.without_students()
        } else {
            view
        })
    }

    #[tracing::instrument(skip(self))]
    pub async fn students_of_class(&self, class_id: &str) -> Result<Vec<ClassStudent>, WorkflowError> {
        self.authorize(gate::NON_STUDENT)?;
        let ctx = self.connect().await?;

        let args = [class_id];
        let (class, students, scores) = tokio::try_join!(
            self.fetch::<Class>(&ctx, query::GET_CLASS, &args),
            self.fetch_list::<Student>(&ctx, query::GET_STUDENTS_OF_CLASS, &args),
            self.fetch_list::<Score>(&ctx, query::GET_SCORES_OF_CLASS, &args),
        )?;
        let class = class.ok_or_else(|| WorkflowError::not_found(NO_CLASS))?;

        Ok(view::class_students(students, &scores, &class))
    }

    #[tracing::instrument(skip(self))]
    pub async fn classes_without_teacher(&self) -> Result<Vec<ClassView>, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let ctx = self.connect().await?;

        let (classes, subjects) = tokio::try_join!(
            self.fetch_list::<Class>(&ctx, query::GET_ALL_CLASSES, &[]),
            self.fetch_list::<Subject>(&ctx, query::GET_ALL_SUBJECTS, &[]),
        )?;
        let unassigned = classes.into_iter().filter(|c| !c.has_teacher()).collect();

        Ok(view::with_subject_names(unassigned, &subjects))
    }

    #[tracing::instrument(skip(self))]
    pub async fn create_class(&self, input: &ClassInput) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        input.validate()?;
        Guards::on(&input.info)
            .require(ClassInfo::spans_a_week, |_| short_span())
            .pass()?;

        let ctx = self.connect().await?;
        let _subject: Subject = self
            .fetch_existing(&ctx, query::GET_SUBJECT, &[input.subject_id.as_str()], NO_SUBJECT)
            .await?;

        let id = new_id();
        let mut args = vec![id.clone(), input.subject_id.trim().to_string()];
        args.extend(input.info.args());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        let receipt = self.commit(invoke::CREATE_CLASS, &args).await?;
        Ok(Committed::created(id, receipt))
    }

    /// Classes can be edited until they start.
    #[tracing::instrument(skip(self))]
    pub async fn update_class(
        &self,
        class_id: &str,
        info: &ClassInfo,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        info.validate()?;

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        Guards::on(&class)
            .require(status_is(ClassStatus::Open), class_is)
            .require(|_| info.spans_a_week(), |_| short_span())
            .pass()?;

        let mut args = vec![class_id.to_string()];
        args.extend(info.args());
        let args: Vec<&str> = args.iter().map(String::as_str).collect();

        Ok(Committed::new(self.commit(invoke::UPDATE_CLASS, &args).await?))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_class(&self, class_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        Guards::on(&class)
            .require(status_is(ClassStatus::Open), class_is)
            .pass()?;

        Ok(Committed::new(self.commit(invoke::DELETE_CLASS, &[class_id]).await?))
    }

    /// The teacher must be a Teacher account in the directory.
    #[tracing::instrument(skip(self))]
    pub async fn assign_teacher(
        &self,
        class_id: &str,
        teacher_username: &str,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;
        let teacher_username = teacher_username.trim().to_lowercase();
        if teacher_username.is_empty() {
            return Err(WorkflowError::invalid("teacherUsername", "must not be empty"));
        }

        let teacher = self.directory.find_by_username(&teacher_username).await?;
        if !matches!(teacher, Some(ref t) if t.is(Role::Teacher)) {
            return Err(WorkflowError::not_found("Teacher does not exist"));
        }

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        Guards::on(&class)
            .forbid(
                |c| c.is_taught_by(&teacher_username),
                |_| WorkflowError::duplicate("This teacher is already assigned to this class"),
            )
            .pass()?;

        let receipt = self
            .commit(invoke::ASSIGN_TEACHER, &[class_id, teacher_username.as_str()])
            .await?;
        Ok(Committed::new(receipt))
    }

    #[tracing::instrument(skip(self))]
    pub async fn unassign_teacher(&self, class_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        Guards::on(&class)
            .require(Class::has_teacher, |_| WorkflowError::state(NO_TEACHER))
            .pass()?;

        Ok(Committed::new(self.commit(invoke::UNASSIGN_TEACHER, &[class_id]).await?))
    }

    /// `Open -> InProgress`, only with a teacher assigned.
    #[tracing::instrument(skip(self))]
    pub async fn start_class(&self, class_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::ADMIN_ACADEMY)?;

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        Guards::on(&class)
            .require(status_is(ClassStatus::Open), class_is)
            .require(Class::has_teacher, |_| WorkflowError::state(NO_TEACHER))
            .pass()?;

        Ok(Committed::new(self.commit(invoke::START_CLASS, &[class_id]).await?))
    }

    /// `InProgress -> Completed`, by an admin or the class's own teacher.
    #[tracing::instrument(skip(self))]
    pub async fn complete_class(&self, class_id: &str) -> Result<Committed, WorkflowError> {
        self.authorize(gate::STAFF)?;

        let ctx = self.connect().await?;
        let class: Class = self
            .fetch_existing(&ctx, query::GET_CLASS, &[class_id], NO_CLASS)
            .await?;

        let caller = self.caller;
        Guards::on(&class)
            .require(
                |c| caller.role != Role::Teacher || c.is_taught_by(&caller.username),
                |_| WorkflowError::Denied,
            )
            .require(status_is(ClassStatus::InProgress), class_is)
            .pass()?;

        Ok(Committed::new(self.commit(invoke::COMPLETE_CLASS, &[class_id]).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::*;
    use crate::data::class::MIN_CLASS_SPAN_MS;
    use crate::error::ConflictKind;
    use crate::ledger::mock::ScriptedLedger;

    fn input(span_ms: i64) -> ClassInput {
        let start = 1_600_000_000_000i64;
        ClassInput {
            subject_id: "s1".into(),
            info: ClassInfo {
                class_code: "CL01".into(),
                room: "A1".into(),
                time: "7:30".into(),
                start_date: start.to_string(),
                end_date: (start + span_ms).to_string(),
                repeat: "weekly".into(),
                capacity: 30,
            },
        }
    }

    #[rocket::async_test]
    async fn classes_shorter_than_a_week_are_rejected() {
        for span in [0, MIN_CLASS_SPAN_MS - 1, -MIN_CLASS_SPAN_MS] {
            let ledger = ScriptedLedger::new().on(query::GET_SUBJECT, subject("s1", &[], &[]));
            let directory = directory();
            let caller = admin();

            let err = Workflow::new(&ledger, &directory, &caller)
                .create_class(&input(span))
                .await
                .unwrap_err();

            assert_eq!(err.conflict_kind(), Some(ConflictKind::State));
            assert!(ledger.calls().is_empty());
        }
    }

    #[rocket::async_test]
    async fn week_long_classes_are_created() {
        let ledger = ScriptedLedger::new().on(query::GET_SUBJECT, subject("s1", &[], &[]));
        let directory = directory();
        let caller = admin();

        let committed = Workflow::new(&ledger, &directory, &caller)
            .create_class(&input(MIN_CLASS_SPAN_MS))
            .await
            .unwrap();

        let args = ledger.invoked(invoke::CREATE_CLASS).unwrap();
        assert_eq!(committed.id.as_deref(), Some(args[0].as_str()));
        assert_eq!(args[1], "s1");
        assert_eq!(args.len(), 9);
        assert_fresh_commits(&ledger);
    }

    #[rocket::async_test]
    async fn start_requires_open_status() {
        for status in ["InProgress", "Completed"] {
            let ledger =
                ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", status, "gv01", &[]));
            let directory = directory();
            let caller = admin();

            let err = Workflow::new(&ledger, &directory, &caller)
                .start_class("cl1")
                .await
                .unwrap_err();

            assert_eq!(err.to_string(), format!("Class is {}", status));
            assert!(ledger.invocations().is_empty());
        }
    }

    #[rocket::async_test]
    async fn start_requires_a_teacher() {
        let ledger = ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "", &[]));
        let directory = directory();
        let caller = admin();

        let err = Workflow::new(&ledger, &directory, &caller)
            .start_class("cl1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), NO_TEACHER);
    }

    #[rocket::async_test]
    async fn open_class_with_teacher_starts() {
        let ledger =
            ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "gv01", &[]));
        let directory = directory();
        let caller = admin();

        Workflow::new(&ledger, &directory, &caller)
            .start_class("cl1")
            .await
            .unwrap();

        assert_eq!(ledger.invoked(invoke::START_CLASS), Some(vec!["cl1".to_string()]));
        assert_fresh_commits(&ledger);
    }

    #[rocket::async_test]
    async fn second_assignment_of_same_teacher_is_rejected() {
        let ledger =
            ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "gv01", &[]));
        let directory = directory();
        let caller = admin();

        let err = Workflow::new(&ledger, &directory, &caller)
            .assign_teacher("cl1", "gv01")
            .await
            .unwrap_err();

        assert_eq!(err.conflict_kind(), Some(ConflictKind::Duplicate));
        assert!(err.to_string().contains("already assigned"));
        assert!(ledger.invocations().is_empty());
    }

    #[rocket::async_test]
    async fn assigning_requires_a_teacher_account() {
        let ledger = ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "", &[]));
        let directory = directory();
        let caller = admin();

        let err = Workflow::new(&ledger, &directory, &caller)
            .assign_teacher("cl1", "st01")
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::NotFound(_)));
        assert!(ledger.calls().is_empty());
    }

    #[rocket::async_test]
    async fn another_teacher_can_be_assigned() {
        let ledger =
            ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "gv01", &[]));
        let directory = directory();
        let caller = admin();

        Workflow::new(&ledger, &directory, &caller)
            .assign_teacher("cl1", "GV02")
            .await
            .unwrap();

        assert_eq!(
            ledger.invoked(invoke::ASSIGN_TEACHER),
            Some(vec!["cl1".to_string(), "gv02".to_string()])
        );
    }

    #[rocket::async_test]
    async fn unassigning_nobody_is_rejected() {
        let ledger = ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "", &[]));
        let directory = directory();
        let caller = admin();

        let err = Workflow::new(&ledger, &directory, &caller)
            .unassign_teacher("cl1")
            .await
            .unwrap_err();

        assert_eq!(err.conflict_kind(), Some(ConflictKind::State));
    }

    #[rocket::async_test]
    async fn started_classes_cannot_be_edited_or_deleted() {
        let ledger = ScriptedLedger::new()
            .on(query::GET_CLASS, class("cl1", "s1", "InProgress", "gv01", &[]));
        let directory = directory();
        let caller = admin();
        let workflow = Workflow::new(&ledger, &directory, &caller);

        let err = workflow.delete_class("cl1").await.unwrap_err();
        assert_eq!(err.to_string(), "Class is InProgress");

        let err = workflow
            .update_class("cl1", &input(MIN_CLASS_SPAN_MS).info)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Class is InProgress");

        assert!(ledger.invocations().is_empty());
    }

    #[rocket::async_test]
    async fn only_the_own_teacher_completes_a_class() {
        let ledger = ScriptedLedger::new()
            .on(query::GET_CLASS, class("cl1", "s1", "InProgress", "gv01", &[]));
        let directory = directory();

        let caller = teacher("gv02");
        let err = Workflow::new(&ledger, &directory, &caller)
            .complete_class("cl1")
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Denied));

        let caller = teacher("gv01");
        Workflow::new(&ledger, &directory, &caller)
            .complete_class("cl1")
            .await
            .unwrap();
        assert!(ledger.invoked(invoke::COMPLETE_CLASS).is_some());
        assert_fresh_commits(&ledger);
    }

    #[rocket::async_test]
    async fn open_classes_cannot_be_completed() {
        let ledger =
            ScriptedLedger::new().on(query::GET_CLASS, class("cl1", "s1", "Open", "gv01", &[]));
        let directory = directory();
        let caller = admin();

        let err = Workflow::new(&ledger, &directory, &caller)
            .complete_class("cl1")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "Class is Open");
    }

    #[rocket::async_test]
    async fn unassigned_classes_are_listed_with_subject_names() {
        let ledger = ScriptedLedger::new()
            .on(
                query::GET_ALL_CLASSES,
                serde_json::json!([
                    class("cl1", "s1", "Open", "", &[]),
                    class("cl2", "s1", "Open", "gv01", &[])
                ]),
            )
            .on(query::GET_ALL_SUBJECTS, serde_json::json!([subject("s1", &[], &[])]));
        let directory = directory();
        let caller = admin();

        let classes = Workflow::new(&ledger, &directory, &caller)
            .classes_without_teacher()
            .await
            .unwrap();

        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].class_id, "cl1");
        assert_eq!(classes[0].subject_name.as_deref(), Some("Subject s1"));
    }
}
