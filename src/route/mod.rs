use std::collections::BTreeMap;
use std::sync::Arc;

use rocket::{Build, Rocket, Route};

pub mod certificates;
pub mod classes;
pub mod courses;
pub mod me;
pub mod scores;
pub mod students;
pub mod subjects;
pub mod teachers;

use certificates::*;
use classes::*;
use courses::*;
use me::*;
use scores::*;
use students::*;
use subjects::*;
use teachers::*;

use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    data::{
        Certificate, CertificateInput, Class, ClassInfo, ClassInput, ClassScoreInput, Course,
        CourseInput, Info, PublicCertificate, Score, ScoreInput, Student, Subject, SubjectInput,
        Teacher, TeacherInput,
    },
    data::user::UserDirectory,
    gate::Caller,
    ledger::Ledger,
    resp::{jwt::doc::JWTAuth, problem::Problem},
    role::Role,
    status::{CertificateStatus, ClassStatus, CourseStatus, Progress, RegistrationStatus},
    view::{
        ClassStudent, ClassView, CourseDetail, CourseProgress, StudentCertification, StudentScore,
        SubjectRegistration,
    },
    workflow::{me::Profile, CertificationHook, Committed, Workflow},
};

/// Collaborators shared by every request.
pub struct Services {
    pub ledger: Arc<dyn Ledger>,
    pub directory: Arc<dyn UserDirectory>,
    pub hook: Option<Arc<dyn CertificationHook>>,
    /// AdminStudent wallet identity public certificate lookups read with.
    pub public_reader: String,
}

impl Services {
    pub fn workflow<'a>(&'a self, caller: &'a Caller) -> Workflow<'a> {
        Workflow::new(self.ledger.as_ref(), self.directory.as_ref(), caller)
            .with_hook(self.hook.as_deref())
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        course_list,
        course_get,
        course_create,
        course_update,
        course_delete,
        course_open,
        course_close,
        course_add_subject,
        course_remove_subject,
        course_students,
        course_enroll,
        subject_list,
        subject_get,
        subject_create,
        subject_update,
        subject_delete,
        subject_classes,
        subject_students,
        subject_certificates,
        class_create,
        class_get,
        class_update,
        class_delete,
        class_assign_teacher,
        class_unassign_teacher,
        class_start,
        class_complete,
        class_enroll,
        class_unenroll,
        class_students,
        class_without_teacher,
        class_score,
        score_create,
        teacher_list,
        teacher_create,
        teacher_get,
        teacher_classes,
        student_list,
        student_get,
        student_courses,
        student_classes,
        student_scores,
        student_certificates,
        certificate_create,
        certificate_get,
        me_profile,
        me_subjects,
        me_courses,
        me_classes,
        me_scores,
        me_certificates
    ),
    components(schemas(
        Role,
        CourseStatus,
        ClassStatus,
        RegistrationStatus,
        CertificateStatus,
        Progress,
        Course,
        CourseInput,
        CourseDetail,
        CourseProgress,
        Subject,
        SubjectInput,
        SubjectRegistration,
        Class,
        ClassInfo,
        ClassInput,
        ClassView,
        ClassStudent,
        ClassScoreInput,
        Info,
        Student,
        StudentScore,
        StudentCertification,
        Teacher,
        TeacherInput,
        Score,
        ScoreInput,
        Certificate,
        CertificateInput,
        PublicCertificate,
        Profile,
        Committed,
        SubjectRef,
        CourseRef,
        ClassRef,
        TeacherRef,
        Problem
    )),
    modifiers(&JWTAuth, &V1_PREFIX)
)]
pub struct ApiDocV1;

pub struct PathPrefix(pub &'static str);
static V1_PREFIX: PathPrefix = PathPrefix("/api/v1");

impl utoipa::Modify for PathPrefix {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let mut new_paths = BTreeMap::new();

        for (path, item) in std::mem::take(&mut openapi.paths.paths) {
            new_paths.insert(self.0.to_string() + path.as_ref(), item);
        }

        openapi.paths.paths = new_paths;
    }
}

pub fn api_v1() -> Vec<Route> {
    routes![
        course_list,
        course_get,
        course_create,
        course_update,
        course_delete,
        course_open,
        course_close,
        course_add_subject,
        course_remove_subject,
        course_students,
        course_enroll,
        subject_list,
        subject_get,
        subject_create,
        subject_update,
        subject_delete,
        subject_classes,
        subject_students,
        subject_certificates,
        class_create,
        class_get,
        class_update,
        class_delete,
        class_assign_teacher,
        class_unassign_teacher,
        class_start,
        class_complete,
        class_enroll,
        class_unenroll,
        class_students,
        class_without_teacher,
        class_score,
        score_create,
        teacher_list,
        teacher_create,
        teacher_get,
        teacher_classes,
        student_list,
        student_get,
        student_courses,
        student_classes,
        student_scores,
        student_certificates,
        certificate_create,
        certificate_get,
        me_profile,
        me_subjects,
        me_courses,
        me_classes,
        me_scores,
        me_certificates
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket.mount("/api/v1", api_v1()).mount(
        "/",
        SwaggerUi::new("/swagger/<_..>").url("/api/v1/openapi.json", ApiDocV1::openapi()),
    )
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use rocket::http::Header;
    use rocket::local::asynchronous::Client;

    use super::Services;
    use crate::config::Config;
    use crate::gate::Caller;
    use crate::ledger::mock::ScriptedLedger;
    use crate::workflow::fixtures;

    pub const SECRET: &str = "route-test-secret";

    /// Client over a scripted ledger; the ledger stays inspectable.
    pub async fn client(ledger: ScriptedLedger) -> (Client, Arc<ScriptedLedger>) {
        let ledger = Arc::new(ledger);
        let mut config = Config::default();
        config.jwt_secret = SECRET.to_string();
        let services = Services {
            ledger: ledger.clone(),
            directory: Arc::new(fixtures::directory()),
            hook: None,
            public_reader: config.public_reader.clone(),
        };

        let rocket = crate::build(config, services).expect("invalid backend");
        let client = Client::tracked(rocket).await.expect("invalid backend");
        (client, ledger)
    }

    pub fn auth(caller: Caller) -> Header<'static> {
        crate::resp::jwt::bearer(caller, SECRET)
    }
}
