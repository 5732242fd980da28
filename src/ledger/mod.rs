//! Ledger gateway contract.
//!
//! The ledger is only ever reached through [`Ledger::query`] and
//! [`Ledger::invoke`]. Both need a [`Context`] acquired with
//! [`Ledger::connect`] for a wallet identity. `invoke` consumes its context,
//! and callers acquire a new one right before every mutation that follows
//! reads, so the write observes the latest channel state.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::role::{Org, Role};

pub mod http;
#[cfg(test)]
pub mod mock;

pub use http::HttpLedger;

/// Query functions exposed by the academy chaincode.
pub mod query {
    pub const GET_ALL_COURSES: &str = "GetAllCourses";
    pub const GET_COURSE: &str = "GetCourse";
    pub const GET_SUBJECTS_OF_COURSE: &str = "GetSubjectsOfCourse";
    pub const GET_STUDENTS_OF_COURSE: &str = "GetStudentsOfCourse";
    pub const GET_ALL_SUBJECTS: &str = "GetAllSubjects";
    pub const GET_SUBJECT: &str = "GetSubject";
    pub const GET_CLASSES_OF_SUBJECT: &str = "GetClassesOfSubject";
    pub const GET_STUDENTS_OF_SUBJECT: &str = "GetStudentsOfSubject";
    pub const GET_SCORES_OF_SUBJECT: &str = "GetScoresOfSubject";
    pub const GET_CERTIFICATES_OF_SUBJECT: &str = "GetCertificatesOfSubject";
    pub const GET_ALL_CLASSES: &str = "GetAllClasses";
    pub const GET_CLASS: &str = "GetClass";
    pub const GET_STUDENTS_OF_CLASS: &str = "GetStudentsOfClass";
    pub const GET_SCORES_OF_CLASS: &str = "GetScoresOfClass";
    pub const GET_ALL_TEACHERS: &str = "GetAllTeachers";
    pub const GET_TEACHER: &str = "GetTeacher";
    pub const GET_CLASSES_OF_TEACHER: &str = "GetClassesOfTeacher";
    pub const GET_ALL_STUDENTS: &str = "GetAllStudents";
    pub const GET_STUDENT: &str = "GetStudent";
    pub const GET_COURSES_OF_STUDENT: &str = "GetCoursesOfStudent";
    pub const GET_CLASSES_OF_STUDENT: &str = "GetClassesOfStudent";
    pub const GET_SCORES_OF_STUDENT: &str = "GetScoresOfStudent";
    pub const GET_CERTIFICATES_OF_STUDENT: &str = "GetCertificatesOfStudent";
    pub const GET_CERTIFICATE: &str = "GetCertificate";
}

/// State transitions exposed by the academy chaincode.
pub mod invoke {
    pub const CREATE_COURSE: &str = "CreateCourse";
    pub const UPDATE_COURSE: &str = "UpdateCourseInfo";
    pub const DELETE_COURSE: &str = "DeleteCourse";
    pub const OPEN_COURSE: &str = "OpenCourse";
    pub const CLOSE_COURSE: &str = "CloseCourse";
    pub const ADD_SUBJECT_TO_COURSE: &str = "AddSubjectToCourse";
    pub const REMOVE_SUBJECT_FROM_COURSE: &str = "RemoveSubjectFromCourse";
    pub const CREATE_SUBJECT: &str = "CreateSubject";
    pub const UPDATE_SUBJECT: &str = "UpdateSubjectInfo";
    pub const DELETE_SUBJECT: &str = "DeleteSubject";
    pub const CREATE_CLASS: &str = "CreateClass";
    pub const UPDATE_CLASS: &str = "UpdateClassInfo";
    pub const DELETE_CLASS: &str = "DeleteClass";
    pub const ASSIGN_TEACHER: &str = "AssignTeacherToClass";
    pub const UNASSIGN_TEACHER: &str = "UnassignTeacherFromClass";
    pub const START_CLASS: &str = "StartClass";
    pub const COMPLETE_CLASS: &str = "CompleteClass";
    pub const REGISTER_COURSE: &str = "StudentRegisterCourse";
    pub const REGISTER_CLASS: &str = "StudentRegisterClass";
    pub const CANCEL_CLASS: &str = "StudentCancelRegisteredClass";
    pub const CREATE_SCORE: &str = "CreateScore";
    pub const CREATE_CERTIFICATE: &str = "CreateCertificate";
    pub const CREATE_TEACHER: &str = "CreateTeacher";
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("unable to acquire ledger context for '{identity}': {reason}")]
    Connect { identity: String, reason: String },
    #[error("query '{func}' failed: {reason}")]
    Query { func: String, reason: String },
    #[error("invoke '{func}' failed: {reason}")]
    Invoke { func: String, reason: String },
    #[error("unable to decode '{func}' snapshot: {source}")]
    Decode {
        func: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Wallet identity a context is acquired for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    pub username: String,
    pub org: Org,
}

impl Identity {
    pub fn new(username: impl ToString, role: Role) -> Identity {
        Identity {
            username: username.to_string(),
            org: role.org(),
        }
    }
}

impl std::fmt::Display for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.username, self.org.as_str())
    }
}

/// Connection context for one identity.
///
/// `generation` increases with every `connect` on the same gateway.
#[derive(Debug)]
pub struct Context {
    pub identity: Identity,
    pub session: String,
    pub generation: u64,
}

/// JSON returned by a query.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub func: String,
    pub value: Value,
}

impl Snapshot {
    pub fn new(func: impl ToString, value: Value) -> Snapshot {
        Snapshot {
            func: func.to_string(),
            value,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<T, LedgerError> {
        let func = self.func;
        serde_json::from_value(self.value).map_err(|source| LedgerError::Decode { func, source })
    }

    /// Chaincode returns `null` for empty collections.
    pub fn decode_list<T: DeserializeOwned>(self) -> Result<Vec<T>, LedgerError> {
        if self.is_null() {
            return Ok(vec![]);
        }
        self.decode()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(rename = "transactionId", default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub payload: Value,
}

#[rocket::async_trait]
pub trait Ledger: Send + Sync {
    async fn connect(&self, identity: &Identity) -> Result<Context, LedgerError>;

    async fn query(&self, ctx: &Context, func: &str, args: &[&str])
        -> Result<Snapshot, LedgerError>;

    async fn invoke(&self, ctx: Context, func: &str, args: &[&str])
        -> Result<Receipt, LedgerError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Named {
        #[serde(rename = "Name")]
        name: String,
    }

    #[test]
    fn null_snapshots_decode_as_empty_lists() {
        let snapshot = Snapshot::new(query::GET_ALL_COURSES, Value::Null);
        let decoded: Vec<Named> = snapshot.decode_list().unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn malformed_snapshots_report_the_function() {
        let snapshot = Snapshot::new(query::GET_COURSE, json!({"Nope": 1}));
        match snapshot.decode::<Named>() {
            Err(LedgerError::Decode { func, .. }) => assert_eq!(func, query::GET_COURSE),
            other => panic!("unexpected decode result: {:?}", other),
        }
    }
}
