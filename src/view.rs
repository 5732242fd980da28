//! Response composites joined from already fetched snapshots.
//!
//! Every join here is a linear scan of one list per element of another. No
//! function in this module talks to the ledger.

use serde::Serialize;
use utoipa::ToSchema;

use crate::data::{Certificate, Class, Course, PublicCertificate, Score, Student, Subject};
use crate::status::{CertificateStatus, ClassStatus, Progress, RegistrationStatus};

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CourseDetail {
    #[serde(flatten)]
    pub course: Course,
    #[serde(rename = "SubjectsInfo")]
    pub subjects: Vec<Subject>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SubjectRegistration {
    #[serde(flatten)]
    pub subject: Subject,
    #[serde(rename = "statusConfirm")]
    pub status_confirm: RegistrationStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StudentScore {
    #[serde(flatten)]
    pub student: Student,
    #[serde(rename = "ScoreValue")]
    pub score_value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct StudentCertification {
    #[serde(flatten)]
    pub student: Student,
    #[serde(rename = "statusCertificate")]
    pub status_certificate: CertificateStatus,
    #[serde(rename = "certificateId", skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct ClassStudent {
    #[serde(flatten)]
    pub student: Student,
    #[serde(rename = "Score")]
    pub score: Option<f64>,
    #[serde(rename = "StatusClass")]
    pub status_class: ClassStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CourseProgress {
    #[serde(flatten)]
    pub course: Course,
    #[serde(rename = "Progressing")]
    pub progressing: Progress,
    #[serde(rename = "getCert")]
    pub get_cert: bool,
}

/// Class as listed to callers; membership is withheld from students.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ClassView {
    #[serde(rename = "ClassID")]
    pub class_id: String,
    #[serde(rename = "SubjectID")]
    pub subject_id: String,
    pub class_code: String,
    pub room: String,
    pub time: String,
    pub status: ClassStatus,
    pub start_date: String,
    pub end_date: String,
    pub repeat: String,
    pub capacity: u64,
    pub teacher_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub students: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name: Option<String>,
}

impl From<Class> for ClassView {
    fn from(class: Class) -> Self {
        ClassView {
            class_id: class.class_id,
            subject_id: class.subject_id,
            class_code: class.class_code,
            room: class.room,
            time: class.time,
            status: class.status,
            start_date: class.start_date,
            end_date: class.end_date,
            repeat: class.repeat,
            capacity: class.capacity,
            teacher_username: class.teacher_username,
            students: Some(class.students),
            subject_name: None,
        }
    }
}

impl ClassView {
    pub fn without_students(mut self) -> Self {
        self.students = None;
        self
    }
}

fn holds_certificate(certificates: &[Certificate], username: &str, course_id: &str) -> bool {
    certificates
        .iter()
        .any(|c| c.student_username == username && c.course_id == course_id)
}

/// Registration state of every subject for `username`. A subject counts as
/// certificated once the student holds a certificate for a course that
/// contains it.
pub fn subjects_with_registration(
    subjects: Vec<Subject>,
    courses: &[Course],
    certificates: &[Certificate],
    username: &str,
) -> Vec<SubjectRegistration> {
    subjects
        .into_iter()
        .map(|subject| {
            let certificated = courses.iter().any(|course| {
                course.has_subject(&subject.subject_id)
                    && holds_certificate(certificates, username, &course.course_id)
            });
            let status_confirm = if certificated {
                RegistrationStatus::Certificated
            } else if subject.has_student(username) {
                RegistrationStatus::Registered
            } else {
                RegistrationStatus::Unregistered
            };
            SubjectRegistration {
                subject,
                status_confirm,
            }
        })
        .collect()
}

fn score_of(scores: &[Score], username: &str) -> Option<f64> {
    scores
        .iter()
        .find(|s| s.student_username == username)
        .map(|s| s.score_value)
}

pub fn students_with_scores(students: Vec<Student>, scores: &[Score]) -> Vec<StudentScore> {
    students
        .into_iter()
        .map(|student| StudentScore {
            score_value: score_of(scores, &student.username),
            student,
        })
        .collect()
}

/// Status follows the student's score record; `certificateId` is attached only
/// once that score is certificated.
pub fn certification_status(
    students: Vec<Student>,
    scores: &[Score],
    certificates: &[Certificate],
) -> Vec<StudentCertification> {
    students
        .into_iter()
        .map(|student| {
            let score = scores.iter().find(|s| s.student_username == student.username);
            let (status_certificate, certificate_id) = match score {
                None => (CertificateStatus::NoScore, None),
                Some(s) if !s.certificated => (CertificateStatus::NoCert, None),
                Some(_) => (
                    CertificateStatus::Certificated,
                    certificates
                        .iter()
                        .find(|c| c.student_username == student.username)
                        .map(|c| c.certificate_id.clone()),
                ),
            };
            StudentCertification {
                certificate_id,
                status_certificate,
                student,
            }
        })
        .collect()
}

pub fn class_students(students: Vec<Student>, scores: &[Score], class: &Class) -> Vec<ClassStudent> {
    students
        .into_iter()
        .map(|student| ClassStudent {
            score: score_of(scores, &student.username),
            status_class: class.status,
            student,
        })
        .collect()
}

pub fn with_subject_names(classes: Vec<Class>, subjects: &[Subject]) -> Vec<ClassView> {
    classes
        .into_iter()
        .map(|class| {
            let subject_name = subjects
                .iter()
                .find(|s| s.subject_id == class.subject_id)
                .map(|s| s.subject_name.clone());
            ClassView {
                subject_name,
                ..ClassView::from(class)
            }
        })
        .collect()
}

/// Progress flags of `courses` for `username`. A course is completed once a
/// certificate for it exists; a certificate can be requested by an enrolled
/// student not yet certified, for a course with at least one subject.
pub fn courses_with_progress(
    courses: Vec<Course>,
    certificates: &[Certificate],
    username: &str,
) -> Vec<CourseProgress> {
    courses
        .into_iter()
        .map(|course| {
            let certified = holds_certificate(certificates, username, &course.course_id);
            CourseProgress {
                progressing: if certified {
                    Progress::Completed
                } else {
                    Progress::Learning
                },
                get_cert: !certified
                    && course.has_student(username)
                    && !course.subjects.is_empty(),
                course,
            }
        })
        .collect()
}

/// Only the fields a verifier needs; missing joins leave names empty.
pub fn public_certificate(
    certificate: Certificate,
    course: Option<&Course>,
    student: Option<&Student>,
) -> PublicCertificate {
    PublicCertificate {
        course_name: course.map(|c| c.course_name.clone()).unwrap_or_default(),
        fullname: student.map(|s| s.fullname.clone()).unwrap_or_default(),
        certificate_id: certificate.certificate_id,
        course_id: certificate.course_id,
        student_username: certificate.student_username,
        issue_date: certificate.issue_date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn subject(id: &str, students: &[&str]) -> Subject {
        Subject {
            subject_id: id.into(),
            subject_name: format!("Subject {}", id),
            students: students.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn course(id: &str, subjects: &[&str], students: &[&str]) -> Course {
        Course {
            course_id: id.into(),
            course_name: format!("Course {}", id),
            subjects: subjects.iter().map(|s| s.to_string()).collect(),
            students: students.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn student(username: &str) -> Student {
        Student {
            username: username.into(),
            fullname: format!("Student {}", username),
            ..Default::default()
        }
    }

    fn certificate(id: &str, course_id: &str, username: &str) -> Certificate {
        Certificate {
            certificate_id: id.into(),
            course_id: course_id.into(),
            student_username: username.into(),
            issue_date: "2020-01-09".into(),
        }
    }

    fn score(username: &str, value: f64) -> Score {
        Score {
            subject_id: "s1".into(),
            student_username: username.into(),
            score_value: value,
            certificated: false,
        }
    }

    fn certificated_score(username: &str, value: f64) -> Score {
        Score {
            certificated: true,
            ..score(username, value)
        }
    }

    #[test]
    fn registration_status_prefers_certification() {
        let subjects = vec![subject("s1", &["st01"]), subject("s2", &["st01"]), subject("s3", &[])];
        let courses = vec![course("c1", &["s1"], &["st01"])];
        let certificates = vec![certificate("cert1", "c1", "st01")];

        let statuses: Vec<_> = subjects_with_registration(subjects, &courses, &certificates, "st01")
            .into_iter()
            .map(|s| s.status_confirm)
            .collect();

        assert_eq!(
            statuses,
            vec![
                RegistrationStatus::Certificated,
                RegistrationStatus::Registered,
                RegistrationStatus::Unregistered
            ]
        );
    }

    #[test]
    fn missing_scores_join_as_null() {
        let joined = students_with_scores(vec![student("st01"), student("st02")], &[score("st02", 7.0)]);
        assert_eq!(joined[0].score_value, None);
        assert_eq!(joined[1].score_value, Some(7.0));

        let encoded = serde_json::to_value(&joined[0]).unwrap();
        assert_eq!(encoded["ScoreValue"], json!(null));
        assert_eq!(encoded["Username"], json!("st01"));
    }

    #[test]
    fn certification_status_covers_all_states() {
        let joined = certification_status(
            vec![student("st01"), student("st02"), student("st03")],
            &[score("st02", 5.0), certificated_score("st03", 9.0)],
            &[certificate("cert3", "c1", "st03")],
        );

        assert_eq!(joined[0].status_certificate, CertificateStatus::NoScore);
        assert_eq!(joined[1].status_certificate, CertificateStatus::NoCert);
        assert_eq!(joined[2].status_certificate, CertificateStatus::Certificated);
        assert_eq!(joined[2].certificate_id.as_deref(), Some("cert3"));
        assert_eq!(joined[1].certificate_id, None);
    }

    #[test]
    fn certification_status_follows_the_score_flag() {
        let joined = certification_status(
            vec![student("st01"), student("st02"), student("st03")],
            &[certificated_score("st01", 8.0), score("st03", 4.0)],
            &[
                certificate("cert2", "c1", "st02"),
                certificate("cert3", "c1", "st03"),
            ],
        );

        assert_eq!(joined[0].status_certificate, CertificateStatus::Certificated);
        assert_eq!(joined[0].certificate_id, None);
        assert_eq!(joined[1].status_certificate, CertificateStatus::NoScore);
        assert_eq!(joined[1].certificate_id, None);
        assert_eq!(joined[2].status_certificate, CertificateStatus::NoCert);
        assert_eq!(joined[2].certificate_id, None);
    }

    #[test]
    fn course_progress_flags() {
        let courses = vec![
            course("done", &["s1"], &["st01"]),
            course("ready", &["s1"], &["st01"]),
            course("empty", &[], &["st01"]),
            course("other", &["s1"], &[]),
        ];
        let certificates = vec![certificate("cert1", "done", "st01")];

        let progress = courses_with_progress(courses, &certificates, "st01");
        let flags: Vec<_> = progress.iter().map(|p| (p.progressing, p.get_cert)).collect();

        assert_eq!(
            flags,
            vec![
                (Progress::Completed, false),
                (Progress::Learning, true),
                (Progress::Learning, false),
                (Progress::Learning, false),
            ]
        );
    }

    #[test]
    fn classes_carry_subject_names() {
        let class = Class {
            class_id: "cl1".into(),
            subject_id: "s2".into(),
            students: vec!["st01".into()],
            ..Default::default()
        };
        let views = with_subject_names(vec![class], &[subject("s1", &[]), subject("s2", &[])]);
        assert_eq!(views[0].subject_name.as_deref(), Some("Subject s2"));

        let hidden = serde_json::to_value(views[0].clone().without_students()).unwrap();
        assert!(hidden.get("Students").is_none());
        assert_eq!(hidden["SubjectName"], json!("Subject s2"));
    }

    #[test]
    fn public_certificate_drops_everything_else() {
        let mut owner = student("st01");
        owner.info.email = "st01@example.com".into();
        owner.courses = vec!["c1".into()];

        let public = public_certificate(
            certificate("cert1", "c1", "st01"),
            Some(&course("c1", &["s1"], &["st01"])),
            Some(&owner),
        );

        let encoded = serde_json::to_value(&public).unwrap();
        let mut keys: Vec<_> = encoded.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(
            keys,
            vec![
                "CertificateID",
                "CourseID",
                "CourseName",
                "Fullname",
                "IssueDate",
                "StudentUsername"
            ]
        );
    }
}
