use chrono::Utc;

use crate::data::certificate::issue_date;
use crate::data::{Certificate, CertificateInput, Course, PublicCertificate, Student};
use crate::error::WorkflowError;
use crate::gate;
use crate::guard::Guards;
use crate::ledger::{invoke, query, Identity, Ledger};
use crate::role::Role;
use crate::util::new_id;
use crate::view;

use super::{fetch, Committed, Workflow};

const NO_CERTIFICATE: &str = "Certificate does not exist";

impl Workflow<'_> {
    /// Issues the caller's certificate for a course they studied.
    #[tracing::instrument(skip(self))]
    pub async fn create_certificate(
        &self,
        input: &CertificateInput,
    ) -> Result<Committed, WorkflowError> {
        self.authorize(gate::STUDENT)?;
        input.validate()?;
        let username = self.caller.username.as_str();
        let course_id = input.course_id.trim();

        let ctx = self.connect().await?;
        let (course_args, student_args) = ([course_id], [username]);
        let (course, held) = tokio::try_join!(
            self.fetch::<Course>(&ctx, query::GET_COURSE, &course_args),
            self.fetch_list::<Certificate>(&ctx, query::GET_CERTIFICATES_OF_STUDENT, &student_args),
        )?;
        let course = course.ok_or_else(|| WorkflowError::not_found("Course does not exist"))?;

        Guards::on(&course)
            .forbid(
                |c| c.subjects.is_empty(),
                |_| WorkflowError::state("This course has no subject"),
            )
            .forbid(
                |c| held.iter().any(|h| h.course_id == c.course_id),
                |_| WorkflowError::duplicate("Certificate already exists"),
            )
            .require(
                |c| c.has_student(username),
                |_| WorkflowError::state("You have not studied this course yet"),
            )
            .pass()?;

        let certificate = Certificate {
            certificate_id: new_id(),
            course_id: course_id.to_string(),
            student_username: username.to_string(),
            issue_date: issue_date(Utc::now().date_naive()),
        };
        let receipt = self
            .commit(
                invoke::CREATE_CERTIFICATE,
                &[
                    certificate.certificate_id.as_str(),
                    certificate.course_id.as_str(),
                    certificate.student_username.as_str(),
                    certificate.issue_date.as_str(),
                ],
            )
            .await?;

        if let Some(hook) = self.hook {
            hook.certificate_issued(self.ledger, &certificate).await?;
        }

        Ok(Committed::created(certificate.certificate_id, receipt))
    }
}

/// Public certificate lookup. Reads with the `reader` AdminStudent wallet
/// identity instead of any caller's, and returns only the public projection.
#[tracing::instrument(skip(ledger))]
pub async fn public_certificate(
    ledger: &dyn Ledger,
    reader: &str,
    certificate_id: &str,
) -> Result<PublicCertificate, WorkflowError> {
    let ctx = ledger
        .connect(&Identity::new(reader, Role::AdminStudent))
        .await?;

    let certificate: Certificate = fetch(ledger, &ctx, query::GET_CERTIFICATE, &[certificate_id])
        .await?
        .ok_or_else(|| WorkflowError::not_found(NO_CERTIFICATE))?;

    let (course_args, student_args) = (
        [certificate.course_id.as_str()],
        [certificate.student_username.as_str()],
    );
    let (course, student) = tokio::try_join!(
        fetch::<Course>(ledger, &ctx, query::GET_COURSE, &course_args),
        fetch::<Student>(ledger, &ctx, query::GET_STUDENT, &student_args),
    )?;

    Ok(view::public_certificate(
        certificate,
        course.as_ref(),
        student.as_ref(),
    ))
}
