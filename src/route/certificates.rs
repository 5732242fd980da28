use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::{CertificateInput, PublicCertificate};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::workflow::{self, Committed};

/// Issue the calling student's certificate for a course
#[utoipa::path(
    request_body = CertificateInput,
    responses(
        (status = 201, description = "Certificate issued", body = Committed),
        (status = 400, description = "Course has no subject or wasn't studied", body = Problem),
        (status = 409, description = "Certificate already exists", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/certificates", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn certificate_create(
    input: Json<CertificateInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<(Status, Json<Committed>), Problem> {
    let committed = services
        .workflow(&auth.user)
        .create_certificate(&input)
        .await?;
    Ok((Status::Created, Json(committed)))
}

/// Verify a certificate. Needs no token.
#[utoipa::path(
    params(("id", description = "certificate ID")),
    responses(
        (status = 200, description = "Public certificate fields", body = PublicCertificate),
        (status = 404, description = "Certificate doesn't exist", body = Problem),
    )
)]
#[get("/certificates/<id>")]
#[tracing::instrument(skip(services))]
pub async fn certificate_get(
    id: &str,
    services: &State<Services>,
) -> Result<Json<PublicCertificate>, Problem> {
    let certificate =
        workflow::certificate::public_certificate(services.ledger.as_ref(), &services.public_reader, id)
            .await?;
    Ok(Json(certificate))
}

#[cfg(test)]
mod certificate_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::ledger::mock::ScriptedLedger;
    use crate::ledger::query;
    use crate::route::testing::{auth, client};
    use crate::workflow::fixtures::*;

    #[rocket::async_test]
    async fn v1_certificate_lookup_is_public() {
        let (client, ledger) = client(
            ScriptedLedger::new()
                .on(query::GET_CERTIFICATE, certificate("cert1", "c1", "st01"))
                .on(query::GET_COURSE, course("c1", "Open", &["s1"], &["st01"]))
                .on(query::GET_STUDENT, student_record("st01", &["c1"])),
        )
        .await;

        let response = client.get("/api/v1/certificates/cert1").dispatch().await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(
            body,
            json!({
                "CertificateID": "cert1",
                "CourseID": "c1",
                "CourseName": "Course c1",
                "StudentUsername": "st01",
                "Fullname": "Student st01",
                "IssueDate": "2020-01-09"
            })
        );
        assert_eq!(ledger.connections()[0].username, "adminstudent");
    }

    #[rocket::async_test]
    async fn v1_certificate_for_an_empty_course_is_rejected() {
        let (client, ledger) = client(
            ScriptedLedger::new().on(query::GET_COURSE, course("c1", "Open", &[], &["st01"])),
        )
        .await;

        let response = client
            .post("/api/v1/certificates")
            .header(ContentType::JSON)
            .header(auth(student("st01")))
            .body(json!({ "courseId": "c1" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
        let body: Value = response.into_json().await.expect("invalid response json");
        assert!(body["title"].as_str().unwrap_or_default().contains("no subject"));
        assert!(ledger.invocations().is_empty());
    }
}
