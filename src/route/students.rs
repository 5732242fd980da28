use rocket::serde::json::Json;
use rocket::State;

use crate::data::{Certificate, Class, Course, Score, Student};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;

/// List all students
#[utoipa::path(
    responses(
        (status = 200, description = "All students", body = Vec<Student>),
        (status = 403, description = "Caller isn't an academy admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/students")]
#[tracing::instrument(skip(services))]
pub async fn student_list(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Student>>, Problem> {
    Ok(Json(services.workflow(&auth.user).list_students().await?))
}

#[utoipa::path(
    params(("username", description = "student username")),
    responses(
        (status = 200, description = "Student", body = Student),
        (status = 404, description = "Student doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/students/<username>")]
#[tracing::instrument(skip(services))]
pub async fn student_get(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Student>, Problem> {
    Ok(Json(services.workflow(&auth.user).get_student(username).await?))
}

#[utoipa::path(
    params(("username", description = "student username")),
    responses((status = 200, description = "Courses of the student", body = Vec<Course>)),
    security(("jwt" = []))
)]
#[get("/students/<username>/courses")]
#[tracing::instrument(skip(services))]
pub async fn student_courses(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Course>>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .courses_of_student(username)
            .await?,
    ))
}

#[utoipa::path(
    params(("username", description = "student username")),
    responses((status = 200, description = "Classes of the student", body = Vec<Class>)),
    security(("jwt" = []))
)]
#[get("/students/<username>/classes")]
#[tracing::instrument(skip(services))]
pub async fn student_classes(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Class>>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .classes_of_student(username)
            .await?,
    ))
}

#[utoipa::path(
    params(("username", description = "student username")),
    responses((status = 200, description = "Scores of the student", body = Vec<Score>)),
    security(("jwt" = []))
)]
#[get("/students/<username>/scores")]
#[tracing::instrument(skip(services))]
pub async fn student_scores(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Score>>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .scores_of_student(username)
            .await?,
    ))
}

#[utoipa::path(
    params(("username", description = "student username")),
    responses((status = 200, description = "Certificates of the student", body = Vec<Certificate>)),
    security(("jwt" = []))
)]
#[get("/students/<username>/certificates")]
#[tracing::instrument(skip(services))]
pub async fn student_certificates(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Certificate>>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .certificates_of_student(username)
            .await?,
    ))
}

#[cfg(test)]
mod student_endpoints {
    use rocket::http::Status;
    use serde_json::{json, Value};

    use crate::ledger::mock::ScriptedLedger;
    use crate::ledger::query;
    use crate::route::testing::{auth, client};
    use crate::workflow::fixtures::*;

    #[rocket::async_test]
    async fn v1_student_records_are_admin_only() {
        let (client, ledger) = client(ScriptedLedger::new()).await;

        let response = client
            .get("/api/v1/students/st02")
            .header(auth(student("st01")))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Forbidden);
        assert!(ledger.calls().is_empty());
    }

    #[rocket::async_test]
    async fn v1_student_scores_are_listed() {
        let (client, _) = client(
            ScriptedLedger::new().on_args(
                query::GET_SCORES_OF_STUDENT,
                &["st01"],
                json!([score("s1", "st01", 8.0)]),
            ),
        )
        .await;

        let response = client
            .get("/api/v1/students/st01/scores")
            .header(auth(admin()))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body[0]["ScoreValue"], json!(8.0));
    }
}
