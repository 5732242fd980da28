use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::{Course, CourseInput, Student};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::view::CourseDetail;
use crate::workflow::Committed;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubjectRef {
    pub subject_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourseRef {
    pub course_id: String,
}

/// List all courses
#[utoipa::path(
    responses(
        (status = 200, description = "All courses", body = Vec<Course>),
        (status = 401, description = "Missing or invalid token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/courses")]
#[tracing::instrument(skip(services))]
pub async fn course_list(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Course>>, Problem> {
    Ok(Json(services.workflow(&auth.user).list_courses().await?))
}

/// Get a course together with its subjects
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Course and its subjects", body = CourseDetail),
        (status = 404, description = "Course doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/courses/<id>")]
#[tracing::instrument(skip(services))]
pub async fn course_get(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<CourseDetail>, Problem> {
    Ok(Json(services.workflow(&auth.user).get_course(id).await?))
}

/// Create a course, returning the refreshed course list
#[utoipa::path(
    request_body = CourseInput,
    responses(
        (status = 201, description = "Course created", body = Vec<Course>),
        (status = 403, description = "Caller isn't an academy admin", body = Problem),
        (status = 422, description = "Invalid course fields", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/courses", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn course_create(
    input: Json<CourseInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<(Status, Json<Vec<Course>>), Problem> {
    let courses = services.workflow(&auth.user).create_course(&input).await?;
    Ok((Status::Created, Json(courses)))
}

/// Update course information
#[utoipa::path(
    params(("id", description = "course ID")),
    request_body = CourseInput,
    responses(
        (status = 200, description = "Course updated", body = Committed),
        (status = 400, description = "Nothing changed", body = Problem),
        (status = 404, description = "Course doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/courses/<id>", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn course_update(
    id: &str,
    input: Json<CourseInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).update_course(id, &input).await?,
    ))
}

/// Delete a course nobody is enrolled in
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Remaining courses", body = Vec<Course>),
        (status = 400, description = "Course still has students", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/courses/<id>")]
#[tracing::instrument(skip(services))]
pub async fn course_delete(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Course>>, Problem> {
    Ok(Json(services.workflow(&auth.user).delete_course(id).await?))
}

/// Open a course for enrollment
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Course opened", body = Committed),
        (status = 304, description = "Course is already open"),
    ),
    security(("jwt" = []))
)]
#[put("/courses/<id>/open")]
#[tracing::instrument(skip(services))]
pub async fn course_open(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(services.workflow(&auth.user).open_course(id).await?))
}

/// Close a course
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Course closed", body = Committed),
        (status = 304, description = "Course is already closed"),
    ),
    security(("jwt" = []))
)]
#[put("/courses/<id>/close")]
#[tracing::instrument(skip(services))]
pub async fn course_close(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(services.workflow(&auth.user).close_course(id).await?))
}

/// Add a subject to a course
#[utoipa::path(
    params(("id", description = "course ID")),
    request_body = SubjectRef,
    responses(
        (status = 200, description = "Subject added", body = Committed),
        (status = 400, description = "Course is closed", body = Problem),
        (status = 409, description = "Subject already in the course", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/courses/<id>/subjects", format = "application/json", data = "<subject>")]
#[tracing::instrument(skip(services))]
pub async fn course_add_subject(
    id: &str,
    subject: Json<SubjectRef>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .add_subject_to_course(id, subject.subject_id.trim())
            .await?,
    ))
}

/// Remove a subject from a course
#[utoipa::path(
    params(
        ("id", description = "course ID"),
        ("subject_id", description = "subject ID"),
    ),
    responses(
        (status = 200, description = "Subject removed", body = Committed),
        (status = 400, description = "Subject isn't part of the course", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/courses/<id>/subjects/<subject_id>")]
#[tracing::instrument(skip(services))]
pub async fn course_remove_subject(
    id: &str,
    subject_id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .remove_subject_from_course(id, subject_id)
            .await?,
    ))
}

/// Students enrolled in a course
#[utoipa::path(
    params(("id", description = "course ID")),
    responses(
        (status = 200, description = "Enrolled students", body = Vec<Student>),
    ),
    security(("jwt" = []))
)]
#[get("/courses/<id>/students")]
#[tracing::instrument(skip(services))]
pub async fn course_students(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Student>>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).students_of_course(id).await?,
    ))
}

/// Enroll the calling student in a course
#[utoipa::path(
    request_body = CourseRef,
    responses(
        (status = 200, description = "Enrolled", body = Committed),
        (status = 400, description = "Course is closed", body = Problem),
        (status = 409, description = "Already enrolled", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/courses/enroll", format = "application/json", data = "<course>")]
#[tracing::instrument(skip(services))]
pub async fn course_enroll(
    course: Json<CourseRef>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .register_course(course.course_id.trim())
            .await?,
    ))
}

#[cfg(test)]
mod course_endpoints {
    use rocket::http::{ContentType, Status};
    use serde_json::{json, Value};

    use crate::ledger::mock::ScriptedLedger;
    use crate::ledger::{invoke, query};
    use crate::route::testing::{auth, client};
    use crate::workflow::fixtures::*;

    #[rocket::async_test]
    async fn v1_courses_require_a_token() {
        let (client, ledger) = client(ScriptedLedger::new()).await;

        let response = client.get("/api/v1/courses").dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
        assert!(ledger.calls().is_empty());
    }

    #[rocket::async_test]
    async fn v1_course_detail_lists_subjects() {
        let (client, _) = client(
            ScriptedLedger::new()
                .on(query::GET_COURSE, course("c1", "Open", &["s1"], &[]))
                .on(
                    query::GET_SUBJECTS_OF_COURSE,
                    json!([subject("s1", &[], &[])]),
                ),
        )
        .await;

        let response = client
            .get("/api/v1/courses/c1")
            .header(auth(student("st01")))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Ok);
        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["CourseID"], json!("c1"));
        assert_eq!(body["SubjectsInfo"][0]["SubjectID"], json!("s1"));
    }

    #[rocket::async_test]
    async fn v1_course_create_is_admin_only() {
        let (client, ledger) = client(ScriptedLedger::new()).await;
        let body = json!({
            "courseCode": "CS1",
            "courseName": "Computer Science",
            "shortDescription": "short",
            "description": "long"
        })
        .to_string();

        let response = client
            .post("/api/v1/courses")
            .header(ContentType::JSON)
            .header(auth(teacher("gv01")))
            .body(&body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Forbidden);
        assert_eq!(
            response.content_type(),
            Some(ContentType::new("application", "problem+json"))
        );
        assert!(ledger.calls().is_empty());

        let response = client
            .post("/api/v1/courses")
            .header(ContentType::JSON)
            .header(auth(admin()))
            .body(&body)
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Created);
        let args = ledger.invoked(invoke::CREATE_COURSE).expect("course wasn't created");
        assert_eq!(&args[1..], &["CS1", "Computer Science", "short", "long"]);
    }

    #[rocket::async_test]
    async fn v1_course_create_reports_invalid_fields() {
        let (client, ledger) = client(ScriptedLedger::new()).await;

        let response = client
            .post("/api/v1/courses")
            .header(ContentType::JSON)
            .header(auth(admin()))
            .body(
                json!({
                    "courseCode": "",
                    "courseName": "Computer Science",
                    "shortDescription": "short",
                    "description": "long"
                })
                .to_string(),
            )
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::UnprocessableEntity);
        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["errors"][0]["field"], json!("courseCode"));
        assert!(ledger.calls().is_empty());
    }

    #[rocket::async_test]
    async fn v1_course_enroll_conflicts_on_repeat() {
        let (client, _) = client(
            ScriptedLedger::new().on(query::GET_COURSE, course("c1", "Open", &[], &["st01"])),
        )
        .await;

        let response = client
            .post("/api/v1/courses/enroll")
            .header(ContentType::JSON)
            .header(auth(student("st01")))
            .body(json!({ "courseId": "c1" }).to_string())
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::Conflict);
    }

    #[rocket::async_test]
    async fn v1_course_failed_connects_are_scrubbed() {
        let (client, _) = client(ScriptedLedger::new().refusing_connections()).await;

        let response = client
            .get("/api/v1/courses")
            .header(auth(admin()))
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::InternalServerError);
        let body: Value = response.into_json().await.expect("invalid response json");
        assert_eq!(body["title"], json!("Failed connect to blockchain"));
    }
}
