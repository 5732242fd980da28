use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::{Subject, SubjectInput};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::view::{ClassView, StudentCertification, StudentScore};
use crate::workflow::Committed;

/// List all subjects
#[utoipa::path(
    responses(
        (status = 200, description = "All subjects", body = Vec<Subject>),
        (status = 401, description = "Missing or invalid token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/subjects")]
#[tracing::instrument(skip(services))]
pub async fn subject_list(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Subject>>, Problem> {
    Ok(Json(services.workflow(&auth.user).list_subjects().await?))
}

#[utoipa::path(
    params(("id", description = "subject ID")),
    responses(
        (status = 200, description = "Subject", body = Subject),
        (status = 404, description = "Subject doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/subjects/<id>")]
#[tracing::instrument(skip(services))]
pub async fn subject_get(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Subject>, Problem> {
    Ok(Json(services.workflow(&auth.user).get_subject(id).await?))
}

/// Create a subject
#[utoipa::path(
    request_body = SubjectInput,
    responses(
        (status = 201, description = "Subject created", body = Committed),
        (status = 422, description = "Invalid subject fields", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/subjects", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn subject_create(
    input: Json<SubjectInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<(Status, Json<Committed>), Problem> {
    let committed = services.workflow(&auth.user).create_subject(&input).await?;
    Ok((Status::Created, Json(committed)))
}

#[utoipa::path(
    params(("id", description = "subject ID")),
    request_body = SubjectInput,
    responses(
        (status = 200, description = "Subject updated", body = Committed),
        (status = 400, description = "Nothing changed", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/subjects/<id>", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn subject_update(
    id: &str,
    input: Json<SubjectInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).update_subject(id, &input).await?,
    ))
}

/// Delete a subject without classes
#[utoipa::path(
    params(("id", description = "subject ID")),
    responses(
        (status = 200, description = "Subject deleted", body = Committed),
        (status = 400, description = "Subject still has classes", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/subjects/<id>")]
#[tracing::instrument(skip(services))]
pub async fn subject_delete(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(services.workflow(&auth.user).delete_subject(id).await?))
}

/// Classes of a subject; students only see class details, not members
#[utoipa::path(
    params(("id", description = "subject ID")),
    responses(
        (status = 200, description = "Classes of the subject", body = Vec<ClassView>),
    ),
    security(("jwt" = []))
)]
#[get("/subjects/<id>/classes")]
#[tracing::instrument(skip(services))]
pub async fn subject_classes(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<ClassView>>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).classes_of_subject(id).await?,
    ))
}

/// Students of a subject with their scores
#[utoipa::path(
    params(("id", description = "subject ID")),
    responses(
        (status = 200, description = "Students and scores", body = Vec<StudentScore>),
    ),
    security(("jwt" = []))
)]
#[get("/subjects/<id>/students")]
#[tracing::instrument(skip(services))]
pub async fn subject_students(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<StudentScore>>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).students_of_subject(id).await?,
    ))
}

/// Certificate status of every student of a subject
#[utoipa::path(
    params(("id", description = "subject ID")),
    responses(
        (status = 200, description = "Certification status", body = Vec<StudentCertification>),
    ),
    security(("jwt" = []))
)]
#[get("/subjects/<id>/certificates")]
#[tracing::instrument(skip(services))]
pub async fn subject_certificates(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<StudentCertification>>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .certificates_of_subject(id)
            .await?,
    ))
}
