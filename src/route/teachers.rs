use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::{Teacher, TeacherInput};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::view::ClassView;
use crate::workflow::Committed;

/// List all teachers
#[utoipa::path(
    responses(
        (status = 200, description = "All teachers", body = Vec<Teacher>),
        (status = 403, description = "Caller isn't an academy admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachers")]
#[tracing::instrument(skip(services))]
pub async fn teacher_list(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Teacher>>, Problem> {
    Ok(Json(services.workflow(&auth.user).list_teachers().await?))
}

/// Create a teacher on the ledger and register their account
#[utoipa::path(
    request_body = TeacherInput,
    responses(
        (status = 201, description = "Teacher created", body = Committed),
        (status = 409, description = "Username is taken", body = Problem),
        (status = 422, description = "Invalid teacher fields", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/teachers", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn teacher_create(
    input: Json<TeacherInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<(Status, Json<Committed>), Problem> {
    let committed = services.workflow(&auth.user).create_teacher(&input).await?;
    Ok((Status::Created, Json(committed)))
}

#[utoipa::path(
    params(("username", description = "teacher username")),
    responses(
        (status = 200, description = "Teacher", body = Teacher),
        (status = 404, description = "Teacher doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachers/<username>")]
#[tracing::instrument(skip(services))]
pub async fn teacher_get(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Teacher>, Problem> {
    Ok(Json(services.workflow(&auth.user).get_teacher(username).await?))
}

/// Classes of a teacher; teachers may only list their own
#[utoipa::path(
    params(("username", description = "teacher username")),
    responses(
        (status = 200, description = "Classes taught", body = Vec<ClassView>),
        (status = 403, description = "Another teacher's classes", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachers/<username>/classes")]
#[tracing::instrument(skip(services))]
pub async fn teacher_classes(
    username: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<ClassView>>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .classes_of_teacher(username)
            .await?,
    ))
}
