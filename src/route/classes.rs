use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::{ClassInfo, ClassInput, ClassScoreInput};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::view::{ClassStudent, ClassView};
use crate::workflow::Committed;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRef {
    pub class_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TeacherRef {
    pub teacher_username: String,
}

/// Create a class of a subject
#[utoipa::path(
    request_body = ClassInput,
    responses(
        (status = 201, description = "Class created", body = Committed),
        (status = 400, description = "Class spans less than a week", body = Problem),
        (status = 404, description = "Subject doesn't exist", body = Problem),
        (status = 422, description = "Invalid class fields", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/classes", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn class_create(
    input: Json<ClassInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<(Status, Json<Committed>), Problem> {
    let committed = services.workflow(&auth.user).create_class(&input).await?;
    Ok((Status::Created, Json(committed)))
}

/// Get a class with its subject name
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class", body = ClassView),
        (status = 404, description = "Class doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/classes/<id>")]
#[tracing::instrument(skip(services))]
pub async fn class_get(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<ClassView>, Problem> {
    Ok(Json(services.workflow(&auth.user).get_class(id).await?))
}

/// Update class information while the class is open
#[utoipa::path(
    params(("id", description = "class ID")),
    request_body = ClassInfo,
    responses(
        (status = 200, description = "Class updated", body = Committed),
        (status = 400, description = "Class isn't open", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/classes/<id>", format = "application/json", data = "<info>")]
#[tracing::instrument(skip(services))]
pub async fn class_update(
    id: &str,
    info: Json<ClassInfo>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).update_class(id, &info).await?,
    ))
}

#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class deleted", body = Committed),
        (status = 400, description = "Class isn't open", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/classes/<id>")]
#[tracing::instrument(skip(services))]
pub async fn class_delete(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(services.workflow(&auth.user).delete_class(id).await?))
}

/// Assign a teacher to a class
#[utoipa::path(
    params(("id", description = "class ID")),
    request_body = TeacherRef,
    responses(
        (status = 200, description = "Teacher assigned", body = Committed),
        (status = 404, description = "Teacher doesn't exist", body = Problem),
        (status = 409, description = "Teacher already assigned", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/classes/<id>/teacher", format = "application/json", data = "<teacher>")]
#[tracing::instrument(skip(services))]
pub async fn class_assign_teacher(
    id: &str,
    teacher: Json<TeacherRef>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .assign_teacher(id, teacher.teacher_username.trim())
            .await?,
    ))
}

#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Teacher unassigned", body = Committed),
        (status = 400, description = "Class has no teacher", body = Problem),
    ),
    security(("jwt" = []))
)]
#[delete("/classes/<id>/teacher")]
#[tracing::instrument(skip(services))]
pub async fn class_unassign_teacher(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).unassign_teacher(id).await?,
    ))
}

/// Start an open class that has a teacher
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class started", body = Committed),
        (status = 400, description = "Class isn't open or has no teacher", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/classes/<id>/start")]
#[tracing::instrument(skip(services))]
pub async fn class_start(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(services.workflow(&auth.user).start_class(id).await?))
}

/// Complete a class in progress
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Class completed", body = Committed),
        (status = 400, description = "Class isn't in progress", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put("/classes/<id>/complete")]
#[tracing::instrument(skip(services))]
pub async fn class_complete(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(services.workflow(&auth.user).complete_class(id).await?))
}

/// Register the calling student in a class
#[utoipa::path(
    request_body = ClassRef,
    responses(
        (status = 200, description = "Registered", body = Committed),
        (status = 400, description = "Class isn't open", body = Problem),
        (status = 409, description = "Already registered for the class or its subject", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/classes/enroll", format = "application/json", data = "<class>")]
#[tracing::instrument(skip(services))]
pub async fn class_enroll(
    class: Json<ClassRef>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .register_class(class.class_id.trim())
            .await?,
    ))
}

/// Cancel the calling student's class registration
#[utoipa::path(
    request_body = ClassRef,
    responses(
        (status = 200, description = "Registration cancelled", body = Committed),
        (status = 400, description = "Not registered or class isn't open", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/classes/unenroll", format = "application/json", data = "<class>")]
#[tracing::instrument(skip(services))]
pub async fn class_unenroll(
    class: Json<ClassRef>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .cancel_class(class.class_id.trim())
            .await?,
    ))
}

/// Students of a class with their scores
#[utoipa::path(
    params(("id", description = "class ID")),
    responses(
        (status = 200, description = "Students of the class", body = Vec<ClassStudent>),
    ),
    security(("jwt" = []))
)]
#[get("/classes/<id>/students")]
#[tracing::instrument(skip(services))]
pub async fn class_students(
    id: &str,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<ClassStudent>>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).students_of_class(id).await?,
    ))
}

/// Classes nobody teaches yet
#[utoipa::path(
    responses(
        (status = 200, description = "Classes without a teacher", body = Vec<ClassView>),
    ),
    security(("jwt" = []))
)]
#[get("/classes/no-teacher")]
#[tracing::instrument(skip(services))]
pub async fn class_without_teacher(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<ClassView>>, Problem> {
    Ok(Json(
        services.workflow(&auth.user).classes_without_teacher().await?,
    ))
}

/// Score a student of a class the caller teaches
#[utoipa::path(
    params(
        ("id", description = "class ID"),
        ("username", description = "student username"),
    ),
    request_body = ClassScoreInput,
    responses(
        (status = 200, description = "Score recorded", body = Committed),
        (status = 400, description = "Class isn't in progress or student isn't in it", body = Problem),
        (status = 403, description = "Caller doesn't teach the class", body = Problem),
    ),
    security(("jwt" = []))
)]
#[put(
    "/classes/<id>/students/<username>/score",
    format = "application/json",
    data = "<score>"
)]
#[tracing::instrument(skip(services))]
pub async fn class_score(
    id: &str,
    username: &str,
    score: Json<ClassScoreInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Committed>, Problem> {
    Ok(Json(
        services
            .workflow(&auth.user)
            .enter_class_score(id, username, &score)
            .await?,
    ))
}
