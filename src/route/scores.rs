use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::State;

use crate::data::ScoreInput;
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::workflow::Committed;

/// Record a student's score for a subject
#[utoipa::path(
    request_body = ScoreInput,
    responses(
        (status = 201, description = "Score recorded", body = Committed),
        (status = 403, description = "Caller isn't a teacher", body = Problem),
        (status = 404, description = "Student doesn't exist", body = Problem),
    ),
    security(("jwt" = []))
)]
#[post("/scores", format = "application/json", data = "<input>")]
#[tracing::instrument(skip(services))]
pub async fn score_create(
    input: Json<ScoreInput>,
    auth: CallerToken,
    services: &State<Services>,
) -> Result<(Status, Json<Committed>), Problem> {
    let committed = services.workflow(&auth.user).create_score(&input).await?;
    Ok((Status::Created, Json(committed)))
}
