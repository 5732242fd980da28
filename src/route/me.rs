use rocket::serde::json::Json;
use rocket::State;

use crate::data::{Certificate, Score};
use crate::resp::jwt::CallerToken;
use crate::resp::problem::Problem;
use crate::route::Services;
use crate::view::{ClassView, CourseProgress, SubjectRegistration};
use crate::workflow::me::Profile;

/// Ledger profile of the caller
#[utoipa::path(
    responses(
        (status = 200, description = "Caller profile", body = Profile),
        (status = 401, description = "Missing or invalid token", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/me")]
#[tracing::instrument(skip(services))]
pub async fn me_profile(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Profile>, Problem> {
    Ok(Json(services.workflow(&auth.user).profile().await?))
}

/// Every subject with the caller's registration status
#[utoipa::path(
    responses((status = 200, description = "Subjects", body = Vec<SubjectRegistration>)),
    security(("jwt" = []))
)]
#[get("/me/subjects")]
#[tracing::instrument(skip(services))]
pub async fn me_subjects(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<SubjectRegistration>>, Problem> {
    Ok(Json(services.workflow(&auth.user).my_subjects().await?))
}

/// Enrolled courses with progress flags
#[utoipa::path(
    responses((status = 200, description = "Courses", body = Vec<CourseProgress>)),
    security(("jwt" = []))
)]
#[get("/me/courses")]
#[tracing::instrument(skip(services))]
pub async fn me_courses(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<CourseProgress>>, Problem> {
    Ok(Json(services.workflow(&auth.user).my_courses().await?))
}

/// Classes the caller studies or teaches
#[utoipa::path(
    responses((status = 200, description = "Classes", body = Vec<ClassView>)),
    security(("jwt" = []))
)]
#[get("/me/classes")]
#[tracing::instrument(skip(services))]
pub async fn me_classes(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<ClassView>>, Problem> {
    Ok(Json(services.workflow(&auth.user).my_classes().await?))
}

#[utoipa::path(
    responses((status = 200, description = "Scores", body = Vec<Score>)),
    security(("jwt" = []))
)]
#[get("/me/scores")]
#[tracing::instrument(skip(services))]
pub async fn me_scores(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Score>>, Problem> {
    Ok(Json(services.workflow(&auth.user).my_scores().await?))
}

#[utoipa::path(
    responses((status = 200, description = "Certificates", body = Vec<Certificate>)),
    security(("jwt" = []))
)]
#[get("/me/certificates")]
#[tracing::instrument(skip(services))]
pub async fn me_certificates(
    auth: CallerToken,
    services: &State<Services>,
) -> Result<Json<Vec<Certificate>>, Problem> {
    Ok(Json(services.workflow(&auth.user).my_certificates().await?))
}
