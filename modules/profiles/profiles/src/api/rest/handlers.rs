use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{Extension, Multipart, Path};
use axum::http::{HeaderMap, StatusCode, Uri};
use axum::response::IntoResponse;

use super::dto::{CreateProfileForm, ProfileDto};
use super::error::{ApiResult, Problem, domain_error_to_problem, request_id};
use super::extract::BearerToken;
use super::form::read_profile_form;
use crate::domain::service::Service;

/// Create the profile of an account.
///
/// The form is read and validated first; the token is verified afterwards
/// by the service, so a bad form yields 422 even with an invalid token.
#[utoipa::path(
    post,
    path = "/users/{user_id}/profile/",
    tag = "Profiles",
    operation_id = "profiles.create_profile",
    params(("user_id" = i64, Path, description = "Target account id")),
    request_body(content = CreateProfileForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Profile created", body = ProfileDto),
        (status = 400, description = "Account already has a profile", body = Problem, content_type = "application/problem+json"),
        (status = 401, description = "Missing or invalid token, or inactive account", body = Problem, content_type = "application/problem+json"),
        (status = 403, description = "Actor may not edit this account", body = Problem, content_type = "application/problem+json"),
        (status = 413, description = "Request body above the accepted size", body = Problem, content_type = "application/problem+json"),
        (status = 422, description = "Form validation failed", body = Problem, content_type = "application/problem+json"),
        (status = 500, description = "Storage or database failure", body = Problem, content_type = "application/problem+json"),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_profile(
    Extension(svc): Extension<Arc<Service>>,
    uri: Uri,
    headers: HeaderMap,
    BearerToken(token): BearerToken,
    user_id: Result<Path<i64>, PathRejection>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<impl IntoResponse> {
    let instance = uri.path();
    let rid = request_id(&headers);
    let finish = |p: Problem| p.with_instance(instance).with_trace_id(rid.clone());

    let Path(user_id) = user_id.map_err(|e| {
        finish(Problem::unprocessable(format!(
            "Invalid user_id: {}",
            e.body_text()
        )))
    })?;
    let multipart = multipart.map_err(|e| {
        finish(Problem::unprocessable(format!(
            "Expected a multipart form: {}",
            e.body_text()
        )))
    })?;

    let form = read_profile_form(multipart)
        .await
        .map_err(|e| finish(Problem::from(e)))?;

    let request = svc
        .validate_form(form)
        .map_err(|e| finish(domain_error_to_problem(&e, instance)))?;

    let view = svc
        .create_profile(&token, user_id, request)
        .await
        .map_err(|e| finish(domain_error_to_problem(&e, instance)))?;

    Ok((StatusCode::CREATED, Json(ProfileDto::from(view))))
}
