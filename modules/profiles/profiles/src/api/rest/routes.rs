use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::rest::{dto, error, handlers};
use crate::domain::service::Service;

#[derive(OpenApi)]
#[openapi(
    info(title = "Profiles API", description = "Account profile creation with avatar upload"),
    paths(handlers::create_profile),
    components(schemas(
        dto::ProfileDto,
        dto::GenderDto,
        dto::CreateProfileForm,
        error::Problem,
        error::ValidationViolation
    )),
    modifiers(&BearerAuth),
    tags((name = "Profiles", description = "User profile management"))
)]
pub struct ProfilesApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}

/// Profile routes. The create route accepts bodies up to
/// [`Service::max_request_body_bytes`]; larger bodies get 413.
#[must_use]
pub fn register_routes(router: Router, service: Arc<Service>) -> Router {
    let body_limit = service.max_request_body_bytes();
    router
        .route(
            "/users/{user_id}/profile/",
            post(handlers::create_profile).layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/openapi.json", get(|| async { Json(ProfilesApiDoc::openapi()) }))
        .layer(Extension(service))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_documents_profile_endpoint() {
        let doc = serde_json::to_value(ProfilesApiDoc::openapi()).unwrap();
        let op = &doc["paths"]["/users/{user_id}/profile/"]["post"];
        assert_eq!(op["operationId"], "profiles.create_profile");
        assert!(op["requestBody"]["content"]["multipart/form-data"].is_object());
        assert!(op["responses"]["201"].is_object());
        assert!(op["responses"]["422"].is_object());
        assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
        assert!(doc["components"]["schemas"]["ProfileDto"].is_object());
    }
}
