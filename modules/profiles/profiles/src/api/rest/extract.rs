use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use super::error::Problem;

/// Raw bearer token from the `Authorization` header.
///
/// Only the header shape is checked here; the token itself is verified by the
/// domain service.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Problem;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        extract_bearer_token(&parts.headers)
            .map(|t| BearerToken(t.to_owned()))
            .map_err(|detail| Problem::unauthorized(detail).with_instance(parts.uri.path()))
    }
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, &'static str> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or("Authorization header is missing")?;

    let invalid = "Invalid Authorization header format. Expected 'Bearer <token>'";
    let value = value.to_str().map_err(|_| invalid)?;
    match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() => {
            Ok(token.trim())
        }
        _ => Err(invalid),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: Option<&'static str>) -> HeaderMap {
        let mut h = HeaderMap::new();
        if let Some(v) = value {
            h.insert(
                axum::http::header::AUTHORIZATION,
                HeaderValue::from_static(v),
            );
        }
        h
    }

    #[test]
    fn accepts_bearer_scheme() {
        assert_eq!(extract_bearer_token(&headers(Some("Bearer abc"))), Ok("abc"));
        assert_eq!(extract_bearer_token(&headers(Some("bearer  abc "))), Ok("abc"));
    }

    #[test]
    fn missing_header() {
        assert_eq!(
            extract_bearer_token(&headers(None)),
            Err("Authorization header is missing")
        );
    }

    #[test]
    fn malformed_header() {
        for v in ["Basic abc", "Bearer", "Bearer ", "abc"] {
            assert_eq!(
                extract_bearer_token(&headers(Some(v))),
                Err("Invalid Authorization header format. Expected 'Bearer <token>'"),
                "{v}"
            );
        }
    }
}
