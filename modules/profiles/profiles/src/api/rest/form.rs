//! Multipart form reader for profile creation.

use axum::extract::Multipart;
use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use bytes::Bytes;
use chrono::NaiveDate;
use profiles_sdk::AvatarUpload;
use thiserror::Error;

use super::error::{Problem, ValidationViolation};
use crate::domain::service::ProfileForm;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Failure to read the multipart body into a [`ProfileForm`].
#[derive(Debug, Error)]
pub enum FormError {
    #[error("Field required: {0}")]
    Missing(&'static str),
    #[error("Invalid date for {field}, expected YYYY-MM-DD")]
    InvalidDate { field: &'static str },
    #[error("Field {0} must be a file upload")]
    NotAFile(&'static str),
    #[error("Malformed multipart body: {0}")]
    Multipart(String),
    #[error("Request body is too large: {0}")]
    TooLarge(String),
}

impl FormError {
    fn field(&self) -> Option<&'static str> {
        match self {
            Self::Missing(f) | Self::NotAFile(f) => Some(f),
            Self::InvalidDate { field } => Some(field),
            Self::Multipart(_) | Self::TooLarge(_) => None,
        }
    }
}

impl From<MultipartError> for FormError {
    fn from(e: MultipartError) -> Self {
        if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
            Self::TooLarge(e.body_text())
        } else {
            Self::Multipart(e.body_text())
        }
    }
}

impl From<FormError> for Problem {
    fn from(e: FormError) -> Self {
        if matches!(e, FormError::TooLarge(_)) {
            return Problem::payload_too_large(e.to_string());
        }
        let problem = Problem::unprocessable(e.to_string());
        match e.field() {
            Some(field) => problem.with_errors(vec![ValidationViolation {
                field: field.to_owned(),
                message: e.to_string(),
            }]),
            None => problem,
        }
    }
}

#[derive(Default)]
struct Parts {
    first_name: Option<String>,
    last_name: Option<String>,
    gender: Option<String>,
    date_of_birth: Option<String>,
    info: Option<String>,
    avatar: Option<AvatarUpload>,
}

/// Read all parts of the body. Unknown parts are skipped; the last
/// occurrence of a repeated part wins.
///
/// # Errors
/// Returns [`FormError`] when the body is malformed or a field is missing.
pub async fn read_profile_form(mut multipart: Multipart) -> Result<ProfileForm, FormError> {
    let mut parts = Parts::default();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "first_name" => parts.first_name = Some(field.text().await?),
            "last_name" => parts.last_name = Some(field.text().await?),
            "gender" => parts.gender = Some(field.text().await?),
            "date_of_birth" => parts.date_of_birth = Some(field.text().await?),
            "info" => parts.info = Some(field.text().await?),
            "avatar" => parts.avatar = Some(read_avatar(field).await?),
            other => tracing::debug!(field = other, "ignoring unknown form field"),
        }
    }

    let date_of_birth = parts
        .date_of_birth
        .ok_or(FormError::Missing("date_of_birth"))?;
    let date_of_birth = NaiveDate::parse_from_str(date_of_birth.trim(), DATE_FORMAT).map_err(
        |_| FormError::InvalidDate {
            field: "date_of_birth",
        },
    )?;

    Ok(ProfileForm {
        first_name: parts.first_name.ok_or(FormError::Missing("first_name"))?,
        last_name: parts.last_name.ok_or(FormError::Missing("last_name"))?,
        gender: parts.gender.ok_or(FormError::Missing("gender"))?,
        date_of_birth,
        info: parts.info.ok_or(FormError::Missing("info"))?,
        avatar: parts.avatar.ok_or(FormError::Missing("avatar"))?,
    })
}

async fn read_avatar(field: Field<'_>) -> Result<AvatarUpload, FormError> {
    let file_name = field
        .file_name()
        .filter(|n| !n.is_empty())
        .map(str::to_owned)
        .ok_or(FormError::NotAFile("avatar"))?;
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_owned();
    let data: Bytes = field.bytes().await?;

    Ok(AvatarUpload {
        file_name,
        content_type,
        data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_field_maps_to_422_with_field() {
        let p: Problem = FormError::Missing("avatar").into();
        assert_eq!(p.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(p.detail, "Field required: avatar");
        assert_eq!(p.errors.unwrap()[0].field, "avatar");
    }

    #[test]
    fn malformed_body_has_no_field() {
        let p: Problem = FormError::Multipart("boom".to_owned()).into();
        assert_eq!(p.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(p.errors.is_none());
    }

    #[test]
    fn oversized_body_maps_to_413() {
        let p: Problem = FormError::TooLarge("Request payload is too large".to_owned()).into();
        assert_eq!(p.status, StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(p.code, "PROFILES_PAYLOAD_TOO_LARGE");
        assert!(p.errors.is_none());
    }
}
