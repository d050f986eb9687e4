//! Field validators for profile creation.
//!
//! Each validator takes one raw value and returns either the normalized value
//! or a human-readable message that is surfaced verbatim to the client.

use std::io::Cursor;

use chrono::{Datelike, NaiveDate};
use image::{ImageFormat, ImageReader};
use profiles_sdk::{AvatarUpload, Gender};
use serde::{Deserialize, Serialize};

const BYTES_PER_MB: usize = 1024 * 1024;
/// Room for the text fields and multipart framing on top of the avatar.
const FORM_OVERHEAD_BYTES: usize = BYTES_PER_MB;
const ACCEPTED_IMAGE_FORMATS: [ImageFormat; 2] = [ImageFormat::Png, ImageFormat::Jpeg];

/// A single validation failure; the message is client-facing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Tunable limits applied by the validators.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidationPolicy {
    #[serde(default = "default_max_avatar_size_mb")]
    pub max_avatar_size_mb: usize,
    #[serde(default = "default_min_birth_year")]
    pub min_birth_year: i32,
    #[serde(default = "default_min_age_years")]
    pub min_age_years: u32,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            max_avatar_size_mb: default_max_avatar_size_mb(),
            min_birth_year: default_min_birth_year(),
            min_age_years: default_min_age_years(),
        }
    }
}

impl ValidationPolicy {
    /// Largest avatar accepted by [`validate_image`].
    #[must_use]
    pub fn max_avatar_bytes(&self) -> usize {
        self.max_avatar_size_mb.saturating_mul(BYTES_PER_MB)
    }

    /// Request body cap for the profile form. Avatars up to twice the limit
    /// still reach [`validate_image`] and get its message.
    #[must_use]
    pub fn max_request_body_bytes(&self) -> usize {
        self.max_avatar_bytes()
            .saturating_mul(2)
            .saturating_add(FORM_OVERHEAD_BYTES)
    }
}

fn default_max_avatar_size_mb() -> usize {
    1
}

fn default_min_birth_year() -> i32 {
    1900
}

fn default_min_age_years() -> u32 {
    18
}

/// Names must be non-empty and consist of English letters only.
/// Returns the lower-cased name.
///
/// # Errors
/// Returns a [`ValidationError`] when the name is empty or contains anything
/// other than ASCII letters.
pub fn validate_name(name: &str) -> Result<String, ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::new("Name cannot be empty."));
    }
    if !name.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::new(format!(
            "{name} contains non-english letters"
        )));
    }
    Ok(name.to_ascii_lowercase())
}

/// Checks the avatar size and sniffs its header. Only PNG and JPEG are
/// accepted. Returns the detected MIME type.
///
/// # Errors
/// Returns a [`ValidationError`] when the file is too large, is not an image
/// or is an image in an unsupported format.
pub fn validate_image(
    avatar: &AvatarUpload,
    policy: &ValidationPolicy,
) -> Result<&'static str, ValidationError> {
    if avatar.data.len() > policy.max_avatar_bytes() {
        return Err(ValidationError::new(format!(
            "Image size exceeds {} MB",
            policy.max_avatar_size_mb
        )));
    }

    let invalid = || ValidationError::new("Invalid image format");

    let reader = ImageReader::new(Cursor::new(avatar.data.as_ref()))
        .with_guessed_format()
        .map_err(|_| invalid())?;
    let format = reader.format().ok_or_else(invalid)?;

    if !ACCEPTED_IMAGE_FORMATS.contains(&format) {
        let name = format
            .extensions_str()
            .first()
            .map_or_else(|| "unknown".to_owned(), |ext| ext.to_ascii_uppercase());
        return Err(ValidationError::new(format!(
            "Unsupported image format: {name}. Use one of next: JPG, JPEG, PNG"
        )));
    }

    // Header must actually decode, not just carry the magic bytes.
    reader.into_dimensions().map_err(|_| invalid())?;

    Ok(format.to_mime_type())
}

/// Genders are matched exactly against their lowercase names.
///
/// # Errors
/// Returns a [`ValidationError`] for any other value.
pub fn validate_gender(gender: &str) -> Result<Gender, ValidationError> {
    gender.parse::<Gender>().map_err(|_| {
        let allowed = Gender::ALL
            .iter()
            .map(|g| g.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        ValidationError::new(format!("Gender must be one of: {allowed}"))
    })
}

/// Birth year must not precede `min_birth_year` and the person must be at
/// least `min_age_years` old on `today`. Dates in the future fail the age
/// check.
///
/// # Errors
/// Returns a [`ValidationError`] describing the violated rule.
pub fn validate_birth_date(
    date: NaiveDate,
    today: NaiveDate,
    policy: &ValidationPolicy,
) -> Result<NaiveDate, ValidationError> {
    if date.year() < policy.min_birth_year {
        return Err(ValidationError::new(format!(
            "Invalid birth date - year must be greater than {}.",
            policy.min_birth_year
        )));
    }

    let old_enough = today
        .years_since(date)
        .is_some_and(|age| age >= policy.min_age_years);
    if !old_enough {
        return Err(ValidationError::new(format!(
            "You must be at least {} years old to be a user.",
            policy.min_age_years
        )));
    }

    Ok(date)
}

/// Info must contain at least one non-whitespace character. The value is
/// returned unchanged.
///
/// # Errors
/// Returns a [`ValidationError`] for empty or whitespace-only input.
pub fn validate_info(info: &str) -> Result<String, ValidationError> {
    if info.trim().is_empty() {
        return Err(ValidationError::new(
            "Info field cannot be empty or contain only spaces.",
        ));
    }
    Ok(info.to_owned())
}
