use thiserror::Error;

use crate::domain::ports::{StorageError, TokenError};
use crate::domain::validation::ValidationError;

/// Domain-specific errors using thiserror
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Unauthorized(String),

    #[error("You don't have permission to edit this profile.")]
    Forbidden,

    #[error("User not found or not active.")]
    AccountNotFoundOrInactive,

    #[error("User already has a profile.")]
    ProfileAlreadyExists,

    #[error("Validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Avatar upload failed: {0}")]
    AvatarUpload(String),

    #[error("Database error: {message}")]
    Database { message: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    #[must_use]
    pub fn forbidden() -> Self {
        Self::Forbidden
    }

    #[must_use]
    pub fn account_not_found_or_inactive() -> Self {
        Self::AccountNotFoundOrInactive
    }

    #[must_use]
    pub fn profile_already_exists() -> Self {
        Self::ProfileAlreadyExists
    }

    #[must_use]
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }
}

impl From<TokenError> for DomainError {
    fn from(e: TokenError) -> Self {
        Self::Unauthorized(e.to_string())
    }
}

impl From<StorageError> for DomainError {
    fn from(e: StorageError) -> Self {
        Self::AvatarUpload(e.to_string())
    }
}

impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        Self::database(e.to_string())
    }
}

/// Tags a validator failure with the form field it came from.
pub trait WithField<T> {
    /// # Errors
    /// Passes the validator failure through as [`DomainError::Validation`].
    fn field(self, field: &str) -> Result<T, DomainError>;
}

impl<T> WithField<T> for Result<T, ValidationError> {
    fn field(self, field: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::validation(field, e.0))
    }
}
