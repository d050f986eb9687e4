//! Domain service layer - profile creation workflow.
//!
//! The domain layer:
//! - **MAY** import: `profiles_sdk` (contract types), its own ports and repositories
//! - **MUST NOT** import: `api::*` or `infra::*`; adapters are injected as trait objects

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use profiles_sdk::{AccountId, AvatarUpload, NewProfile, Profile, ProfileCreate};
use tracing::instrument;
use url::Url;

use crate::domain::authz::authorize_profile_edit;
use crate::domain::error::{DomainError, WithField};
use crate::domain::ports::{AccessTokenDecoder, ObjectStorage};
use crate::domain::repo::{AccountsRepository, ProfilesRepository};
use crate::domain::validation::{
    ValidationPolicy, validate_birth_date, validate_gender, validate_image, validate_info,
    validate_name,
};

/// Configuration for the domain service
#[derive(Debug, Clone, Default)]
pub struct ServiceConfig {
    pub validation: ValidationPolicy,
}

/// Profile form as submitted, before field validation.
#[derive(Debug, Clone)]
pub struct ProfileForm {
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub date_of_birth: NaiveDate,
    pub info: String,
    pub avatar: AvatarUpload,
}

/// Created profile together with the resolved avatar URL.
#[derive(Debug, Clone)]
pub struct ProfileView {
    pub profile: Profile,
    pub avatar_url: Url,
}

/// Storage key of an account's avatar.
#[must_use]
pub fn avatar_key(user_id: AccountId, file_name: &str) -> String {
    format!("avatars/{user_id}_{file_name}")
}

pub struct Service {
    accounts: Arc<dyn AccountsRepository>,
    profiles: Arc<dyn ProfilesRepository>,
    storage: Arc<dyn ObjectStorage>,
    tokens: Arc<dyn AccessTokenDecoder>,
    config: ServiceConfig,
}

impl Service {
    #[must_use]
    pub fn new(
        accounts: Arc<dyn AccountsRepository>,
        profiles: Arc<dyn ProfilesRepository>,
        storage: Arc<dyn ObjectStorage>,
        tokens: Arc<dyn AccessTokenDecoder>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            accounts,
            profiles,
            storage,
            tokens,
            config,
        }
    }

    /// Request body cap for the profile form.
    #[must_use]
    pub fn max_request_body_bytes(&self) -> usize {
        self.config.validation.max_request_body_bytes()
    }

    /// Run every field validator against today's date.
    ///
    /// # Errors
    /// Returns [`DomainError::Validation`] for the first field that fails.
    pub fn validate_form(&self, form: ProfileForm) -> Result<ProfileCreate, DomainError> {
        self.validate_form_at(form, Utc::now().date_naive())
    }

    /// Same as [`Service::validate_form`] with an explicit reference date.
    ///
    /// # Errors
    /// Returns [`DomainError::Validation`] for the first field that fails.
    pub fn validate_form_at(
        &self,
        form: ProfileForm,
        today: NaiveDate,
    ) -> Result<ProfileCreate, DomainError> {
        let policy = &self.config.validation;

        let first_name = validate_name(&form.first_name).field("first_name")?;
        let last_name = validate_name(&form.last_name).field("last_name")?;
        let gender = validate_gender(&form.gender).field("gender")?;
        let date_of_birth =
            validate_birth_date(form.date_of_birth, today, policy).field("date_of_birth")?;
        let info = validate_info(&form.info).field("info")?;
        let mime = validate_image(&form.avatar, policy).field("avatar")?;

        Ok(ProfileCreate {
            first_name,
            last_name,
            gender,
            date_of_birth,
            info,
            avatar: AvatarUpload {
                content_type: mime.to_owned(),
                ..form.avatar
            },
        })
    }

    /// Create the profile of `user_id` on behalf of the bearer of `token`.
    ///
    /// # Errors
    /// - [`DomainError::Unauthorized`] for a rejected token
    /// - [`DomainError::Forbidden`] when the actor may not edit `user_id`
    /// - [`DomainError::AccountNotFoundOrInactive`] for a missing or inactive target
    /// - [`DomainError::ProfileAlreadyExists`] when a profile is already stored
    /// - [`DomainError::AvatarUpload`] when object storage rejects the upload
    /// - [`DomainError::Database`] / [`DomainError::Internal`] for other failures
    #[instrument(skip(self, token, request), fields(actor_id = tracing::field::Empty))]
    pub async fn create_profile(
        &self,
        token: &str,
        user_id: AccountId,
        request: ProfileCreate,
    ) -> Result<ProfileView, DomainError> {
        let actor_id = authorize_profile_edit(
            self.tokens.as_ref(),
            self.accounts.as_ref(),
            token,
            user_id,
        )
        .await?;
        tracing::Span::current().record("actor_id", actor_id);

        let active = self
            .accounts
            .find_account(user_id)
            .await?
            .is_some_and(|account| account.is_active);
        if !active {
            return Err(DomainError::account_not_found_or_inactive());
        }

        if self.profiles.exists_for_user(user_id).await? {
            return Err(DomainError::profile_already_exists());
        }

        let ProfileCreate {
            first_name,
            last_name,
            gender,
            date_of_birth,
            info,
            avatar,
        } = request;

        let key = avatar_key(user_id, &avatar.file_name);
        if let Err(e) = self
            .storage
            .upload_file(&key, avatar.data, &avatar.content_type)
            .await
        {
            tracing::error!(error = %e, key = %key, "avatar upload failed");
            return Err(e.into());
        }

        let profile = self
            .profiles
            .insert(NewProfile {
                user_id,
                first_name,
                last_name,
                gender,
                date_of_birth,
                info,
                avatar: key,
            })
            .await?;

        let avatar_url = self
            .storage
            .get_file_url(&profile.avatar)
            .await
            .map_err(|e| DomainError::internal(format!("resolve avatar url: {e}")))?;

        tracing::info!(profile_id = profile.id, "profile created");
        Ok(ProfileView {
            profile,
            avatar_url,
        })
    }
}
