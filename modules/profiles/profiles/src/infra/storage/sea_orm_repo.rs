use async_trait::async_trait;
use profiles_sdk::{Account, AccountGroup, AccountId, NewProfile, Profile};
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, SqlErr,
};

use crate::domain::error::DomainError;
use crate::domain::repo::{AccountsRepository, ProfilesRepository};

use super::entity::{account, account_group, profile};

pub struct SeaOrmAccountsRepository {
    db: DatabaseConnection,
}

impl SeaOrmAccountsRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountsRepository for SeaOrmAccountsRepository {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, DomainError> {
        let found = account::Entity::find_by_id(id).one(&self.db).await?;
        Ok(found.map(|m| Account {
            id: m.id,
            is_active: m.is_active,
        }))
    }

    async fn find_group(&self, id: AccountId) -> Result<Option<AccountGroup>, DomainError> {
        let found = account::Entity::find_by_id(id)
            .find_also_related(account_group::Entity)
            .one(&self.db)
            .await?;

        let Some((_, Some(group))) = found else {
            return Ok(None);
        };

        // Unknown group names grant nothing.
        match AccountGroup::try_from(group) {
            Ok(group) => Ok(Some(group)),
            Err(e) => {
                tracing::warn!(account_id = id, error = %e, "account has unrecognized group");
                Ok(None)
            }
        }
    }
}

pub struct SeaOrmProfilesRepository {
    db: DatabaseConnection,
}

impl SeaOrmProfilesRepository {
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProfilesRepository for SeaOrmProfilesRepository {
    async fn exists_for_user(&self, user_id: AccountId) -> Result<bool, DomainError> {
        let count = profile::Entity::find()
            .filter(profile::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count > 0)
    }

    async fn insert(&self, new: NewProfile) -> Result<Profile, DomainError> {
        let active_model = profile::ActiveModel {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(new.user_id),
            first_name: ActiveValue::Set(new.first_name),
            last_name: ActiveValue::Set(new.last_name),
            gender: ActiveValue::Set(new.gender.as_str().to_owned()),
            date_of_birth: ActiveValue::Set(new.date_of_birth),
            info: ActiveValue::Set(new.info),
            avatar: ActiveValue::Set(new.avatar),
        };

        let model = active_model.insert(&self.db).await.map_err(map_insert_error)?;

        Profile::try_from(model).map_err(|e| DomainError::internal(e.to_string()))
    }
}

fn map_insert_error(e: DbErr) -> DomainError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            tracing::debug!(%detail, "concurrent profile insert lost the race");
            DomainError::profile_already_exists()
        }
        _ => e.into(),
    }
}
