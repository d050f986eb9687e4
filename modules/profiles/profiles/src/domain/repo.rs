use async_trait::async_trait;
use profiles_sdk::{Account, AccountGroup, AccountId, NewProfile, Profile};

use crate::domain::error::DomainError;

/// Read-only view of accounts and their groups.
#[async_trait]
pub trait AccountsRepository: Send + Sync {
    async fn find_account(&self, id: AccountId) -> Result<Option<Account>, DomainError>;

    /// Group of the account, `None` when the account does not exist.
    async fn find_group(&self, id: AccountId) -> Result<Option<AccountGroup>, DomainError>;
}

#[async_trait]
pub trait ProfilesRepository: Send + Sync {
    async fn exists_for_user(&self, user_id: AccountId) -> Result<bool, DomainError>;

    /// Insert a profile row. A second profile for the same account yields
    /// [`DomainError::ProfileAlreadyExists`].
    async fn insert(&self, profile: NewProfile) -> Result<Profile, DomainError>;
}
