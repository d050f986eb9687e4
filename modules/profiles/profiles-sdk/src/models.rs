//! Public models for the profiles module.
//!
//! These are plain data structures with no infrastructure types, so they can
//! be shared by the REST layer, the domain service and the storage adapters.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;
use chrono::NaiveDate;

pub type AccountId = i64;
pub type ProfileId = i64;

/// Raised when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Gender recorded on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
            Gender::Other => "other",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Gender::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "gender",
                value: s.to_owned(),
            })
    }
}

/// Role classification of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountGroup {
    User,
    Moderator,
    Admin,
}

impl AccountGroup {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AccountGroup::User => "user",
            AccountGroup::Moderator => "moderator",
            AccountGroup::Admin => "admin",
        }
    }

    /// Whether members of this group may manage profiles of other accounts.
    #[must_use]
    pub const fn is_elevated(self) -> bool {
        !matches!(self, AccountGroup::User)
    }
}

impl fmt::Display for AccountGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountGroup {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(AccountGroup::User),
            "moderator" => Ok(AccountGroup::Moderator),
            "admin" => Ok(AccountGroup::Admin),
            other => Err(UnknownVariant {
                kind: "account group",
                value: other.to_owned(),
            }),
        }
    }
}

/// Account as seen by the profiles module (read-only).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub id: AccountId,
    pub is_active: bool,
}

/// Stored profile. `avatar` is the storage key, not a URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub info: String,
    pub avatar: String,
}

/// Data for inserting a new profile row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    pub user_id: AccountId,
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub info: String,
    pub avatar: String,
}

/// Uploaded avatar file held in memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Validated profile creation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileCreate {
    pub first_name: String,
    pub last_name: String,
    pub gender: Gender,
    pub date_of_birth: NaiveDate,
    pub info: String,
    pub avatar: AvatarUpload,
}
