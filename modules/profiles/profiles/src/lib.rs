//! Profiles Module Implementation
//!
//! The public models are defined in `profiles-sdk` and re-exported here.

pub use profiles_sdk::{
    Account, AccountGroup, AccountId, AvatarUpload, Gender, NewProfile, Profile, ProfileCreate,
};

pub mod module;
pub use module::ProfilesModule;

pub mod config;
pub use config::ProfilesConfig;

#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;
