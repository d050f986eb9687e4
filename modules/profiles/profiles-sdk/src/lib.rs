//! Profiles SDK
//!
//! Transport-agnostic contract types shared between the profiles module and
//! its consumers.

pub mod models;

pub use models::{
    Account, AccountGroup, AccountId, AvatarUpload, Gender, NewProfile, Profile, ProfileCreate,
    ProfileId, UnknownVariant,
};
