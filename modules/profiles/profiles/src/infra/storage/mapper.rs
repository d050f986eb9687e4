use profiles_sdk::{AccountGroup, Gender, Profile, UnknownVariant};

use super::entity::{account_group, profile};

impl TryFrom<profile::Model> for Profile {
    type Error = UnknownVariant;

    fn try_from(m: profile::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: m.id,
            user_id: m.user_id,
            first_name: m.first_name,
            last_name: m.last_name,
            gender: m.gender.parse::<Gender>()?,
            date_of_birth: m.date_of_birth,
            info: m.info,
            avatar: m.avatar,
        })
    }
}

impl TryFrom<account_group::Model> for AccountGroup {
    type Error = UnknownVariant;

    fn try_from(m: account_group::Model) -> Result<Self, Self::Error> {
        m.name.parse()
    }
}
