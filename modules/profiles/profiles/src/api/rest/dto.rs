use chrono::NaiveDate;
use profiles_sdk::Gender;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::service::ProfileView;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum GenderDto {
    Male,
    Female,
    Other,
}

impl From<Gender> for GenderDto {
    fn from(g: Gender) -> Self {
        match g {
            Gender::Male => Self::Male,
            Gender::Female => Self::Female,
            Gender::Other => Self::Other,
        }
    }
}

/// Created profile. `avatar` is a resolvable URL.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub struct ProfileDto {
    pub id: i64,
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: GenderDto,
    #[schema(value_type = String, format = Date)]
    pub date_of_birth: NaiveDate,
    pub info: String,
    pub avatar: String,
}

impl From<ProfileView> for ProfileDto {
    fn from(view: ProfileView) -> Self {
        let p = view.profile;
        Self {
            id: p.id,
            user_id: p.user_id,
            first_name: p.first_name,
            last_name: p.last_name,
            gender: p.gender.into(),
            date_of_birth: p.date_of_birth,
            info: p.info,
            avatar: view.avatar_url.into(),
        }
    }
}

/// Multipart body of `POST /users/{user_id}/profile/`. Documentation only;
/// the handler reads the parts itself.
#[derive(Debug, ToSchema)]
pub struct CreateProfileForm {
    /// English letters only
    pub first_name: String,
    /// English letters only
    pub last_name: String,
    pub gender: GenderDto,
    /// `YYYY-MM-DD`
    #[schema(value_type = String, format = Date)]
    pub date_of_birth: String,
    /// Must contain at least one non-whitespace character
    pub info: String,
    /// PNG or JPEG image
    #[schema(value_type = String, format = Binary)]
    pub avatar: Vec<u8>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use profiles_sdk::Profile;
    use url::Url;

    #[test]
    fn dto_uses_url_and_lowercase_gender() {
        let view = ProfileView {
            profile: Profile {
                id: 1,
                user_id: 7,
                first_name: "john".to_owned(),
                last_name: "doe".to_owned(),
                gender: Gender::Other,
                date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
                info: "hi".to_owned(),
                avatar: "avatars/7_cat.png".to_owned(),
            },
            avatar_url: Url::parse("http://minio:9000/theater-storage/avatars/7_cat.png").unwrap(),
        };

        let json = serde_json::to_value(ProfileDto::from(view)).unwrap();
        assert_eq!(json["gender"], "other");
        assert_eq!(json["date_of_birth"], "1990-01-01");
        assert_eq!(
            json["avatar"],
            "http://minio:9000/theater-storage/avatars/7_cat.png"
        );
        assert_eq!(json["user_id"], 7);
    }
}
