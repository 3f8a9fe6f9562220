use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use validator::Validate;

use crate::features::users::models::{NewUser, OrgRole};
use crate::shared::validation::not_blank;

/// User profile pushed by the identity provider
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SyncUserDto {
    #[validate(custom(function = "not_blank", message = "token_identifier is required"))]
    #[schema(example = "https://id.example.com|user_2a")]
    pub token_identifier: String,
    pub name: Option<String>,
    #[validate(url(message = "Invalid image URL"))]
    pub image_url: Option<String>,
}

impl From<SyncUserDto> for NewUser {
    fn from(dto: SyncUserDto) -> Self {
        Self {
            token_identifier: dto.token_identifier,
            name: dto.name,
            image_url: dto.image_url,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct MembershipDto {
    #[validate(custom(function = "not_blank", message = "token_identifier is required"))]
    pub token_identifier: String,
    #[validate(custom(function = "not_blank", message = "org_id is required"))]
    pub org_id: String,
    /// Also accepts identity-provider spellings such as `org:admin`
    #[serde(default, deserialize_with = "deserialize_role")]
    pub role: OrgRole,
}

fn deserialize_role<'de, D>(deserializer: D) -> Result<OrgRole, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}
