use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::users::models::{Membership, User};

/// The caller's own account
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MeResponseDto {
    pub id: Uuid,
    pub token_identifier: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub memberships: Vec<Membership>,
    /// Organization used when a request does not name one
    pub active_org_id: String,
    pub created_at: DateTime<Utc>,
}

/// Public profile of an uploader
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserProfileDto {
    pub id: Uuid,
    pub name: Option<String>,
    pub image_url: Option<String>,
}

impl From<User> for UserProfileDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            image_url: user.image_url,
        }
    }
}

/// User record as returned by the admin sync endpoints
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponseDto {
    pub id: Uuid,
    pub token_identifier: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub memberships: Vec<Membership>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponseDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            token_identifier: user.token_identifier,
            name: user.name,
            image_url: user.image_url,
            memberships: user.memberships,
            created_at: user.created_at,
        }
    }
}
