use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Role of a user inside one organization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "org_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum OrgRole {
    #[default]
    Member,
    Admin,
}

impl std::str::FromStr for OrgRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "member" | "basic_member" | "org:member" => Ok(OrgRole::Member),
            "admin" | "org:admin" => Ok(OrgRole::Admin),
            _ => Err(format!("Unknown organization role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize, ToSchema)]
pub struct Membership {
    pub org_id: String,
    pub role: OrgRole,
}

/// Database model for user, with memberships in insertion order
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub token_identifier: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub memberships: Vec<Membership>,
}

impl User {
    pub fn role_in(&self, org_id: &str) -> Option<OrgRole> {
        self.memberships
            .iter()
            .find(|m| m.org_id == org_id)
            .map(|m| m.role)
    }
}

/// Data for inserting or syncing a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub token_identifier: String,
    pub name: Option<String>,
    pub image_url: Option<String>,
}
