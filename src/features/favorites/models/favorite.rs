use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for favorite. Identity is `(user_id, org_id, file_id)`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Favorite {
    pub user_id: Uuid,
    pub org_id: String,
    pub file_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    pub fn matches(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> bool {
        self.user_id == user_id && self.org_id == org_id && self.file_id == file_id
    }
}
