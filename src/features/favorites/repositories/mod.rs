mod memory;
mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::favorites::models::Favorite;

pub use postgres::PgFavoriteRepository;

/// Persistence for per-user favorites
#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Insert the `(user, org, file)` row when absent, delete it when present.
    /// Concurrent toggles of the same triple are serialized. Returns whether
    /// the file is a favorite afterwards.
    async fn toggle(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> Result<bool>;

    /// The user's favorites inside one organization
    async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<Vec<Favorite>>;
}
