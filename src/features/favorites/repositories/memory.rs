use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::FavoriteRepository;
use crate::core::error::Result;
use crate::core::memory_db::MemoryDatabase;
use crate::features::favorites::models::Favorite;

#[async_trait]
impl FavoriteRepository for MemoryDatabase {
    async fn toggle(&self, user_id: Uuid, org_id: &str, file_id: Uuid) -> Result<bool> {
        let mut tables = self.lock().await;

        let before = tables.favorites.len();
        tables
            .favorites
            .retain(|fav| !fav.matches(user_id, org_id, file_id));
        if tables.favorites.len() < before {
            return Ok(false);
        }

        tables.favorites.push(Favorite {
            user_id,
            org_id: org_id.to_string(),
            file_id,
            created_at: Utc::now(),
        });
        Ok(true)
    }

    async fn list_for_user(&self, user_id: Uuid, org_id: &str) -> Result<Vec<Favorite>> {
        let tables = self.lock().await;
        Ok(tables
            .favorites
            .iter()
            .filter(|fav| fav.user_id == user_id && fav.org_id == org_id)
            .cloned()
            .collect())
    }
}
