use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::UserRepository;
use crate::core::error::Result;
use crate::core::memory_db::MemoryDatabase;
use crate::features::users::models::{Membership, NewUser, OrgRole, User};

#[async_trait]
impl UserRepository for MemoryDatabase {
    async fn find_by_token(&self, token_identifier: &str) -> Result<Option<User>> {
        let tables = self.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.token_identifier == token_identifier)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let tables = self.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_or_create(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.lock().await;
        if let Some(existing) = tables
            .users
            .iter()
            .find(|u| u.token_identifier == new_user.token_identifier)
        {
            return Ok(existing.clone());
        }

        let user = User {
            id: Uuid::now_v7(),
            token_identifier: new_user.token_identifier,
            name: new_user.name,
            image_url: new_user.image_url,
            created_at: Utc::now(),
            memberships: Vec::new(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn upsert(&self, new_user: NewUser) -> Result<User> {
        let mut tables = self.lock().await;
        if let Some(existing) = tables
            .users
            .iter_mut()
            .find(|u| u.token_identifier == new_user.token_identifier)
        {
            existing.name = new_user.name;
            existing.image_url = new_user.image_url;
            return Ok(existing.clone());
        }

        let user = User {
            id: Uuid::now_v7(),
            token_identifier: new_user.token_identifier,
            name: new_user.name,
            image_url: new_user.image_url,
            created_at: Utc::now(),
            memberships: Vec::new(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn add_membership(&self, user_id: Uuid, org_id: &str, role: OrgRole) -> Result<bool> {
        let mut tables = self.lock().await;
        let Some(user) = tables.users.iter_mut().find(|u| u.id == user_id) else {
            return Ok(false);
        };
        if user.memberships.iter().any(|m| m.org_id == org_id) {
            return Ok(false);
        }

        user.memberships.push(Membership {
            org_id: org_id.to_string(),
            role,
        });
        Ok(true)
    }

    async fn update_membership_role(
        &self,
        user_id: Uuid,
        org_id: &str,
        role: OrgRole,
    ) -> Result<bool> {
        let mut tables = self.lock().await;
        let membership = tables
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .and_then(|u| u.memberships.iter_mut().find(|m| m.org_id == org_id));

        match membership {
            Some(m) => {
                m.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
