use std::sync::Arc;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::features::admin::dtos::{MembershipDto, SyncUserDto};
use crate::features::files::dtos::PurgeReportDto;
use crate::features::files::FileService;
use crate::features::users::dtos::UserResponseDto;
use crate::features::users::IdentityService;

/// Operator actions: identity sync from the provider and on-demand purge
pub struct AdminService {
    identity: Arc<IdentityService>,
    files: Arc<FileService>,
}

impl AdminService {
    pub fn new(identity: Arc<IdentityService>, files: Arc<FileService>) -> Self {
        Self { identity, files }
    }

    pub async fn sync_user(&self, dto: SyncUserDto) -> Result<UserResponseDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let user = self.identity.sync_user(dto.into()).await?;
        Ok(user.into())
    }

    pub async fn add_membership(&self, dto: MembershipDto) -> Result<UserResponseDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let user = self
            .identity
            .add_membership(&dto.token_identifier, &dto.org_id, dto.role)
            .await?;
        Ok(user.into())
    }

    pub async fn update_membership_role(&self, dto: MembershipDto) -> Result<UserResponseDto> {
        dto.validate()
            .map_err(|e| AppError::Validation(e.to_string()))?;
        let user = self
            .identity
            .update_membership_role(&dto.token_identifier, &dto.org_id, dto.role)
            .await?;
        Ok(user.into())
    }

    /// Run one purge sweep now instead of waiting for the worker
    pub async fn purge_now(&self) -> Result<PurgeReportDto> {
        tracing::info!("Manual purge sweep requested");
        self.files.purge_sweep().await
    }
}
