use std::sync::Arc;

use crate::error::MarketResult;
use crate::gateway::HttpGateway;
use marketplace_shared::UserProfile;
use marketplace_shared::protocol::{
    ChangePasswordRequest, GetProfileRequest, RequestAnonymizationRequest, UpdateProfileRequest,
};

/// 当前用户资料客户端
#[derive(Clone)]
pub struct ProfileService {
    gateway: Arc<HttpGateway>,
}

impl ProfileService {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    /// 获取自己的资料
    pub async fn get(&self) -> MarketResult<UserProfile> {
        self.gateway.send(&GetProfileRequest).await
    }

    /// 更新自己的资料
    pub async fn update(&self, profile: UserProfile) -> MarketResult<UserProfile> {
        self.gateway.send(&UpdateProfileRequest(profile)).await
    }

    /// 修改密码
    pub async fn change_password(&self, request: ChangePasswordRequest) -> MarketResult<()> {
        self.gateway.send(&request).await?;
        Ok(())
    }

    /// 申请匿名化（GDPR 流程入口）
    pub async fn request_anonymization(
        &self,
        reason: String,
        notes: Option<String>,
    ) -> MarketResult<()> {
        self.gateway
            .send(&RequestAnonymizationRequest {
                reason,
                notes: notes.unwrap_or_default(),
                confirm_request: true,
            })
            .await?;
        Ok(())
    }
}
