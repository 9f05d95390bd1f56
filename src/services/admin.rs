use std::sync::Arc;

use crate::error::MarketResult;
use crate::gateway::HttpGateway;
use marketplace_shared::protocol::{
    ApproveAnonymizationRequest, DeleteUserRequest, GetUserRequest, ListUsersRequest,
    RecentLogsRequest, UpdateUserPayload, UpdateUserRequest,
};
use marketplace_shared::{LogEntry, Paged, UserProfile, UserSummary};

/// 管理端客户端：用户管理与系统日志
#[derive(Clone)]
pub struct AdminService {
    gateway: Arc<HttpGateway>,
}

impl AdminService {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    // --- 用户管理 ---

    /// 用户列表（分页）
    pub async fn users(&self, page_number: u32, page_size: u32) -> MarketResult<Paged<UserSummary>> {
        self.gateway
            .send(&ListUsersRequest {
                page_number,
                page_size,
            })
            .await
    }

    /// 按 ID 获取完整用户资料
    pub async fn user_by_id(&self, user_id: i64) -> MarketResult<UserProfile> {
        self.gateway.send(&GetUserRequest { user_id }).await
    }

    /// 更新用户；把 `is_admin` 置真即为提升管理员
    pub async fn update_user(
        &self,
        user_id: i64,
        payload: UpdateUserPayload,
    ) -> MarketResult<UserProfile> {
        self.gateway
            .send(&UpdateUserRequest { user_id, payload })
            .await
    }

    /// 删除用户
    pub async fn delete_user(&self, user_id: i64) -> MarketResult<()> {
        self.gateway.send(&DeleteUserRequest { user_id }).await?;
        Ok(())
    }

    /// 批准匿名化申请
    pub async fn approve_anonymization(&self, user_id: i64) -> MarketResult<()> {
        self.gateway
            .send(&ApproveAnonymizationRequest { user_id })
            .await?;
        Ok(())
    }

    // --- 日志 ---

    /// 最近的系统日志，可按级别过滤
    pub async fn recent_logs(
        &self,
        count: u32,
        level: Option<String>,
    ) -> MarketResult<Vec<LogEntry>> {
        self.gateway.send(&RecentLogsRequest { count, level }).await
    }
}

// =========================================================
// 单元测试
// =========================================================
