use std::sync::Arc;

use crate::error::MarketResult;
use crate::gateway::HttpGateway;
use marketplace_shared::GdprRequest;
use marketplace_shared::protocol::{
    ApproveGdprRequest, GdprAnonymizeRequest, GdprDataExportRequest, GdprDeleteRequest,
    GdprExportRequest, MyGdprRequestsRequest, PendingGdprRequestsRequest, RejectGdprRequest,
};

/// GDPR 数据权利客户端
#[derive(Clone)]
pub struct GdprService {
    gateway: Arc<HttpGateway>,
}

impl GdprService {
    pub fn new(gateway: Arc<HttpGateway>) -> Self {
        Self { gateway }
    }

    // --- 用户接口 ---

    /// 申请导出个人数据
    pub async fn request_data_export(&self) -> MarketResult<GdprRequest> {
        self.gateway.send(&GdprExportRequest::default()).await
    }

    /// 申请匿名化
    pub async fn request_anonymization(&self) -> MarketResult<GdprRequest> {
        self.gateway.send(&GdprAnonymizeRequest::default()).await
    }

    /// 申请删除账户
    pub async fn request_deletion(&self) -> MarketResult<GdprRequest> {
        self.gateway.send(&GdprDeleteRequest::default()).await
    }

    /// 自己的申请记录
    pub async fn my_requests(&self) -> MarketResult<Vec<GdprRequest>> {
        self.gateway.send(&MyGdprRequestsRequest).await
    }

    // --- 管理员接口 ---

    /// 待处理的申请
    pub async fn pending_requests(&self) -> MarketResult<Vec<GdprRequest>> {
        self.gateway.send(&PendingGdprRequestsRequest).await
    }

    /// 批准申请
    pub async fn approve(
        &self,
        request_id: String,
        notes: Option<String>,
    ) -> MarketResult<GdprRequest> {
        self.gateway
            .send(&ApproveGdprRequest { request_id, notes })
            .await
    }

    /// 驳回申请
    pub async fn reject(&self, request_id: String, notes: String) -> MarketResult<GdprRequest> {
        self.gateway
            .send(&RejectGdprRequest { request_id, notes })
            .await
    }

    /// 下载导出数据（自由格式 JSON）
    pub async fn data_export(&self, request_id: String) -> MarketResult<serde_json::Value> {
        self.gateway
            .send(&GdprDataExportRequest { request_id })
            .await
    }
}
